#![warn(missing_docs)]
//! Vision-language planner.
//!
//! [`VlmPlanner`] renders a prompt from the instruction and the feedback of
//! the actions executed so far, attaches the current egocentric frame, queries
//! a [`LanguageModel`](embench_core::LanguageModel) and decodes the JSON reply
//! into a [`Plan`](embench_core::Plan).
//!
//! ```no_run
//! # use anyhow::Result;
//! # use embench_core::{ChatMessage, LanguageModel};
//! use embench_planner::{VlmPlanner, VlmPlannerConfig};
//! # struct Echo;
//! # impl LanguageModel for Echo {
//! #     fn respond(&mut self, _: &[ChatMessage]) -> Result<String> { Ok("{}".into()) }
//! # }
//! # fn main() -> Result<()> {
//! let actions = vec!["Stop".to_string(), "Forward".to_string()];
//! let config = VlmPlannerConfig::default().n_shot(0).chat_history(true);
//! let planner = VlmPlanner::build(config, Echo, actions)?;
//! # Ok(())
//! # }
//! ```
pub mod util;
mod vlm;
pub use vlm::{
    fill_placeholders, ActionDecoder, DecodeError, MessageWindow, PlannerState, PromptBuilder,
    VlmPlanner, VlmPlannerConfig, OUTPUT_TEMPLATE, OUTPUT_TEMPLATE_LANG, TEACH_SYSTEM_PROMPT,
};
