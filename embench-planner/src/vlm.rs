//! Planner querying a vision-language model.
mod base;
mod config;
mod decode;
mod history;
mod prompt;
pub use base::{PlannerState, VlmPlanner};
pub use config::VlmPlannerConfig;
pub use decode::{ActionDecoder, DecodeError};
pub use history::MessageWindow;
pub use prompt::{
    fill_placeholders, PromptBuilder, OUTPUT_TEMPLATE, OUTPUT_TEMPLATE_LANG, TEACH_SYSTEM_PROMPT,
};
