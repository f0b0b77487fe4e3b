#![warn(missing_docs)]
//! Core of the embench evaluation harness.
//!
//! This crate defines the seams between the three parts of an evaluation run:
//!
//! * an environment adapter implementing [`Env`], which wraps a simulator behind
//!   a `reset`/`step`/`close` contract and emits [`Observation`]s,
//! * a planner implementing [`Policy`], which turns an observation and a natural
//!   language instruction into a [`Plan`] of action indices, typically by querying
//!   a [`LanguageModel`],
//! * the [`EpisodeEvaluator`], which loops episodes, persists frames and writes
//!   per-episode results and a summary.
pub mod error;
pub mod evaluator;
pub mod record;
pub mod summary;
pub mod util;

mod base;
pub use base::{
    goal_condition_ratio, Action, ChatMessage, ContentPart, Env, Feedback, ImageUrl,
    LanguageModel, Observation, Plan, Policy, Role, Step, StepInfo, HEAD_RGB,
};
pub use evaluator::{EpisodeEvaluator, EpisodeResult, Evaluator, EvaluatorConfig};
