//! Evaluate [`Policy`].
use crate::{record::Record, Policy};
use anyhow::Result;
mod config;
mod episode_evaluator;
mod result;
pub use config::EvaluatorConfig;
pub use episode_evaluator::{EpisodeEvaluator, SUMMARY_FILE};
pub use result::EpisodeResult;

/// Evaluate [`Policy`].
pub trait Evaluator {
    /// Runs the evaluation and returns metrics aggregated over episodes.
    ///
    /// The caller of this method needs to build `policy` for the action
    /// vocabulary of the evaluated environment.
    fn evaluate<P: Policy>(&mut self, policy: &mut P) -> Result<Record>;
}
