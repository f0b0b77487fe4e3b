//! Policy.
use super::{Action, Observation};
use crate::record::Record;
use anyhow::Result;

/// Output of a single planning call.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    /// Actions to execute in order. Never empty.
    pub actions: Vec<Action>,

    /// Raw text returned by the model.
    pub raw_output: String,

    /// `false` when the actions were chosen by the fallback policy.
    pub valid: bool,
}

/// Environment feedback on an executed action.
#[derive(Clone, Debug, PartialEq)]
pub struct Feedback {
    /// Index of the executed action.
    pub action_id: usize,

    /// Feedback text reported by the environment.
    pub env_feedback: String,
}

/// A policy driven by a natural-language instruction.
///
/// A policy is a mapping from an observation and an instruction to a [`Plan`].
/// Implementations keep per-episode state, cleared by [`Policy::reset`].
pub trait Policy {
    /// Clears the episode state.
    fn reset(&mut self);

    /// Plans the next actions.
    fn act(&mut self, obs: &Observation, instruction: &str) -> Result<Plan>;

    /// Informs the policy of the outcome of an executed action.
    fn update_info(&mut self, feedback: Feedback);

    /// Values describing the internal state of the policy, e.g. counters.
    fn record(&self) -> Record {
        Record::empty()
    }
}
