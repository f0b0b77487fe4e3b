//! Environment.
use super::{Action, Observation, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents an embodied environment driven by natural-language instructions.
///
/// The contract is the gym-like `reset`/`step`/`close` triple. Adapters wrap a
/// simulator that lives outside of this crate; they are expected to degrade
/// locally (retry, dummy observations) rather than fail whenever the
/// simulator misbehaves, and to reserve errors for conditions the caller must
/// react to, such as an action outside of the vocabulary.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Builds an environment with a given random seed.
    ///
    /// Simulator resources should not be acquired here but at the first call
    /// of [`Env::reset`].
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts the next episode and returns its initial observation.
    fn reset(&mut self) -> Result<Observation>;

    /// Performs an environment step.
    ///
    /// The returned [`Record`] holds values worth logging for the step.
    fn step(&mut self, a: &Action) -> Result<(Step, Record)>;

    /// Releases simulator resources.
    fn close(&mut self) -> Result<()>;

    /// The natural-language instruction of the current episode.
    fn instruction(&self) -> &str;

    /// The identifier of the current episode, if any.
    fn episode_id(&self) -> Option<String>;

    /// Names of the actions; an [`Action`] indexes into this list.
    fn action_vocabulary(&self) -> &[String];

    /// The number of distinct episodes the environment can serve, if bounded.
    fn n_instances(&self) -> Option<usize> {
        None
    }
}
