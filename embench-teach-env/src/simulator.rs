//! Interface to the simulator replaying TEACh episodes.
use crate::{EdhInstance, TeachEnvConfig};
use anyhow::Result;
use image::RgbImage;
use std::{collections::HashMap, path::Path};

/// Camera of the agent.
pub const EGO: &str = "ego";

/// Outcome of an action reported by the simulator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionOutcome {
    /// Whether the action was carried out.
    pub success: bool,

    /// Reason of a failure, empty on success.
    pub message: String,
}

impl ActionOutcome {
    /// A successful outcome.
    pub fn ok() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }

    /// A failed outcome.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Progress of the task of the current episode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpisodeProgress {
    /// Description of the task.
    pub task_desc: String,

    /// Whether the task is accomplished.
    pub success: bool,

    /// The number of goal conditions.
    pub goal_conditions_total: usize,

    /// The number of satisfied goal conditions.
    pub goal_conditions_satisfied: usize,
}

/// A simulator able to replay the history of an EDH instance and to continue
/// the episode from there.
///
/// Coordinates of object interactions are relative to the egocentric frame,
/// `y` from the top and `x` from the left, both in `[0, 1]`.
pub trait TeachSimulator {
    /// Starts the simulator.
    fn connect(config: &TeachEnvConfig) -> Result<Self>
    where
        Self: Sized;

    /// Replays the history of `instance` in the scene of `game_file`.
    ///
    /// Returns `false` when the replay did not reach the initial state of the
    /// task.
    fn initialize_episode(&mut self, instance: &EdhInstance, game_file: &Path) -> Result<bool>;

    /// The latest frames keyed by camera name, see [`EGO`].
    fn latest_images(&mut self) -> Result<HashMap<String, RgbImage>>;

    /// Applies a motion action, e.g. `Forward`.
    fn apply_motion(&mut self, action: &str) -> Result<ActionOutcome>;

    /// Applies an object-interaction action at the relative point `(y, x)`.
    fn apply_object_interaction(&mut self, action: &str, y: f32, x: f32)
        -> Result<ActionOutcome>;

    /// Checks the task of the current episode.
    fn check_episode_progress(&mut self) -> Result<EpisodeProgress>;

    /// Stops the simulator.
    fn shutdown(&mut self) -> Result<()>;
}
