//! Environment step.
use super::{Action, Observation};
use serde::{Deserialize, Serialize};

/// Information reported by an environment for a single step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Whether the simulator accepted the action.
    pub success: bool,

    /// Whether the task of the episode is accomplished.
    pub task_success: bool,

    /// Ratio of satisfied goal conditions, see [`goal_condition_ratio`].
    pub goal_condition_success: f32,

    /// Name of the executed action.
    pub action: String,

    /// Relative coordinates used for the action.
    pub coord: [f32; 2],

    /// Instruction of the episode.
    pub instruction: String,

    /// Textual feedback for the planner.
    pub env_feedback: String,
}

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with some additional information.
#[derive(Clone, Debug)]
pub struct Step {
    /// Action.
    pub act: Action,

    /// Observation.
    pub obs: Observation,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Flag denoting if episode is truncated.
    pub is_truncated: bool,

    /// Information reported by the environment.
    pub info: StepInfo,
}

impl Step {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: Observation,
        act: Action,
        reward: f32,
        is_terminated: bool,
        is_truncated: bool,
        info: StepInfo,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// Ratio of satisfied goal conditions.
///
/// Returns `1.0` when there is no goal condition. The result is clamped into
/// `[0, 1]` as simulators occasionally report more satisfied conditions than
/// exist.
pub fn goal_condition_ratio(satisfied: usize, total: usize) -> f32 {
    if total == 0 {
        1.0
    } else {
        (satisfied as f32 / total as f32).min(1.0)
    }
}
