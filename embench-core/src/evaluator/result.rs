//! Outcome of a single episode.
use crate::record::{Record, RecordValue};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Outcome of a single episode, written as `episode_<id>_final_res.json`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    /// Identifier of the episode instance, `unknown` if the env has none.
    pub episode_id: String,

    /// Instruction given to the planner.
    pub instruction: String,

    /// Reward of every step.
    pub reward: Vec<f32>,

    /// Number of environment steps taken.
    pub num_steps: usize,

    /// Number of steps the environment rejected.
    pub num_invalid_actions: usize,

    /// Number of planning calls.
    pub planner_steps: usize,

    /// Number of planning calls whose output could not be decoded.
    pub planner_output_error: usize,

    /// Whether the task was accomplished.
    pub task_success: bool,

    /// Ratio of satisfied goal conditions at the last step.
    pub goal_condition_success: f32,

    /// Error which aborted the episode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EpisodeResult {
    /// File name of the result.
    pub fn file_name(&self) -> String {
        format!("episode_{}_final_res.json", self.episode_id)
    }

    /// File name of the result of the `ix`-th episode, used when the id was
    /// already written in the same run.
    pub fn indexed_file_name(&self, ix: usize) -> String {
        format!("episode_{}_{}_final_res.json", self.episode_id, ix)
    }

    /// Writes the result as JSON into `dir/file_name`.
    pub fn save(&self, dir: impl AsRef<Path>, file_name: &str) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        fs::write(dir.join(file_name), serde_json::to_string(self)?)?;
        Ok(())
    }

    /// Metrics of the episode as a [`Record`].
    pub fn to_record(&self) -> Record {
        Record::from_slice(&[
            ("episode_return", RecordValue::Scalar(self.reward.iter().sum())),
            ("num_steps", RecordValue::Scalar(self.num_steps as f32)),
            (
                "num_invalid_actions",
                RecordValue::Scalar(self.num_invalid_actions as f32),
            ),
            (
                "planner_output_error",
                RecordValue::Scalar(self.planner_output_error as f32),
            ),
            ("task_success", RecordValue::flag(self.task_success)),
            (
                "goal_condition_success",
                RecordValue::Scalar(self.goal_condition_success),
            ),
        ])
    }
}
