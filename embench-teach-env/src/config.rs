//! Configuration of [`TeachEnv`](crate::TeachEnv).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// How the interaction point is chosen when an action carries no coordinates.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CoordStrategy {
    /// Uniformly random point of the frame.
    Random,

    /// Center of the frame.
    Center,
}

/// Reward reported at every step.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RewardMode {
    /// Always zero; episodes are evaluated by success only.
    Sparse,

    /// Change of the goal-condition ratio since the previous step.
    GoalConditionDelta,
}

/// Configuration of [`TeachEnv`](crate::TeachEnv).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TeachEnvConfig {
    /// Root of the TEACh dataset, holding `edh_instances/` and `games/`.
    pub data_dir: PathBuf,

    /// Dataset split, e.g. `valid_seen`.
    pub split: String,

    /// Side of the zero frame returned when no frame is available.
    pub resolution: u32,

    /// Timeout passed to the simulator when replaying the episode history.
    pub replay_timeout: u32,

    /// The number of instances tried by a single reset.
    pub max_retries: usize,

    /// How interaction points are chosen.
    pub coord_strategy: CoordStrategy,

    /// Reward reported at every step.
    pub reward_mode: RewardMode,

    /// JSON file holding the action vocabulary, see
    /// [`ActionVocabulary::load`](crate::ActionVocabulary::load).
    pub actions_file: Option<PathBuf>,

    /// Output directory of the simulator bridge.
    pub output_dir: PathBuf,

    /// Image directory of the simulator bridge.
    pub images_dir: PathBuf,
}

impl Default for TeachEnvConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("teach/teach-dataset"),
            split: "valid_seen".to_string(),
            resolution: 300,
            replay_timeout: 500,
            max_retries: 3,
            coord_strategy: CoordStrategy::Random,
            reward_mode: RewardMode::Sparse,
            actions_file: None,
            output_dir: PathBuf::from("/tmp/teach_output"),
            images_dir: PathBuf::from("/tmp/teach_images"),
        }
    }
}

impl TeachEnvConfig {
    /// Sets the dataset root.
    pub fn data_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.data_dir = v.into();
        self
    }

    /// Sets the dataset split.
    pub fn split(mut self, v: impl Into<String>) -> Self {
        self.split = v.into();
        self
    }

    /// Sets the side of zero frames.
    pub fn resolution(mut self, v: u32) -> Self {
        self.resolution = v;
        self
    }

    /// Sets the number of instances tried by a single reset.
    pub fn max_retries(mut self, v: usize) -> Self {
        self.max_retries = v;
        self
    }

    /// Sets how interaction points are chosen.
    pub fn coord_strategy(mut self, v: CoordStrategy) -> Self {
        self.coord_strategy = v;
        self
    }

    /// Sets the reward mode.
    pub fn reward_mode(mut self, v: RewardMode) -> Self {
        self.reward_mode = v;
        self
    }

    /// Sets the file of the action vocabulary.
    pub fn actions_file(mut self, v: impl Into<PathBuf>) -> Self {
        self.actions_file = Some(v.into());
        self
    }

    /// Directory of the EDH instances of the split.
    pub fn edh_dir(&self) -> PathBuf {
        self.data_dir.join("edh_instances").join(&self.split)
    }

    /// Game file of `game_id` in the split.
    pub fn game_file(&self, game_id: &str) -> PathBuf {
        self.data_dir
            .join("games")
            .join(&self.split)
            .join(format!("{}.game.json", game_id))
    }

    /// Constructs [`TeachEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TeachEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
