//! Configuration of [`EpisodeEvaluator`](super::EpisodeEvaluator).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`EpisodeEvaluator`](super::EpisodeEvaluator).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// The maximum number of episodes.
    pub n_episodes: usize,

    /// The maximum number of environment steps in an episode.
    pub max_steps: usize,

    /// Directory receiving frames, per-episode results and the summary.
    pub result_dir: PathBuf,

    /// Camera whose frames are persisted.
    pub obs_key: String,

    /// Save a PNG for every frame.
    pub save_frames: bool,

    /// Save an animated GIF per episode.
    pub save_video: bool,

    /// Frame rate of the animated GIF.
    pub video_fps: u32,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            n_episodes: 20,
            max_steps: 50,
            result_dir: PathBuf::from("evaluate_results"),
            obs_key: crate::HEAD_RGB.to_string(),
            save_frames: true,
            save_video: false,
            video_fps: 10,
        }
    }
}

impl EvaluatorConfig {
    /// Sets the number of episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the step budget of an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the result directory.
    pub fn result_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.result_dir = v.into();
        self
    }

    /// Sets the camera whose frames are persisted.
    pub fn obs_key(mut self, v: impl Into<String>) -> Self {
        self.obs_key = v.into();
        self
    }

    /// Enables or disables saving PNG frames.
    pub fn save_frames(mut self, v: bool) -> Self {
        self.save_frames = v;
        self
    }

    /// Enables or disables saving an animated GIF per episode.
    pub fn save_video(mut self, v: bool) -> Self {
        self.save_video = v;
        self
    }

    /// Constructs [`EvaluatorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EvaluatorConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_evaluator_config() -> Result<()> {
        let config = EvaluatorConfig::default()
            .n_episodes(3)
            .max_steps(7)
            .result_dir("some/directory")
            .save_video(true);

        let dir = TempDir::new("evaluator_config")?;
        let path = dir.path().join("evaluator_config.yaml");
        config.save(&path)?;
        let config_ = EvaluatorConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_missing_fields_take_defaults() -> Result<()> {
        let config: EvaluatorConfig = serde_yaml::from_str("n_episodes: 5\n")?;
        assert_eq!(config.n_episodes, 5);
        assert_eq!(config.max_steps, 50);
        assert_eq!(config.obs_key, "head_rgb");
        Ok(())
    }
}
