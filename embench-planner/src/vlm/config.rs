//! Configuration of [`VlmPlanner`](super::VlmPlanner).
use super::prompt::TEACH_SYSTEM_PROMPT;
use anyhow::Result;
use embench_core::HEAD_RGB;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`VlmPlanner`](super::VlmPlanner).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct VlmPlannerConfig {
    /// System prompt with three `{}` placeholders: the largest action id, the
    /// list of actions and the few-shot examples.
    pub system_prompt: String,

    /// Few-shot examples, of which the first `n_shot` are used.
    pub examples: Vec<String>,

    /// The number of few-shot examples inserted into the prompt.
    pub n_shot: usize,

    /// Camera whose frame is attached to the prompt.
    pub obs_key: String,

    /// Keep the messages of previous steps in the conversation.
    pub chat_history: bool,

    /// Send text only.
    pub language_only: bool,

    /// Strip images from all but the latest user message before sending.
    pub truncate: bool,

    /// Key of the action id in an entry of the plan.
    pub action_key: String,

    /// Key of the plan in the reply of the model.
    pub json_key: String,

    /// The maximum number of messages sent to the model.
    pub message_window_len: usize,

    /// Seed of the fallback action sampler.
    pub seed: u64,
}

impl Default for VlmPlannerConfig {
    fn default() -> Self {
        Self {
            system_prompt: TEACH_SYSTEM_PROMPT.to_string(),
            examples: vec![],
            n_shot: 1,
            obs_key: HEAD_RGB.to_string(),
            chat_history: false,
            language_only: false,
            truncate: false,
            action_key: "action_id".to_string(),
            json_key: "executable_plan".to_string(),
            message_window_len: 10,
            seed: 42,
        }
    }
}

impl VlmPlannerConfig {
    /// Sets the system prompt.
    pub fn system_prompt(mut self, v: impl Into<String>) -> Self {
        self.system_prompt = v.into();
        self
    }

    /// Sets few-shot examples.
    pub fn examples(mut self, v: Vec<String>) -> Self {
        self.examples = v;
        self
    }

    /// Sets the number of few-shot examples.
    pub fn n_shot(mut self, v: usize) -> Self {
        self.n_shot = v;
        self
    }

    /// Sets the camera whose frame is attached to the prompt.
    pub fn obs_key(mut self, v: impl Into<String>) -> Self {
        self.obs_key = v.into();
        self
    }

    /// Enables or disables keeping the conversation across steps.
    pub fn chat_history(mut self, v: bool) -> Self {
        self.chat_history = v;
        self
    }

    /// Enables or disables text-only prompting.
    pub fn language_only(mut self, v: bool) -> Self {
        self.language_only = v;
        self
    }

    /// Enables or disables stripping images from older messages.
    pub fn truncate(mut self, v: bool) -> Self {
        self.truncate = v;
        self
    }

    /// Sets the size of the message window.
    pub fn message_window_len(mut self, v: usize) -> Self {
        self.message_window_len = v;
        self
    }

    /// Sets the seed of the fallback action sampler.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`VlmPlannerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`VlmPlannerConfig`].
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
    fn test_serde_planner_config() -> Result<()> {
        let config = VlmPlannerConfig::default()
            .n_shot(2)
            .examples(vec!["first".into(), "second".into()])
            .chat_history(true)
            .truncate(true)
            .seed(7);

        let dir = TempDir::new("planner_config")?;
        let path = dir.path().join("planner_config.yaml");
        config.save(&path)?;
        let config_ = VlmPlannerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
