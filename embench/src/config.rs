//! Configuration of an evaluation run.
use anyhow::{Context, Result};
use embench_core::EvaluatorConfig;
use embench_planner::{VlmPlannerConfig, TEACH_SYSTEM_PROMPT};
use embench_remote_model::{ModelType, RemoteModelConfig};
use embench_teach_env::{CoordStrategy, RewardMode, TeachEnvConfig};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of an evaluation run.
///
/// Read from `configs/<env>.yaml` and overridden by command line options.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct EvalConfig {
    /// Name of the model, e.g. `gpt-4o-mini` or `Qwen/Qwen2-VL-7B-Instruct`.
    pub model_name: String,

    /// `remote` or `custom`.
    pub model_type: String,

    /// Base URL of the model server overriding the defaults.
    pub base_url: Option<String>,

    /// The number of few-shot examples.
    pub n_shots: usize,

    /// JSON file holding a list of few-shot examples.
    pub examples_file: Option<PathBuf>,

    /// Send text only.
    pub language_only: bool,

    /// Keep the conversation across steps.
    pub chat_history: bool,

    /// Strip images from all but the latest user message.
    pub truncate: bool,

    /// Dataset split.
    pub eval_set: String,

    /// Side of zero frames.
    pub resolution: u32,

    /// Suffix of the result directory.
    pub exp_name: String,

    /// The maximum number of episodes.
    pub n_episodes: usize,

    /// The maximum number of environment steps in an episode.
    pub max_steps: usize,

    /// Root of the TEACh dataset.
    pub data_dir: PathBuf,

    /// Save an animated GIF per episode.
    pub save_video: bool,

    /// Root of all result directories.
    pub results_root: PathBuf,

    /// How interaction points are chosen.
    pub coord_strategy: CoordStrategy,

    /// Reward reported at every step.
    pub reward_mode: RewardMode,

    /// Random seed.
    pub seed: i64,

    /// Log level, overridden by `RUST_LOG`.
    pub log_level: String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            model_name: "gpt-4o-mini".to_string(),
            model_type: "remote".to_string(),
            base_url: None,
            n_shots: 10,
            examples_file: None,
            language_only: false,
            chat_history: false,
            truncate: false,
            eval_set: "valid_seen".to_string(),
            resolution: 300,
            exp_name: "".to_string(),
            n_episodes: 20,
            max_steps: 50,
            data_dir: PathBuf::from("teach/teach-dataset"),
            save_video: false,
            results_root: PathBuf::from("evaluate_results"),
            coord_strategy: CoordStrategy::Random,
            reward_mode: RewardMode::Sparse,
            seed: 42,
            log_level: "info".to_string(),
        }
    }
}

impl EvalConfig {
    /// Constructs [`EvalConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EvalConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    /// The last component of the model name.
    pub fn model_basename(&self) -> &str {
        self.model_name.rsplit('/').next().unwrap_or(&self.model_name)
    }

    /// `<results_root>/<env_dir>/<model>[_<exp_name>]/<eval_set>`.
    pub fn result_dir(&self, env_dir: &str) -> PathBuf {
        let name = if self.exp_name.is_empty() {
            self.model_basename().to_string()
        } else {
            format!("{}_{}", self.model_basename(), self.exp_name)
        };
        self.results_root
            .join(env_dir)
            .join(name)
            .join(&self.eval_set)
    }

    /// Configuration of the model client.
    pub fn model_config(&self) -> Result<RemoteModelConfig> {
        let model_type: ModelType = self.model_type.parse()?;
        let config = RemoteModelConfig::new(self.model_name.clone(), model_type);
        Ok(match &self.base_url {
            Some(url) => config.base_url(url.clone()),
            None => config,
        })
    }

    /// Configuration of the TEACh environment.
    pub fn teach_env_config(&self) -> TeachEnvConfig {
        TeachEnvConfig::default()
            .data_dir(self.data_dir.clone())
            .split(self.eval_set.clone())
            .resolution(self.resolution)
            .coord_strategy(self.coord_strategy)
            .reward_mode(self.reward_mode)
    }

    /// Configuration of the planner.
    pub fn planner_config(&self) -> Result<VlmPlannerConfig> {
        let examples: Vec<String> = match &self.examples_file {
            Some(path) => {
                let file =
                    File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
                serde_json::from_reader(BufReader::new(file))?
            }
            None => vec![],
        };
        Ok(VlmPlannerConfig::default()
            .system_prompt(TEACH_SYSTEM_PROMPT)
            .examples(examples)
            .n_shot(self.n_shots)
            .chat_history(self.chat_history)
            .language_only(self.language_only)
            .truncate(self.truncate)
            .seed(self.seed as u64))
    }

    /// Configuration of the episode evaluator writing into `result_dir`.
    pub fn evaluator_config(&self, result_dir: impl Into<PathBuf>) -> EvaluatorConfig {
        EvaluatorConfig::default()
            .n_episodes(self.n_episodes)
            .max_steps(self.max_steps)
            .result_dir(result_dir)
            .save_video(self.save_video)
    }
}
