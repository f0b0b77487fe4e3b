//! Command line options of the `embench` binary.
use crate::{EnvKind, EvalConfig};
use anyhow::{bail, Result};
use clap::{builder::BoolishValueParser, Parser};
use std::path::PathBuf;

/// Evaluates a vision-language planner on an embodied environment.
///
/// Options override the values of the base configuration `configs/<env>.yaml`.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct EvalArgs {
    /// Environment name, e.g. eb-teach
    #[arg(long, default_value = "eb-teach")]
    pub env: String,

    /// Base configuration, defaults to configs/<env>.yaml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Name of the model
    #[arg(long = "model_name")]
    pub model_name: Option<String>,

    /// remote or custom
    #[arg(long = "model_type")]
    pub model_type: Option<String>,

    /// The number of few-shot examples
    #[arg(long = "n_shots")]
    pub n_shots: Option<usize>,

    /// Send text only (0/1)
    #[arg(long = "language_only", value_parser = BoolishValueParser::new())]
    pub language_only: Option<bool>,

    /// Keep the conversation across steps (0/1)
    #[arg(long = "chat_history", value_parser = BoolishValueParser::new())]
    pub chat_history: Option<bool>,

    /// Dataset split
    #[arg(long = "eval_set")]
    pub eval_set: Option<String>,

    /// Side of zero frames
    #[arg(long)]
    pub resolution: Option<u32>,

    /// The maximum number of environment steps in an episode
    #[arg(long)]
    pub steps: Option<usize>,

    /// The maximum number of episodes
    #[arg(long = "n_episodes")]
    pub n_episodes: Option<usize>,

    /// Suffix of the result directory
    #[arg(long = "exp_name")]
    pub exp_name: Option<String>,

    /// Root of the TEACh dataset
    #[arg(long = "data_dir")]
    pub data_dir: Option<PathBuf>,

    /// Save an animated GIF per episode (0/1)
    #[arg(long = "save_video", value_parser = BoolishValueParser::new())]
    pub save_video: Option<bool>,

    /// Log level, e.g. info or debug
    #[arg(long = "log_level")]
    pub log_level: Option<String>,
}

impl EvalArgs {
    /// Path of the base configuration of `kind`.
    pub fn config_path(&self, kind: EnvKind) -> PathBuf {
        self.config.clone().unwrap_or_else(|| kind.config_path())
    }

    /// The base configuration with the options applied.
    ///
    /// The second value tells whether the base configuration was read from
    /// [`EvalArgs::config_path`]. A missing default file gives the default
    /// configuration; a missing `--config` file is an error.
    pub fn load_config(&self, kind: EnvKind) -> Result<(EvalConfig, bool)> {
        let path = self.config_path(kind);
        let (mut config, loaded) = if path.exists() {
            (EvalConfig::load(&path)?, true)
        } else if self.config.is_some() {
            bail!("Configuration file {:?} does not exist", path);
        } else {
            (EvalConfig::default(), false)
        };
        self.apply(&mut config);
        Ok((config, loaded))
    }

    /// Overrides `config` with the options which were given.
    pub fn apply(&self, config: &mut EvalConfig) {
        if let Some(v) = &self.model_name {
            config.model_name = v.clone();
        }
        if let Some(v) = &self.model_type {
            config.model_type = v.clone();
        }
        if let Some(v) = self.n_shots {
            config.n_shots = v;
        }
        if let Some(v) = self.language_only {
            config.language_only = v;
        }
        if let Some(v) = self.chat_history {
            config.chat_history = v;
        }
        if let Some(v) = &self.eval_set {
            config.eval_set = v.clone();
        }
        if let Some(v) = self.resolution {
            config.resolution = v;
        }
        if let Some(v) = self.steps {
            config.max_steps = v;
        }
        if let Some(v) = self.n_episodes {
            config.n_episodes = v;
        }
        if let Some(v) = &self.exp_name {
            config.exp_name = v.clone();
        }
        if let Some(v) = &self.data_dir {
            config.data_dir = v.clone();
        }
        if let Some(v) = self.save_video {
            config.save_video = v;
        }
        if let Some(v) = &self.log_level {
            config.log_level = v.clone();
        }
    }
}
