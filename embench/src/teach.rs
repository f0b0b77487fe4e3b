//! Evaluation of a planner on TEACh.
use crate::{registry::EnvKind, EvalConfig};
use anyhow::Result;
use embench_core::{
    record::{JsonlRecorder, Record},
    Env, EpisodeEvaluator, Evaluator, LanguageModel,
};
use embench_planner::VlmPlanner;
use embench_remote_model::RemoteModel;
use embench_teach_env::{TeachEnv, TeachSimulator};
use log::{info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// File receiving the effective configuration.
pub const CONFIG_FILE: &str = "config.txt";

/// File receiving a record per step.
pub const STEPS_FILE: &str = "steps.jsonl";

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Evaluates a [`VlmPlanner`] on [`TeachEnv`].
///
/// ```mermaid
/// graph LR
///     A[EvalConfig]-->B[TeachEnv]
///     A-->C[VlmPlanner]
///     A-->D[EpisodeEvaluator]
///     B-->D
///     C-->D
///     D-->E[result_dir]
/// ```
///
/// Everything is written into [`EvalConfig::result_dir`]: frames, per-episode
/// results, the summary, [`STEPS_FILE`] and [`CONFIG_FILE`].
pub struct TeachEvaluator {
    config: EvalConfig,
    result_dir: PathBuf,
}

impl TeachEvaluator {
    /// Constructs a new [`TeachEvaluator`].
    pub fn new(config: EvalConfig) -> Self {
        let result_dir = config.result_dir(EnvKind::Teach.result_dir_name());
        Self { config, result_dir }
    }

    /// Directory receiving the outputs.
    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// Runs the evaluation with a model served by an OpenAI-compatible API.
    pub fn run_remote<S: TeachSimulator>(&self) -> Result<Record> {
        let model = RemoteModel::build(self.config.model_config()?)?;
        self.run::<S, _>(model)
    }

    /// Runs the evaluation with the given model and simulator type.
    pub fn run<S: TeachSimulator, M: LanguageModel>(&self, model: M) -> Result<Record> {
        info!("Current eval set: {}", self.config.eval_set);
        info!("Results are written into {:?}", self.result_dir);
        fs::create_dir_all(&self.result_dir)?;
        self.config.save(self.result_dir.join(CONFIG_FILE))?;

        let env = TeachEnv::<S>::build(&self.config.teach_env_config(), self.config.seed)?;
        let actions = env.action_vocabulary().to_vec();
        let mut planner = VlmPlanner::build(self.config.planner_config()?, model, actions)?;

        let recorder = JsonlRecorder::new(self.result_dir.join(STEPS_FILE))?;
        let mut evaluator =
            EpisodeEvaluator::new(self.config.evaluator_config(&self.result_dir), env)?
                .with_recorder(Box::new(recorder));
        let summary = evaluator.evaluate(&mut planner);

        let mut env = evaluator.into_env();
        if let Err(e) = env.close() {
            warn!("Failed to close the environment: {:#}", e);
        }
        summary
    }
}
