//! Episode loop shared by every environment.
use super::{EpisodeResult, Evaluator, EvaluatorConfig};
use crate::{
    record::{NullRecorder, Record, RecordStorage, RecordValue, Recorder},
    summary::average_json_values,
    util::{save_frame, write_gif},
    Env, Feedback, Observation, Policy,
};
use anyhow::{ensure, Result};
use chrono::Local;
use image::RgbImage;
use log::{debug, info, warn};
use std::{collections::HashSet, fs, path::PathBuf};

/// Instruction used when the environment does not provide one.
const DEFAULT_INSTRUCTION: &str = "Interact with the environment to complete the task.";

/// Name of the summary file written into the results directory.
pub const SUMMARY_FILE: &str = "summary.json";

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs episodes of a [`Policy`] on an [`Env`] and records their outcomes.
///
/// # Episode loop
///
/// 1. Reset the environment and the policy, save the initial frame as
///    `ep_<i>_start.png`.
/// 2. Ask the policy for a [`Plan`](crate::Plan) and execute its actions in
///    order. Every action is an environment step; its frame is saved as
///    `ep_<i>_step_<k>.png` and its feedback is passed back to the policy.
///    Execution of the plan stops after an action the environment rejects.
/// 3. Repeat 2 until the episode is done or `max_steps` steps were taken.
/// 4. Write `results/episode_<id>_final_res.json`, or
///    `results/episode_<id>_<i>_final_res.json` if the id was already written.
///
/// An error in any of these steps aborts the current episode only; the result
/// collected so far is still written, with the error message attached.
/// After the last episode `results/summary.json` averages all result files.
///
/// ```mermaid
/// graph LR
///     A[Policy]-->|Plan|B[Env]
///     B -->|Observation|A
///     B -->|Feedback|A
///     B -->|Step|C[EpisodeResult]
/// ```
///
/// The number of episodes is `n_episodes`, or the number of instances of the
/// environment if it is smaller.
pub struct EpisodeEvaluator<E: Env> {
    config: EvaluatorConfig,

    env: E,

    recorder: Box<dyn Recorder>,
}

impl<E: Env> EpisodeEvaluator<E> {
    /// Constructs a new [`EpisodeEvaluator`].
    pub fn new(config: EvaluatorConfig, env: E) -> Result<Self> {
        fs::create_dir_all(&config.result_dir)?;
        Ok(Self {
            config,
            env,
            recorder: Box::new(NullRecorder::new()),
        })
    }

    /// Sets the recorder receiving a record for every step and every episode.
    pub fn with_recorder(mut self, recorder: Box<dyn Recorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Returns a reference to the environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Returns the evaluated environment, consuming the evaluator.
    pub fn into_env(self) -> E {
        self.env
    }

    /// Directory receiving per-episode results.
    pub fn results_dir(&self) -> PathBuf {
        self.config.result_dir.join("results")
    }

    fn n_episodes(&self) -> usize {
        match self.env.n_instances() {
            Some(n) => self.config.n_episodes.min(n),
            None => self.config.n_episodes,
        }
    }

    fn persist(&self, obs: &Observation, name: &str, frames: &mut Vec<RgbImage>) -> Result<()> {
        if let Some(frame) = obs.frame(&self.config.obs_key) {
            if self.config.save_frames {
                save_frame(frame, self.config.result_dir.join(name))?;
            }
            if self.config.save_video {
                frames.push(frame.clone());
            }
        }
        Ok(())
    }

    /// Runs a single episode, accumulating into `result`.
    fn run_episode<P: Policy>(
        &mut self,
        ix: usize,
        policy: &mut P,
        result: &mut EpisodeResult,
        frames: &mut Vec<RgbImage>,
    ) -> Result<()> {
        let mut obs = self.env.reset()?;
        result.episode_id = self
            .env
            .episode_id()
            .unwrap_or_else(|| "unknown".to_string());
        result.instruction = match self.env.instruction() {
            "" => DEFAULT_INSTRUCTION.to_string(),
            s => s.to_string(),
        };
        info!("Instruction: {}", result.instruction);
        self.persist(&obs, &format!("ep_{}_start.png", ix), frames)?;

        policy.reset();
        let mut done = false;

        while !done && result.num_steps < self.config.max_steps {
            let plan = policy.act(&obs, &result.instruction)?;
            debug!("Planner output actions: {:?}", plan.actions);
            ensure!(!plan.actions.is_empty(), "Policy returned an empty plan");

            for act in plan.actions.iter() {
                let (step, record) = self.env.step(act)?;
                self.persist(
                    &step.obs,
                    &format!("ep_{}_step_{}.png", ix, result.num_steps),
                    frames,
                )?;

                result.reward.push(step.reward);
                result.num_steps += 1;
                result.task_success = step.info.task_success;
                result.goal_condition_success = step.info.goal_condition_success;
                let accepted = step.info.success;
                if !accepted {
                    result.num_invalid_actions += 1;
                }

                policy.update_info(Feedback {
                    action_id: act.index,
                    env_feedback: step.info.env_feedback.clone(),
                });

                let mut record = record;
                record.insert("episode", RecordValue::Scalar(ix as f32));
                record.insert("step", RecordValue::Scalar(result.num_steps as f32));
                record.insert("reward", RecordValue::Scalar(step.reward));
                record.insert("timestamp", RecordValue::DateTime(Local::now()));
                self.recorder.write(record);

                done = step.is_done();
                obs = step.obs;
                if done || !accepted || result.num_steps >= self.config.max_steps {
                    break;
                }
            }
        }

        Ok(())
    }
}

impl<E: Env> Evaluator for EpisodeEvaluator<E> {
    /// Runs the episodes and returns the summary merged with the statistics
    /// of the episode metrics.
    fn evaluate<P: Policy>(&mut self, policy: &mut P) -> Result<Record> {
        let n_episodes = self.n_episodes();
        let results_dir = self.results_dir();
        fs::create_dir_all(&results_dir)?;
        let mut storage = RecordStorage::new();
        let mut file_names = HashSet::new();

        for ix in 0..n_episodes {
            info!("Evaluating episode {} ...", ix);
            let mut result = EpisodeResult::default();
            let mut frames = vec![];

            if let Err(e) = self.run_episode(ix, policy, &mut result, &mut frames) {
                warn!("Episode {} aborted: {:#}", ix, e);
                result.error = Some(format!("{:#}", e));
            }
            if result.episode_id.is_empty() {
                result.episode_id = "unknown".to_string();
            }

            let policy_record = policy.record();
            result.planner_steps = policy_record.get_scalar("planner_steps").unwrap_or(0.0) as usize;
            result.planner_output_error =
                policy_record.get_scalar("output_json_error").unwrap_or(0.0) as usize;

            if self.config.save_video {
                let path = self.config.result_dir.join(format!("ep_{}.gif", ix));
                if let Err(e) = write_gif(&frames, &path, self.config.video_fps) {
                    warn!("Failed to write {:?}: {:#}", path, e);
                }
            }

            // Ids repeat after a wrap and for failed resets (`unknown`).
            let mut file_name = result.file_name();
            if file_names.contains(&file_name) {
                file_name = result.indexed_file_name(ix);
            }
            result.save(&results_dir, &file_name)?;
            file_names.insert(file_name);
            info!(
                "Episode {} finished: task_success={}, goal_condition_success={}, steps={}",
                ix, result.task_success, result.goal_condition_success, result.num_steps
            );
            let record = result.to_record();
            storage.store(record.clone());
            self.recorder.store(record);
        }
        self.recorder.flush(n_episodes as i64);

        let summary = average_json_values(&results_dir, SUMMARY_FILE)?;
        Ok(storage.aggregate().merge(summary))
    }
}
