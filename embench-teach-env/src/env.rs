//! TEACh environment.
use crate::{
    actions::STOP, list_instance_files, simulator::EGO, ActionVocabulary, CoordStrategy,
    EdhInstance, EpisodeProgress, RewardMode, TeachEnvConfig, TeachSimulator,
};
use anyhow::{Context, Result};
use embench_core::{
    error::EmbenchError,
    goal_condition_ratio,
    record::{Record, RecordValue},
    Action, Env, Observation, Step, StepInfo, HEAD_RGB,
};
use image::RgbImage;
use log::{info, trace, warn};
use std::path::{Path, PathBuf};

const FEEDBACK_SUCCESS: &str = "Last action executed successfully.";
const FEEDBACK_STOP: &str = "The episode is stopped.";
const FEEDBACK_NO_EPISODE: &str = "No active episode.";

/// Center of the frame in relative coordinates.
const CENTER: [f32; 2] = [0.5, 0.5];

/// State of the running episode.
struct Episode {
    instance: EdhInstance,
    frame: RgbImage,
    progress: EpisodeProgress,
    goal_condition_success: f32,
}

/// Environment of TEACh execution-from-dialog-history tasks.
///
/// Instances are served in file name order; the cursor wraps around after the
/// last one. Every [`Env::reset`] asks the simulator to replay the dialog and
/// action history of the next instance, trying up to `max_retries` instances
/// before giving up with a zero observation.
///
/// The simulator is started at the first reset which has an instance to
/// replay, and stopped by [`Env::close`].
pub struct TeachEnv<S: TeachSimulator> {
    config: TeachEnvConfig,
    vocabulary: ActionVocabulary,
    instance_files: Vec<PathBuf>,
    cursor: usize,
    simulator: Option<S>,
    episode: Option<Episode>,
    instruction: String,
    rng: fastrand::Rng,
}

impl<S: TeachSimulator> TeachEnv<S> {
    /// Builds the environment with a simulator started by the caller.
    pub fn with_simulator(config: &TeachEnvConfig, seed: i64, simulator: S) -> Result<Self> {
        let mut env = Self::build(config, seed)?;
        env.simulator = Some(simulator);
        Ok(env)
    }

    /// The action vocabulary.
    pub fn vocabulary(&self) -> &ActionVocabulary {
        &self.vocabulary
    }

    /// Instance files of the split, in the order they are served.
    pub fn instance_files(&self) -> &[PathBuf] {
        &self.instance_files
    }

    /// The instance of the current episode.
    pub fn current_instance(&self) -> Option<&EdhInstance> {
        self.episode.as_ref().map(|e| &e.instance)
    }

    /// Returns a mutable reference to the simulator, if started.
    pub fn simulator_mut(&mut self) -> Option<&mut S> {
        self.simulator.as_mut()
    }

    fn zero_frame(&self) -> RgbImage {
        RgbImage::new(self.config.resolution, self.config.resolution)
    }

    fn ego_frame(&self, simulator: &mut S) -> Result<RgbImage> {
        let mut images = simulator.latest_images()?;
        Ok(match images.remove(EGO) {
            Some(frame) => frame,
            None => {
                warn!("The simulator provided no {:?} frame", EGO);
                self.zero_frame()
            }
        })
    }

    fn interaction_point(&mut self, act: &Action) -> [f32; 2] {
        match act.coord {
            Some([x, y]) => [x.max(0.0).min(1.0), y.max(0.0).min(1.0)],
            None => match self.config.coord_strategy {
                CoordStrategy::Random => [self.rng.f32(), self.rng.f32()],
                CoordStrategy::Center => CENTER,
            },
        }
    }

    /// Tries to start an episode on the instance at `path`.
    ///
    /// Returns `None` when the simulator could not replay the history.
    fn start_episode(&mut self, path: &Path) -> Result<Option<Episode>> {
        let instance = EdhInstance::load(path)?;
        let game_file = self.config.game_file(&instance.game_id);

        let mut simulator = match self.simulator.take() {
            Some(simulator) => simulator,
            None => {
                info!("Starting the TEACh simulator");
                S::connect(&self.config)?
            }
        };
        let result = self.replay(&mut simulator, instance, game_file);
        self.simulator = Some(simulator);
        result
    }

    fn replay(
        &self,
        simulator: &mut S,
        instance: EdhInstance,
        game_file: PathBuf,
    ) -> Result<Option<Episode>> {
        trace!("TeachSimulator::initialize_episode({})", instance.instance_id);
        if !simulator.initialize_episode(&instance, &game_file)? {
            return Ok(None);
        }
        let frame = self.ego_frame(simulator)?;
        let progress = simulator.check_episode_progress()?;
        let goal_condition_success = goal_condition_ratio(
            progress.goal_conditions_satisfied,
            progress.goal_conditions_total,
        );
        Ok(Some(Episode {
            instance,
            frame,
            progress,
            goal_condition_success,
        }))
    }

    fn step_episode(
        &mut self,
        simulator: &mut S,
        episode: &mut Episode,
        act: &Action,
        name: String,
    ) -> Result<(Step, Record)> {
        // Stop ends the episode without consulting the simulator.
        let (coord, outcome) = if name == STOP {
            (CENTER, None)
        } else if self.vocabulary.is_interaction(&name) {
            let [x, y] = self.interaction_point(act);
            let outcome = simulator
                .apply_object_interaction(&name, y, x)
                .with_context(|| format!("Failed to apply {}", name))?;
            ([x, y], Some(outcome))
        } else {
            let outcome = simulator
                .apply_motion(&name)
                .with_context(|| format!("Failed to apply {}", name))?;
            (CENTER, Some(outcome))
        };

        if outcome.is_some() {
            episode.frame = self.ego_frame(simulator)?;
            episode.progress = simulator.check_episode_progress()?;
        }
        let progress = &episode.progress;
        let goal_condition_success = goal_condition_ratio(
            progress.goal_conditions_satisfied,
            progress.goal_conditions_total,
        );
        let reward = match self.config.reward_mode {
            RewardMode::Sparse => 0.0,
            RewardMode::GoalConditionDelta => {
                goal_condition_success - episode.goal_condition_success
            }
        };
        episode.goal_condition_success = goal_condition_success;

        let (success, env_feedback) = match &outcome {
            None => (true, FEEDBACK_STOP.to_string()),
            Some(o) if o.success => (true, FEEDBACK_SUCCESS.to_string()),
            Some(o) if o.message.is_empty() => (false, "Last action is invalid.".to_string()),
            Some(o) => (false, format!("Last action is invalid. {}", o.message)),
        };
        let task_success = progress.success;
        let done = outcome.is_none() || task_success;

        let info = StepInfo {
            success,
            task_success,
            goal_condition_success,
            action: name.clone(),
            coord,
            instruction: self.instruction.clone(),
            env_feedback,
        };
        let record = Record::from_slice(&[
            ("action", RecordValue::String(name)),
            ("action_success", RecordValue::flag(success)),
            ("task_success", RecordValue::flag(task_success)),
            (
                "goal_condition_success",
                RecordValue::Scalar(goal_condition_success),
            ),
            ("coord", RecordValue::Array1(coord.to_vec())),
        ]);
        let obs = Observation::from_frame(HEAD_RGB, episode.frame.clone());

        Ok((Step::new(obs, *act, reward, done, false, info), record))
    }

    fn no_episode_step(&self, act: &Action, name: &str) -> (Step, Record) {
        let info = StepInfo {
            success: false,
            task_success: false,
            goal_condition_success: 0.0,
            action: name.to_string(),
            coord: CENTER,
            instruction: self.instruction.clone(),
            env_feedback: FEEDBACK_NO_EPISODE.to_string(),
        };
        let obs = Observation::from_frame(HEAD_RGB, self.zero_frame());
        (
            Step::new(obs, *act, 0.0, true, false, info),
            Record::empty(),
        )
    }
}

impl<S: TeachSimulator> Env for TeachEnv<S> {
    type Config = TeachEnvConfig;

    /// Lists the instances of the split and loads the action vocabulary.
    ///
    /// The simulator is not started here.
    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let vocabulary = match &config.actions_file {
            Some(path) => ActionVocabulary::load(path)?,
            None => ActionVocabulary::default(),
        };
        let instance_files = list_instance_files(config.edh_dir())?;
        info!(
            "Found {} EDH instances in {:?}",
            instance_files.len(),
            config.edh_dir()
        );

        Ok(Self {
            config: config.clone(),
            vocabulary,
            instance_files,
            cursor: 0,
            simulator: None,
            episode: None,
            instruction: String::new(),
            rng: fastrand::Rng::with_seed(seed as u64),
        })
    }

    fn reset(&mut self) -> Result<Observation> {
        trace!("TeachEnv::reset()");
        self.episode = None;
        self.instruction.clear();

        if self.instance_files.is_empty() {
            warn!(
                "No EDH instance in {:?}, returning a zero observation",
                self.config.edh_dir()
            );
            return Ok(Observation::zeros(HEAD_RGB, self.config.resolution));
        }

        for attempt in 0..self.config.max_retries {
            let path = self.instance_files[self.cursor].clone();
            self.cursor = (self.cursor + 1) % self.instance_files.len();

            match self.start_episode(&path) {
                Ok(Some(episode)) => {
                    self.instruction = episode.instance.instruction();
                    info!(
                        "Started episode {} ({:?})",
                        episode.instance.instance_id, path
                    );
                    let obs = Observation::from_frame(HEAD_RGB, episode.frame.clone());
                    self.episode = Some(episode);
                    return Ok(obs);
                }
                Ok(None) => warn!(
                    "Attempt {}: failed to replay the history of {:?}",
                    attempt, path
                ),
                Err(e) => warn!("Attempt {}: failed to reset on {:?}: {:#}", attempt, path, e),
            }
        }

        warn!(
            "Failed to reset after {} attempts, returning a zero observation",
            self.config.max_retries
        );
        Ok(Observation::zeros(HEAD_RGB, self.config.resolution))
    }

    fn step(&mut self, act: &Action) -> Result<(Step, Record)> {
        trace!("TeachEnv::step({:?})", act);
        let name = match self.vocabulary.get(act.index) {
            Some(name) => name.to_string(),
            None => {
                return Err(EmbenchError::ActionOutOfRange {
                    index: act.index,
                    size: self.vocabulary.len(),
                }
                .into())
            }
        };

        let (mut simulator, mut episode) = match (self.simulator.take(), self.episode.take()) {
            (Some(simulator), Some(episode)) => (simulator, episode),
            (simulator, episode) => {
                self.simulator = simulator;
                self.episode = episode;
                return Ok(self.no_episode_step(act, &name));
            }
        };
        let result = self.step_episode(&mut simulator, &mut episode, act, name);
        self.simulator = Some(simulator);
        self.episode = Some(episode);
        result
    }

    fn close(&mut self) -> Result<()> {
        self.episode = None;
        if let Some(mut simulator) = self.simulator.take() {
            info!("Shutting down the TEACh simulator");
            simulator.shutdown()?;
        }
        Ok(())
    }

    fn instruction(&self) -> &str {
        &self.instruction
    }

    fn episode_id(&self) -> Option<String> {
        self.current_instance().map(|i| i.instance_id.clone())
    }

    fn action_vocabulary(&self) -> &[String] {
        self.vocabulary.names()
    }

    fn n_instances(&self) -> Option<usize> {
        Some(self.instance_files.len())
    }
}
