//! Episode of uniformly random actions, logged for inspection.
use anyhow::{ensure, Result};
use embench_core::{
    util::{save_frame, write_gif},
    Action, Env, Observation, StepInfo,
};
use image::RgbImage;
use log::{info, warn};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Frame rate of `video.gif`.
const VIDEO_FPS: u32 = 10;

/// Log of a step.
#[derive(Debug, Serialize)]
pub struct StepLog {
    /// Index of the step; `0` is the initial observation.
    pub step: usize,

    /// Index of the action, `None` for the initial observation.
    pub action_id: Option<usize>,

    /// Name of the action.
    pub action_description: String,

    /// Reward.
    pub reward: f32,

    /// Whether the episode is over after this step.
    pub done: bool,

    /// Information reported by the environment.
    pub info: Option<StepInfo>,

    /// Saved frame.
    pub frame_path: Option<PathBuf>,
}

/// Log of an episode, written as `log.json`.
#[derive(Debug, Serialize)]
pub struct EpisodeLog {
    /// Name of the environment.
    pub env_name: String,

    /// Instruction of the episode.
    pub instruction: String,

    /// Steps, starting with the initial observation.
    pub steps: Vec<StepLog>,
}

/// `<root>/<env_name>/<timestamp>`.
pub fn log_dir(root: impl AsRef<Path>, env_name: &str) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    root.as_ref().join(env_name).join(timestamp)
}

/// Takes up to `n_steps` random actions in a fresh episode of `env`.
///
/// Frames are saved as `step_<i>.png` in `dir` next to `log.json` and
/// `video.gif`. The environment is closed afterwards.
pub fn run_random_agent<E: Env>(
    env: &mut E,
    env_name: &str,
    n_steps: usize,
    obs_key: &str,
    dir: impl AsRef<Path>,
    seed: u64,
) -> Result<EpisodeLog> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let n_actions = env.action_vocabulary().len();
    ensure!(n_actions > 0, "{} has no action", env_name);
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut frames: Vec<RgbImage> = vec![];

    let obs = env.reset()?;
    let mut log = EpisodeLog {
        env_name: env_name.to_string(),
        instruction: env.instruction().to_string(),
        steps: vec![StepLog {
            step: 0,
            action_id: None,
            action_description: "initial".to_string(),
            reward: 0.0,
            done: false,
            info: None,
            frame_path: persist(&obs, obs_key, dir, 0, &mut frames)?,
        }],
    };
    info!("Instruction: {}", log.instruction);

    for i in 1..=n_steps {
        let action_id = rng.usize(..n_actions);
        let action_description = env.action_vocabulary()[action_id].clone();
        let (step, _) = env.step(&Action::new(action_id))?;
        info!(
            "Step {}: {} ({}), reward={}",
            i, action_description, step.info.env_feedback, step.reward
        );

        let done = step.is_done();
        log.steps.push(StepLog {
            step: i,
            action_id: Some(action_id),
            action_description,
            reward: step.reward,
            done,
            frame_path: persist(&step.obs, obs_key, dir, i, &mut frames)?,
            info: Some(step.info),
        });
        if done {
            info!("Episode done at step {}", i);
            break;
        }
    }

    fs::write(dir.join("log.json"), serde_json::to_string_pretty(&log)?)?;
    if frames.is_empty() {
        warn!("No {:?} frame to write a video", obs_key);
    } else {
        write_gif(&frames, dir.join("video.gif"), VIDEO_FPS)?;
    }
    env.close()?;
    Ok(log)
}

fn persist(
    obs: &Observation,
    obs_key: &str,
    dir: &Path,
    i: usize,
    frames: &mut Vec<RgbImage>,
) -> Result<Option<PathBuf>> {
    match obs.frame(obs_key) {
        Some(frame) => {
            let path = dir.join(format!("step_{}.png", i));
            save_frame(frame, &path)?;
            frames.push(frame.clone());
            Ok(Some(path))
        }
        None => Ok(None),
    }
}
