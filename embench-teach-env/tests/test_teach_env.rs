use anyhow::{bail, Result};
use embench_core::{error::EmbenchError, Action, Env, HEAD_RGB};
use embench_teach_env::{
    ActionOutcome, CoordStrategy, EdhInstance, EpisodeProgress, RewardMode, TeachEnv,
    TeachEnvConfig, TeachSimulator, EGO,
};
use image::RgbImage;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tempdir::TempDir;

/// Simulator recording the calls it receives.
#[derive(Default)]
struct MockSimulator {
    /// Result of `initialize_episode`.
    replay_ok: bool,
    /// Goal conditions satisfied after each applied action.
    satisfied_after: Vec<usize>,
    total: usize,
    initialized: Vec<String>,
    motions: Vec<String>,
    interactions: Vec<(String, f32, f32)>,
    n_shutdown: usize,
}

impl MockSimulator {
    fn new() -> Self {
        Self {
            replay_ok: true,
            total: 4,
            ..Self::default()
        }
    }

    fn n_applied(&self) -> usize {
        self.motions.len() + self.interactions.len()
    }
}

impl TeachSimulator for MockSimulator {
    fn connect(_config: &TeachEnvConfig) -> Result<Self> {
        Ok(Self::new())
    }

    fn initialize_episode(&mut self, instance: &EdhInstance, game_file: &Path) -> Result<bool> {
        assert!(game_file.ends_with(format!("{}.game.json", instance.game_id)));
        self.initialized.push(instance.instance_id.clone());
        Ok(self.replay_ok)
    }

    fn latest_images(&mut self) -> Result<HashMap<String, RgbImage>> {
        let mut images = HashMap::new();
        images.insert(EGO.to_string(), RgbImage::new(16, 12));
        Ok(images)
    }

    fn apply_motion(&mut self, action: &str) -> Result<ActionOutcome> {
        self.motions.push(action.to_string());
        if action == "Backward" {
            Ok(ActionOutcome::failed("Collision"))
        } else {
            Ok(ActionOutcome::ok())
        }
    }

    fn apply_object_interaction(&mut self, action: &str, y: f32, x: f32) -> Result<ActionOutcome> {
        self.interactions.push((action.to_string(), y, x));
        Ok(ActionOutcome::ok())
    }

    fn check_episode_progress(&mut self) -> Result<EpisodeProgress> {
        let n = self.n_applied();
        let satisfied = match n {
            0 => 0,
            _ => self.satisfied_after.get(n - 1).copied().unwrap_or(0),
        };
        Ok(EpisodeProgress {
            task_desc: "Make coffee".into(),
            success: satisfied >= self.total,
            goal_conditions_total: self.total,
            goal_conditions_satisfied: satisfied,
        })
    }

    fn shutdown(&mut self) -> Result<()> {
        self.n_shutdown += 1;
        Ok(())
    }
}

/// Simulator which cannot be started.
struct BrokenSimulator;

impl TeachSimulator for BrokenSimulator {
    fn connect(_config: &TeachEnvConfig) -> Result<Self> {
        bail!("no display")
    }

    fn initialize_episode(&mut self, _: &EdhInstance, _: &Path) -> Result<bool> {
        unimplemented!()
    }

    fn latest_images(&mut self) -> Result<HashMap<String, RgbImage>> {
        unimplemented!()
    }

    fn apply_motion(&mut self, _: &str) -> Result<ActionOutcome> {
        unimplemented!()
    }

    fn apply_object_interaction(&mut self, _: &str, _: f32, _: f32) -> Result<ActionOutcome> {
        unimplemented!()
    }

    fn check_episode_progress(&mut self) -> Result<EpisodeProgress> {
        unimplemented!()
    }

    fn shutdown(&mut self) -> Result<()> {
        unimplemented!()
    }
}

/// Writes `ids` as EDH instances of split `valid_seen` under `root`.
fn write_dataset(root: &Path, ids: &[&str]) -> Result<TeachEnvConfig> {
    let dir = root.join("edh_instances").join("valid_seen");
    fs::create_dir_all(&dir)?;
    for id in ids.iter() {
        fs::write(
            dir.join(format!("{}.json", id)),
            format!(
                r#"{{"instance_id": "{}", "game_id": "game_{}", "dialog_history": [["Commander", "Make coffee."], ["Driver", "Ok."]]}}"#,
                id, id
            ),
        )?;
    }
    Ok(TeachEnvConfig::default().data_dir(root).resolution(32))
}

fn build(config: &TeachEnvConfig) -> Result<TeachEnv<MockSimulator>> {
    TeachEnv::with_simulator(config, 42, MockSimulator::new())
}

fn index(env: &TeachEnv<MockSimulator>, name: &str) -> usize {
    env.vocabulary().index_of(name).unwrap()
}

#[test]
fn test_instances_are_visited_in_order_and_wrap() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let config = write_dataset(dir.path(), &["b_edh", "a_edh"])?;
    let mut env = build(&config)?;
    assert_eq!(env.n_instances(), Some(2));

    let mut visited = vec![];
    for _ in 0..3 {
        let obs = env.reset()?;
        assert_eq!(obs.frame(HEAD_RGB).unwrap().dimensions(), (16, 12));
        visited.push(env.episode_id().unwrap());
    }
    assert_eq!(visited, vec!["a_edh", "b_edh", "a_edh"]);
    assert_eq!(env.instruction(), "Make coffee. Ok.");
    Ok(())
}

#[test]
fn test_reset_gives_up_after_max_retries() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let config = write_dataset(dir.path(), &["a", "b"])?;
    let mut simulator = MockSimulator::new();
    simulator.replay_ok = false;
    let mut env = TeachEnv::with_simulator(&config, 0, simulator)?;

    let obs = env.reset()?;
    let frame = obs.frame(HEAD_RGB).unwrap();
    assert_eq!(frame.dimensions(), (32, 32));
    assert!(frame.pixels().all(|p| p.0 == [0, 0, 0]));
    assert_eq!(env.episode_id(), None);
    assert_eq!(
        env.simulator_mut().unwrap().initialized,
        vec!["a", "b", "a"]
    );

    // Without an episode, a step ends it immediately.
    let (step, _) = env.step(&Action::new(1))?;
    assert!(step.is_done());
    assert!(!step.info.success);
    Ok(())
}

#[test]
fn test_unreadable_instances_consume_retries() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let config = write_dataset(dir.path(), &["good"])?;
    fs::write(config.edh_dir().join("bad.json"), "{ not json")?;
    let mut env = build(&config)?;

    env.reset()?;
    assert_eq!(env.episode_id().as_deref(), Some("good"));
    assert_eq!(env.simulator_mut().unwrap().initialized, vec!["good"]);
    Ok(())
}

#[test]
fn test_empty_split() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let config = TeachEnvConfig::default().data_dir(dir.path()).resolution(8);
    let mut env = TeachEnv::<BrokenSimulator>::build(&config, 0)?;
    assert_eq!(env.n_instances(), Some(0));

    // The simulator is not started without an instance to replay.
    let obs = env.reset()?;
    assert_eq!(obs.frame(HEAD_RGB).unwrap().dimensions(), (8, 8));
    env.close()?;
    Ok(())
}

#[test]
fn test_failing_simulator_start_degrades_to_zero_observation() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let config = write_dataset(dir.path(), &["a"])?;
    let mut env = TeachEnv::<BrokenSimulator>::build(&config, 0)?;
    let obs = env.reset()?;
    assert_eq!(obs.frame(HEAD_RGB).unwrap().dimensions(), (32, 32));
    Ok(())
}

#[test]
fn test_step_before_reset() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let config = write_dataset(dir.path(), &["a"])?;
    let mut env = build(&config)?;
    let (step, _) = env.step(&Action::new(1))?;
    assert!(step.is_done());
    assert_eq!(step.obs.frame(HEAD_RGB).unwrap().dimensions(), (32, 32));
    assert!(env.simulator_mut().unwrap().motions.is_empty());
    Ok(())
}

#[test]
fn test_out_of_vocabulary_action_is_an_error() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let config = write_dataset(dir.path(), &["a"])?;
    let mut env = build(&config)?;
    env.reset()?;
    let err = env.step(&Action::new(17)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EmbenchError>(),
        Some(EmbenchError::ActionOutOfRange {
            index: 17,
            size: 17
        })
    ));
    Ok(())
}

#[test]
fn test_motion_and_interaction() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let config = write_dataset(dir.path(), &["a"])?;
    let mut env = build(&config)?;
    env.reset()?;

    let (step, record) = env.step(&Action::new(index(&env, "Forward")))?;
    assert!(step.info.success);
    assert!(!step.is_done());
    assert_eq!(step.info.coord, [0.5, 0.5]);
    assert_eq!(step.info.action, "Forward");
    assert_eq!(step.info.env_feedback, "Last action executed successfully.");
    assert_eq!(step.info.instruction, "Make coffee. Ok.");
    assert_eq!(step.reward, 0.0);
    assert_eq!(record.get_string("action")?, "Forward");

    let (step, _) = env.step(&Action::new(index(&env, "Backward")))?;
    assert!(!step.info.success);
    assert_eq!(step.info.env_feedback, "Last action is invalid. Collision");

    for _ in 0..50 {
        let (step, _) = env.step(&Action::new(index(&env, "Pickup")))?;
        let [x, y] = step.info.coord;
        assert!((0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y));
    }

    let (step, _) = env.step(&Action::new(index(&env, "Open")).with_coord(0.25, 1.5))?;
    assert_eq!(step.info.coord, [0.25, 1.0]);
    let (action, y, x) = env.simulator_mut().unwrap().interactions.last().cloned().unwrap();
    assert_eq!((action.as_str(), y, x), ("Open", 1.0, 0.25));
    Ok(())
}

#[test]
fn test_center_strategy() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let config = write_dataset(dir.path(), &["a"])?.coord_strategy(CoordStrategy::Center);
    let mut env = build(&config)?;
    env.reset()?;
    let (step, _) = env.step(&Action::new(index(&env, "Slice")))?;
    assert_eq!(step.info.coord, [0.5, 0.5]);
    Ok(())
}

#[test]
fn test_stop_does_not_touch_the_simulator() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let config = write_dataset(dir.path(), &["a"])?;
    let mut env = build(&config)?;
    env.reset()?;
    let (step, _) = env.step(&Action::new(index(&env, "Stop")))?;
    assert!(step.is_done());
    assert!(step.info.success);
    assert!(!step.info.task_success);
    assert_eq!(env.simulator_mut().unwrap().n_applied(), 0);
    Ok(())
}

#[test]
fn test_task_success_ends_episode_and_dense_reward() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let config = write_dataset(dir.path(), &["a"])?.reward_mode(RewardMode::GoalConditionDelta);
    let mut simulator = MockSimulator::new();
    simulator.satisfied_after = vec![1, 1, 4];
    let mut env = TeachEnv::with_simulator(&config, 0, simulator)?;
    env.reset()?;

    let forward = Action::new(index(&env, "Forward"));
    let (step, _) = env.step(&forward)?;
    assert_eq!(step.reward, 0.25);
    assert_eq!(step.info.goal_condition_success, 0.25);
    assert!(!step.is_done());

    let (step, _) = env.step(&forward)?;
    assert_eq!(step.reward, 0.0);

    let (step, _) = env.step(&forward)?;
    assert_eq!(step.reward, 0.75);
    assert!(step.info.task_success);
    assert!(step.is_done());
    Ok(())
}

#[test]
fn test_close_shuts_down_simulator() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let config = write_dataset(dir.path(), &["a"])?;
    let mut env = build(&config)?;
    env.reset()?;
    env.close()?;
    assert!(env.simulator_mut().is_none());
    env.close()?;
    Ok(())
}

#[test]
fn test_custom_vocabulary() -> Result<()> {
    let dir = TempDir::new("teach_env")?;
    let path: PathBuf = dir.path().join("actions.json");
    fs::write(
        &path,
        r#"{"all_agent_actions": ["Stop", "Forward", "Pickup"], "obj_interaction_actions": ["Pickup"]}"#,
    )?;
    let config = write_dataset(dir.path(), &["a"])?.actions_file(&path);
    let env = build(&config)?;
    assert_eq!(env.action_vocabulary(), &["Stop", "Forward", "Pickup"]);
    Ok(())
}
