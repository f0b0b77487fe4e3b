use anyhow::{bail, Result};
use embench_core::{
    goal_condition_ratio,
    record::{JsonlRecorder, Record, RecordValue},
    Action, Env, EpisodeEvaluator, EpisodeResult, Evaluator, EvaluatorConfig, Feedback,
    Observation, Plan, Policy, Step, StepInfo, HEAD_RGB,
};
use std::{collections::VecDeque, fs, path::Path};
use tempdir::TempDir;

const STOP: usize = 0;
const LEFT: usize = 1;
const RIGHT: usize = 2;
const GOAL: usize = 3;

#[derive(Clone)]
struct LineEnvConfig {
    n_instances: usize,
    /// Whether `n_instances` is reported to the evaluator.
    bounded: bool,
}

/// An agent on a line walking from 0 to [`GOAL`].
struct LineEnv {
    n_instances: usize,
    bounded: bool,
    episode: Option<usize>,
    pos: usize,
    vocabulary: Vec<String>,
    n_closed: usize,
}

impl Env for LineEnv {
    type Config = LineEnvConfig;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            n_instances: config.n_instances,
            bounded: config.bounded,
            episode: None,
            pos: 0,
            vocabulary: vec!["Stop".into(), "Left".into(), "Right".into()],
            n_closed: 0,
        })
    }

    fn reset(&mut self) -> Result<Observation> {
        let next = self.episode.map_or(0, |e| (e + 1) % self.n_instances);
        self.episode = Some(next);
        self.pos = 0;
        Ok(Observation::zeros(HEAD_RGB, 4))
    }

    fn step(&mut self, a: &Action) -> Result<(Step, Record)> {
        let success = match a.index {
            LEFT if self.pos == 0 => false,
            LEFT => {
                self.pos -= 1;
                true
            }
            RIGHT => {
                self.pos += 1;
                true
            }
            _ => true,
        };
        let task_success = self.pos == GOAL;
        let info = StepInfo {
            success,
            task_success,
            goal_condition_success: goal_condition_ratio(self.pos, GOAL),
            action: self.vocabulary[a.index].clone(),
            env_feedback: if success { "ok" } else { "blocked" }.to_string(),
            ..StepInfo::default()
        };
        let reward = if task_success { 1.0 } else { 0.0 };
        let done = task_success || a.index == STOP;
        let obs = Observation::zeros(HEAD_RGB, 4);
        Ok((
            Step::new(obs, *a, reward, done, false, info),
            Record::from_scalar("pos", self.pos as f32),
        ))
    }

    fn close(&mut self) -> Result<()> {
        self.n_closed += 1;
        Ok(())
    }

    fn instruction(&self) -> &str {
        "Walk to the goal"
    }

    fn episode_id(&self) -> Option<String> {
        self.episode.map(|e| format!("ep{}", e))
    }

    fn action_vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    fn n_instances(&self) -> Option<usize> {
        if self.bounded {
            Some(self.n_instances)
        } else {
            None
        }
    }
}

/// Replays prepared plans; fails when they run out.
#[derive(Default)]
struct ScriptedPolicy {
    plans: VecDeque<Vec<usize>>,
    feedback: Vec<Feedback>,
    n_calls: usize,
    n_resets: usize,
}

impl ScriptedPolicy {
    fn new(plans: &[&[usize]]) -> Self {
        Self {
            plans: plans.iter().map(|p| p.to_vec()).collect(),
            ..Self::default()
        }
    }
}

impl Policy for ScriptedPolicy {
    fn reset(&mut self) {
        self.n_calls = 0;
        self.n_resets += 1;
    }

    fn act(&mut self, _obs: &Observation, _instruction: &str) -> Result<Plan> {
        let actions = match self.plans.pop_front() {
            Some(ids) => ids.into_iter().map(Action::new).collect(),
            None => bail!("out of plans"),
        };
        self.n_calls += 1;
        Ok(Plan {
            actions,
            raw_output: String::new(),
            valid: true,
        })
    }

    fn update_info(&mut self, feedback: Feedback) {
        self.feedback.push(feedback);
    }

    fn record(&self) -> Record {
        Record::from_slice(&[("planner_steps", RecordValue::Scalar(self.n_calls as f32))])
    }
}

fn load_result(dir: &Path, id: &str) -> Result<EpisodeResult> {
    let path = dir
        .join("results")
        .join(format!("episode_{}_final_res.json", id));
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn evaluator(dir: &Path, n_instances: usize, max_steps: usize) -> Result<EpisodeEvaluator<LineEnv>> {
    build_evaluator(dir, n_instances, true, max_steps)
}

fn build_evaluator(
    dir: &Path,
    n_instances: usize,
    bounded: bool,
    max_steps: usize,
) -> Result<EpisodeEvaluator<LineEnv>> {
    let config = EvaluatorConfig::default()
        .n_episodes(3)
        .max_steps(max_steps)
        .result_dir(dir);
    let env = LineEnv::build(
        &LineEnvConfig {
            n_instances,
            bounded,
        },
        0,
    )?;
    EpisodeEvaluator::new(config, env)
}

fn result_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = vec![];
    for entry in fs::read_dir(dir.join("results"))? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name.ends_with("_final_res.json") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[test]
fn test_plan_stops_after_rejected_action() -> Result<()> {
    let tmp = TempDir::new("episode_evaluator")?;
    let recorder = JsonlRecorder::new(tmp.path().join("steps.jsonl"))?;
    let mut evaluator = evaluator(tmp.path(), 1, 10)?.with_recorder(Box::new(recorder));
    let mut policy = ScriptedPolicy::new(&[
        &[RIGHT, LEFT, LEFT, RIGHT],
        &[RIGHT, RIGHT, RIGHT, RIGHT],
    ]);

    let summary = evaluator.evaluate(&mut policy)?;

    // A single instance bounds the number of episodes.
    assert_eq!(summary.get_scalar("num_episodes")?, 1.0);
    assert_eq!(policy.n_resets, 1);

    let result = load_result(tmp.path(), "ep0")?;
    assert_eq!(result.instruction, "Walk to the goal");
    assert_eq!(result.num_steps, 6);
    assert_eq!(result.num_invalid_actions, 1);
    assert_eq!(result.planner_steps, 2);
    assert!(result.task_success);
    assert_eq!(result.goal_condition_success, 1.0);
    assert_eq!(result.reward, vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    assert!(result.error.is_none());

    assert_eq!(policy.feedback.len(), 6);
    assert_eq!(policy.feedback[2].env_feedback, "blocked");
    assert!(tmp.path().join("ep_0_start.png").exists());
    assert!(tmp.path().join("ep_0_step_5.png").exists());
    assert!(!tmp.path().join("ep_0_step_6.png").exists());
    assert!(tmp.path().join("results").join("summary.json").exists());

    let lines = fs::read_to_string(tmp.path().join("steps.jsonl"))?;
    // Six steps and the aggregate of the episode.
    assert_eq!(lines.lines().count(), 7);
    let first: serde_json::Value = serde_json::from_str(lines.lines().next().unwrap())?;
    assert_eq!(first["pos"], 1.0);
    assert!(first["timestamp"].as_str().unwrap().contains('T'));
    Ok(())
}

#[test]
fn test_step_budget_and_aborted_episode() -> Result<()> {
    let tmp = TempDir::new("episode_evaluator")?;
    let mut evaluator = evaluator(tmp.path(), 2, 2)?;
    let mut policy = ScriptedPolicy::new(&[&[RIGHT, RIGHT, RIGHT]]);

    let summary = evaluator.evaluate(&mut policy)?;
    assert_eq!(summary.get_scalar("num_episodes")?, 2.0);

    let first = load_result(tmp.path(), "ep0")?;
    assert_eq!(first.num_steps, 2);
    assert!(!first.task_success);
    assert!(first.error.is_none());

    // The policy fails at the first call of the second episode.
    let second = load_result(tmp.path(), "ep1")?;
    assert_eq!(second.num_steps, 0);
    assert_eq!(second.error.as_deref(), Some("out of plans"));

    assert_eq!(evaluator.env().n_closed, 0);
    let mut env = evaluator.into_env();
    env.close()?;
    assert_eq!(env.n_closed, 1);
    Ok(())
}

#[test]
fn test_empty_plan_aborts_episode() -> Result<()> {
    let tmp = TempDir::new("episode_evaluator")?;
    let mut evaluator = evaluator(tmp.path(), 1, 10)?;
    let mut policy = ScriptedPolicy::new(&[&[]]);

    evaluator.evaluate(&mut policy)?;
    let result = load_result(tmp.path(), "ep0")?;
    assert_eq!(result.num_steps, 0);
    assert!(result.error.is_some());
    Ok(())
}

#[test]
fn test_no_instance_runs_no_episode() -> Result<()> {
    let tmp = TempDir::new("episode_evaluator")?;
    let mut evaluator = evaluator(tmp.path(), 0, 10)?;
    let mut policy = ScriptedPolicy::new(&[&[RIGHT]]);

    let summary = evaluator.evaluate(&mut policy)?;
    assert_eq!(summary.get_scalar("num_episodes")?, 0.0);
    assert_eq!(policy.n_resets, 0);
    assert_eq!(policy.plans.len(), 1);
    assert!(result_files(tmp.path())?.is_empty());
    Ok(())
}

#[test]
fn test_repeated_episode_ids_keep_every_result() -> Result<()> {
    let tmp = TempDir::new("episode_evaluator")?;
    // A single instance served three times.
    let mut evaluator = build_evaluator(tmp.path(), 1, false, 10)?;
    let mut policy = ScriptedPolicy::new(&[&[RIGHT, RIGHT, RIGHT], &[STOP], &[LEFT, STOP]]);

    let summary = evaluator.evaluate(&mut policy)?;
    assert_eq!(summary.get_scalar("num_episodes")?, 3.0);
    assert_eq!(
        result_files(tmp.path())?,
        vec![
            "episode_ep0_1_final_res.json",
            "episode_ep0_2_final_res.json",
            "episode_ep0_final_res.json",
        ]
    );
    assert!(load_result(tmp.path(), "ep0")?.task_success);
    assert_eq!(load_result(tmp.path(), "ep0_1")?.num_steps, 1);
    assert_eq!(load_result(tmp.path(), "ep0_2")?.num_invalid_actions, 1);
    Ok(())
}
