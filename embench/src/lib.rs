//! Evaluation harness for vision-language planners on embodied tasks.
//!
//! The harness runs a [`VlmPlanner`](embench_planner::VlmPlanner) on an
//! environment of the registry and writes per-episode results and a summary
//! under `evaluate_results/<env>/<model>[_<exp_name>]/<eval_set>`. Only the
//! TEACh environment (`eb-teach`) is provided by this build.
//!
//! Two binaries are built:
//!
//! * `embench` evaluates a model, see [`cli::EvalArgs`] and [`TeachEvaluator`].
//! * `random_agent` logs an episode of random actions, see
//!   [`random_agent::run_random_agent`].
//!
//! The TEACh simulator is reached through Python; binaries need the `python`
//! feature to run it.
pub mod cli;
mod config;
pub mod random_agent;
pub mod registry;
mod teach;
pub use config::EvalConfig;
pub use registry::{EnvKind, ENV_NAMES};
pub use teach::{TeachEvaluator, CONFIG_FILE, STEPS_FILE};
