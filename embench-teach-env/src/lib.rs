//! Environment adapter for TEACh execution-from-dialog-history (EDH) tasks.
//!
//! [`TeachEnv`] implements [`Env`](embench_core::Env) on top of a
//! [`TeachSimulator`], which replays the dialog and action history of an EDH
//! instance and lets the agent continue from there.
//!
//! The dataset is expected in the layout of the TEACh release:
//!
//! ```text
//! <data_dir>/edh_instances/<split>/*.json
//! <data_dir>/games/<split>/<game_id>.game.json
//! ```
//!
//! With the `python` feature, [`PyTeachSimulator`] drives AI2-THOR through the
//! `teach` Python package.
mod actions;
mod config;
mod env;
mod instance;
#[cfg(feature = "python")]
mod py;
mod simulator;
pub use actions::{ActionVocabulary, STOP};
pub use config::{CoordStrategy, RewardMode, TeachEnvConfig};
pub use env::TeachEnv;
pub use instance::{list_instance_files, DialogTurn, EdhInstance};
#[cfg(feature = "python")]
pub use py::PyTeachSimulator;
pub use simulator::{ActionOutcome, EpisodeProgress, TeachSimulator, EGO};
