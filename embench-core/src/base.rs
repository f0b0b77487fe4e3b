//! Core functionalities.
mod act;
mod env;
mod model;
mod obs;
mod policy;
mod step;
pub use act::Action;
pub use env::Env;
pub use model::{ChatMessage, ContentPart, ImageUrl, LanguageModel, Role};
pub use obs::{Observation, HEAD_RGB};
pub use policy::{Feedback, Plan, Policy};
pub use step::{goal_condition_ratio, Step, StepInfo};
