//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum EmbenchError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// The environment name is not registered.
    #[error("Unknown environment: {0}")]
    UnknownEnv(String),

    /// The environment name is registered but no adapter is built in.
    #[error("Environment {0} is not supported by this build")]
    UnsupportedEnv(String),

    /// The model type is not one of the known backends.
    #[error("Unknown model type: {0}")]
    UnknownModelType(String),

    /// The action index is outside of the action vocabulary.
    #[error("Action index {index} is out of range (vocabulary size {size})")]
    ActionOutOfRange {
        /// The given index.
        index: usize,
        /// The number of actions in the vocabulary.
        size: usize,
    },
}
