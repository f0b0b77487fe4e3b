//! Client of OpenAI-compatible chat APIs.
//!
//! [`RemoteModel`] implements [`LanguageModel`](embench_core::LanguageModel)
//! by posting the conversation to `<base_url>/chat/completions` with
//! [`reqwest::blocking`].
//!
//! ```no_run
//! use embench_core::{ChatMessage, LanguageModel};
//! use embench_remote_model::{ModelType, RemoteModel, RemoteModelConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = RemoteModelConfig::new("gpt-4o-mini", ModelType::Remote);
//! let mut model = RemoteModel::build(config)?;
//! let reply = model.respond(&[ChatMessage::user_text("Hello")])?;
//! # Ok(())
//! # }
//! ```
mod client;
mod config;
pub use client::{ChatRequest, ChatResponse, RemoteModel};
pub use config::{ModelType, RemoteModelConfig, DEFAULT_CUSTOM_BASE_URL, DEFAULT_REMOTE_BASE_URL};
