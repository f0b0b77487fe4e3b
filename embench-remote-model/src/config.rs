//! Configuration of [`RemoteModel`](super::RemoteModel).
use anyhow::Result;
use embench_core::error::EmbenchError;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fmt,
    fs::File,
    io::{BufReader, Write},
    path::Path,
    str::FromStr,
};

/// Base URL of `remote` models unless `OPENAI_BASE_URL` is set.
pub const DEFAULT_REMOTE_BASE_URL: &str = "https://api.openai.com/v1";

/// Base URL of `custom` models, served locally.
pub const DEFAULT_CUSTOM_BASE_URL: &str = "http://localhost:23333/v1";

/// Where the model is served.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// A hosted API, configured by `OPENAI_BASE_URL` and `OPENAI_API_KEY`.
    Remote,

    /// A local OpenAI-compatible server.
    Custom,
}

impl FromStr for ModelType {
    type Err = EmbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote" => Ok(ModelType::Remote),
            "custom" => Ok(ModelType::Custom),
            _ => Err(EmbenchError::UnknownModelType(s.to_string())),
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelType::Remote => write!(f, "remote"),
            ModelType::Custom => write!(f, "custom"),
        }
    }
}

/// Configuration of [`RemoteModel`](super::RemoteModel).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RemoteModelConfig {
    /// Name of the model sent with every request.
    pub model_name: String,

    /// Where the model is served.
    pub model_type: ModelType,

    /// Base URL overriding the environment and the defaults.
    #[serde(default)]
    pub base_url: Option<String>,

    /// API key overriding `OPENAI_API_KEY`.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Sampling temperature.
    #[serde(default)]
    pub temperature: f32,

    /// The maximum number of tokens of a reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Timeout of a request in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_tokens() -> usize {
    2048
}

fn default_timeout_secs() -> u64 {
    120
}

impl RemoteModelConfig {
    /// Constructs a configuration with default sampling parameters.
    pub fn new(model_name: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            model_name: model_name.into(),
            model_type,
            base_url: None,
            api_key: None,
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, v: impl Into<String>) -> Self {
        self.base_url = Some(v.into());
        self
    }

    /// Sets the API key.
    pub fn api_key(mut self, v: impl Into<String>) -> Self {
        self.api_key = Some(v.into());
        self
    }

    /// Sets the sampling temperature.
    pub fn temperature(mut self, v: f32) -> Self {
        self.temperature = v;
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout_secs(mut self, v: u64) -> Self {
        self.timeout_secs = v;
        self
    }

    /// Resolves the base URL given the value of `OPENAI_BASE_URL`.
    pub(crate) fn base_url_with(&self, env_base_url: Option<String>) -> String {
        let url = match (&self.base_url, self.model_type) {
            (Some(url), _) => url.clone(),
            (None, ModelType::Remote) => {
                env_base_url.unwrap_or_else(|| DEFAULT_REMOTE_BASE_URL.to_string())
            }
            (None, ModelType::Custom) => DEFAULT_CUSTOM_BASE_URL.to_string(),
        };
        url.trim_end_matches('/').to_string()
    }

    /// The base URL of the endpoint.
    pub fn resolve_base_url(&self) -> String {
        self.base_url_with(env::var("OPENAI_BASE_URL").ok())
    }

    /// The API key, empty if none is configured.
    pub fn resolve_api_key(&self) -> String {
        match &self.api_key {
            Some(key) => key.clone(),
            None => env::var("OPENAI_API_KEY").unwrap_or_default(),
        }
    }

    /// Constructs [`RemoteModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RemoteModelConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
