//! Blocking client of OpenAI-compatible chat completion APIs.
use crate::{ModelType, RemoteModelConfig};
use anyhow::{bail, Context, Result};
use embench_core::{ChatMessage, LanguageModel};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of a `/chat/completions` request.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    /// Name of the model.
    pub model: &'a str,

    /// The conversation.
    pub messages: &'a [ChatMessage],

    /// Sampling temperature.
    pub temperature: f32,

    /// The maximum number of tokens of the reply.
    pub max_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

/// Body of a `/chat/completions` response, reduced to the fields in use.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    choices: Vec<Choice>,

    #[serde(default)]
    usage: Option<Usage>,
}

impl ChatResponse {
    /// Text of the first choice.
    pub fn text(&self) -> Result<&str> {
        match self.choices.first() {
            Some(choice) => Ok(choice.message.content.as_deref().unwrap_or("")),
            None => bail!("The response holds no choice"),
        }
    }
}

/// A model served through an OpenAI-compatible chat API.
pub struct RemoteModel {
    client: Client,

    /// Base URL.
    base_url: String,

    api_key: String,

    config: RemoteModelConfig,
}

impl RemoteModel {
    /// Builds the HTTP client. No request is sent.
    pub fn build(config: RemoteModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build the HTTP client")?;
        let base_url = config.resolve_base_url();
        let api_key = config.resolve_api_key();
        if api_key.is_empty() && config.model_type == ModelType::Remote {
            warn!("OPENAI_API_KEY is not set");
        }
        info!(
            "Model {} ({}) served at {}",
            config.model_name, config.model_type, base_url
        );

        Ok(Self {
            client,
            base_url,
            api_key,
            config,
        })
    }

    /// Name of the model.
    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    /// URL of the chat completion endpoint.
    pub fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model_name,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

impl LanguageModel for RemoteModel {
    fn respond(&mut self, messages: &[ChatMessage]) -> Result<String> {
        debug!(
            "Sending {} messages to {}",
            messages.len(),
            self.config.model_name
        );
        let mut builder = self.client.post(self.url()).json(&self.request(messages));
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }
        let resp = builder
            .send()
            .context("Failed to send the chat completion request")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            bail!("Chat completion API returned {}: {}", status, text);
        }

        let resp: ChatResponse = resp
            .json()
            .context("Failed to parse the chat completion response")?;
        if let Some(usage) = &resp.usage {
            debug!(
                "prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }
        Ok(resp.text()?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embench_core::{ContentPart, Role};

    #[test]
    fn test_request_layout() -> Result<()> {
        let config = RemoteModelConfig::new("gpt-4o-mini", ModelType::Custom)
            .base_url("http://localhost:8000/v1/");
        let model = RemoteModel::build(config)?;
        assert_eq!(model.url(), "http://localhost:8000/v1/chat/completions");

        let messages = vec![ChatMessage::new(
            Role::User,
            vec![
                ContentPart::image_url("data:image/png;base64,AAAA"),
                ContentPart::text("Where is the mug?"),
            ],
        )];
        let body = serde_json::to_value(&model.request(&messages))?;
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 2048);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["type"], "image_url");
        assert_eq!(body["messages"][0]["content"][1]["text"], "Where is the mug?");
        Ok(())
    }

    #[test]
    fn test_parse_response() -> Result<()> {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"executable_plan\": []}"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let resp: ChatResponse = serde_json::from_str(body)?;
        assert_eq!(resp.text()?, "{\"executable_plan\": []}");

        let resp: ChatResponse = serde_json::from_str(r#"{"choices": []}"#)?;
        assert!(resp.text().is_err());
        Ok(())
    }

    #[test]
    fn test_unreachable_server_is_an_error() -> Result<()> {
        let config = RemoteModelConfig::new("any", ModelType::Custom)
            .base_url("http://127.0.0.1:9/v1")
            .timeout_secs(2);
        let mut model = RemoteModel::build(config)?;
        assert!(model.respond(&[ChatMessage::user_text("hi")]).is_err());
        Ok(())
    }
}
