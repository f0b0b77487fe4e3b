//! Language model.
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// The author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message.
    System,
    /// User message.
    User,
    /// Model reply.
    Assistant,
}

/// Reference to an image, typically a `data:` URL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// The URL.
    pub url: String,
}

/// A part of the content of a chat message.
///
/// Serialized in the layout of OpenAI-compatible chat APIs, e.g.
/// `{"type": "text", "text": "..."}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text.
    Text {
        /// The text.
        text: String,
    },
    /// Image.
    ImageUrl {
        /// The image reference.
        image_url: ImageUrl,
    },
}

impl ContentPart {
    /// Constructs a text part.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Constructs an image part.
    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }

    /// `true` for an image part.
    pub fn is_image(&self) -> bool {
        matches!(self, ContentPart::ImageUrl { .. })
    }
}

/// A single message in a chat conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author.
    pub role: Role,

    /// The content parts of the message.
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    /// Constructs a message.
    pub fn new(role: Role, content: Vec<ContentPart>) -> Self {
        Self { role, content }
    }

    /// Constructs a user message holding only text.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentPart::text(text)])
    }

    /// Constructs an assistant message holding only text.
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![ContentPart::text(text)])
    }

    /// Concatenation of the text parts.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of image parts.
    pub fn n_images(&self) -> usize {
        self.content.iter().filter(|p| p.is_image()).count()
    }
}

/// A model answering a chat conversation with text.
pub trait LanguageModel {
    /// Returns the reply of the model to `messages`.
    fn respond(&mut self, messages: &[ChatMessage]) -> Result<String>;
}

impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    fn respond(&mut self, messages: &[ChatMessage]) -> Result<String> {
        (**self).respond(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_part_layout() {
        let msg = ChatMessage::new(
            Role::User,
            vec![
                ContentPart::image_url("data:image/png;base64,AAAA"),
                ContentPart::text("hello"),
            ],
        );
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"][0]["type"], "image_url");
        assert_eq!(
            value["content"][0]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
        assert_eq!(value["content"][1]["type"], "text");
        assert_eq!(value["content"][1]["text"], "hello");
        assert_eq!(msg.n_images(), 1);
        assert_eq!(msg.text(), "hello");
    }
}
