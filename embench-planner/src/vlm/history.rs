//! Sliding window of chat messages.
use embench_core::{ChatMessage, ContentPart, Role};

/// Keeps at most `capacity` of the most recent messages.
#[derive(Clone, Debug)]
pub struct MessageWindow {
    messages: Vec<ChatMessage>,
    capacity: usize,
}

impl MessageWindow {
    /// Constructs an empty window. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: vec![],
            capacity: capacity.max(1),
        }
    }

    /// Appends a message, dropping the oldest ones beyond the capacity.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        if self.messages.len() > self.capacity {
            let n = self.messages.len() - self.capacity;
            self.messages.drain(..n);
        }
    }

    /// Replaces the content of the window with a single message.
    pub fn replace(&mut self, message: ChatMessage) {
        self.messages.clear();
        self.messages.push(message);
    }

    /// Removes all messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The messages, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// `true` if the window holds no message.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The maximum number of messages.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy of the messages where only the latest user message keeps its
    /// images.
    pub fn truncated(&self) -> Vec<ChatMessage> {
        let last_user = self.messages.iter().rposition(|m| m.role == Role::User);
        self.messages
            .iter()
            .enumerate()
            .map(|(i, m)| {
                if m.role != Role::User || Some(i) == last_user {
                    m.clone()
                } else {
                    let content: Vec<ContentPart> =
                        m.content.iter().filter(|p| !p.is_image()).cloned().collect();
                    ChatMessage::new(m.role, content)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_image(text: &str) -> ChatMessage {
        ChatMessage::new(
            Role::User,
            vec![
                ContentPart::image_url("data:image/png;base64,AAAA"),
                ContentPart::text(text),
            ],
        )
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        let mut window = MessageWindow::new(3);
        for i in 0..10 {
            window.push(ChatMessage::user_text(i.to_string()));
            assert!(window.len() <= 3);
        }
        let texts: Vec<_> = window.messages().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["7", "8", "9"]);
    }

    #[test]
    fn test_replace() {
        let mut window = MessageWindow::new(3);
        window.push(ChatMessage::user_text("a"));
        window.push(ChatMessage::user_text("b"));
        window.replace(ChatMessage::user_text("c"));
        assert_eq!(window.len(), 1);
        assert_eq!(window.messages()[0].text(), "c");
    }

    #[test]
    fn test_truncated_keeps_images_of_latest_user_message() {
        let mut window = MessageWindow::new(10);
        window.push(user_with_image("first"));
        window.push(ChatMessage::assistant_text("{}"));
        window.push(user_with_image("second"));
        window.push(ChatMessage::assistant_text("{}"));

        let truncated = window.truncated();
        assert_eq!(truncated.len(), 4);
        assert_eq!(truncated[0].n_images(), 0);
        assert_eq!(truncated[0].text(), "first");
        assert_eq!(truncated[2].n_images(), 1);
        // The window itself is left untouched.
        assert_eq!(window.messages()[0].n_images(), 1);
    }
}
