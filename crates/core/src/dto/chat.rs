//! AgriBot chat messages.

use serde::{Deserialize, Serialize};

/// Greeting the assistant opens every conversation with.
pub const WELCOME_MESSAGE: &str =
    "Chào mừng bạn đến với AgriBot! Tôi có thể giúp gì cho bạn về nông nghiệp hôm nay?";

/// Conversation starters offered before the first question.
pub const SUGGESTED_PROMPTS: [&str; 4] = [
    "So sánh phân bón",
    "Các loại sâu bệnh trên cây lúa",
    "Phương pháp tưới tiêu hiệu quả",
    "Lịch thời vụ",
];

/// Who wrote a message. The bot is `model` on the wire, as Gemini names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(rename = "model")]
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Sender,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Sender, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: timestamp.to_string(),
            role,
            text: text.into(),
            timestamp,
        }
    }

    /// The greeting that opens a conversation.
    #[must_use]
    pub fn welcome(timestamp: i64) -> Self {
        Self {
            id: "welcome-msg".to_string(),
            ..Self::new(Sender::Bot, WELCOME_MESSAGE, timestamp)
        }
    }
}

/// Prior turns worth sending as context: a conversation must open with a
/// user message, so bot messages before the first one are dropped.
#[must_use]
pub fn conversation_context(history: &[ChatMessage]) -> &[ChatMessage] {
    let first_user = history
        .iter()
        .position(|message| message.role == Sender::User)
        .unwrap_or(history.len());
    history.get(first_user..).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_wire_names() {
        assert_eq!(serde_json::to_value(Sender::User).unwrap(), "user");
        assert_eq!(serde_json::to_value(Sender::Bot).unwrap(), "model");
    }

    #[test]
    fn test_context_drops_leading_bot_messages() {
        let history = vec![
            ChatMessage::welcome(1),
            ChatMessage::new(Sender::Bot, "Bạn cần gì?", 2),
            ChatMessage::new(Sender::User, "Bón phân gì cho lúa?", 3),
            ChatMessage::new(Sender::Bot, "Dùng NPK.", 4),
            ChatMessage::new(Sender::User, "Liều lượng?", 5),
        ];
        let context = conversation_context(&history);
        assert_eq!(context.len(), 3);
        assert_eq!(context.first().unwrap().text, "Bón phân gì cho lúa?");
        // Bot replies after the first question stay.
        assert_eq!(context.get(1).unwrap().role, Sender::Bot);
    }

    #[test]
    fn test_context_of_greeting_only_is_empty() {
        assert!(conversation_context(&[ChatMessage::welcome(1)]).is_empty());
        assert!(conversation_context(&[]).is_empty());
    }
}
