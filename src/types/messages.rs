//! Conversation message types
//!
//! A `Message` is immutable once built. The `MessageLog` only ever appends,
//! so insertion order is display order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Presentation category of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    General,
    Warning,
    Success,
    Info,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Warning => "warning",
            Category::Success => "success",
            Category::Info => "info",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    User,
    Assistant,
}

/// One entry in the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    text: String,
    origin: Origin,
    created_at: DateTime<Utc>,
    category: Category,
}

impl Message {
    /// User messages always carry the general category
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::User,
            created_at: Utc::now(),
            category: Category::General,
        }
    }

    pub fn assistant(text: impl Into<String>, category: Category) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Assistant,
            created_at: Utc::now(),
            category,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_assistant(&self) -> bool {
        self.origin == Origin::Assistant
    }
}

/// Append-only conversation log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return a reference to the stored copy
    pub fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        // just pushed, never empty
        &self.messages[self.messages.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Last `limit` messages, oldest first
    pub fn recent(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_is_general() {
        let msg = Message::user("hello");
        assert_eq!(msg.origin(), Origin::User);
        assert_eq!(msg.category(), Category::General);
        assert!(!msg.is_assistant());
    }

    #[test]
    fn test_assistant_message_keeps_category() {
        let msg = Message::assistant("call now", Category::Warning);
        assert!(msg.is_assistant());
        assert_eq!(msg.category(), Category::Warning);
    }

    #[test]
    fn test_log_preserves_insertion_order() {
        let mut log = MessageLog::new();
        log.push(Message::user("first"));
        log.push(Message::assistant("second", Category::Info));
        log.push(Message::user("third"));

        let texts: Vec<&str> = log.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(log.last().unwrap().text(), "third");
    }

    #[test]
    fn test_recent_slice() {
        let mut log = MessageLog::new();
        for i in 0..5 {
            log.push(Message::user(format!("m{}", i)));
        }
        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].text(), "m3");
        assert_eq!(log.recent(50).len(), 5);
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&Category::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
        assert_eq!(Category::Success.to_string(), "success");
    }
}
