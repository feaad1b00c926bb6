//! Type definitions module
//!
//! Conversation messages and symptom records shared by every layer.

pub mod messages;
pub mod symptoms;

// Re-export commonly used types
pub use messages::{Category, Message, MessageLog, Origin};
pub use symptoms::{RecordId, Severity, SymptomRecord, DEFAULT_DURATION};
