//! Conversation layer
//!
//! Turn sequencing, the responder seam and lifecycle events.

pub mod events;
pub mod orchestrator;
pub mod responder;

// Re-export commonly used types
pub use events::{AssistantEvent, EventBus, NoticeLevel};
pub use orchestrator::{AssistantConfig, ConversationOrchestrator};
pub use responder::{Reply, ReplyRequest, ReplySource, Responder, SimulatedResponder};
