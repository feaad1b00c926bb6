//! Event bus for assistant lifecycle updates
//!
//! Publisher-subscriber over a bounded channel. The front end subscribes to
//! drive its "typing" indicator; nothing in the assistant depends on a
//! subscriber being present.

use std::fmt;
use tokio::sync::mpsc;

use crate::ledger::Cluster;
use crate::types::Category;

/// Channel capacity; events beyond this are dropped
pub const EVENT_CAPACITY: usize = 100;

/// Assistant lifecycle events
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantEvent {
    /// User message appended, reply computation started
    TurnStarted { text: String },

    /// Ledger snapshot sent for analysis
    AnalysisStarted { symptoms: usize },

    /// Assistant message appended
    ReplyReady { category: Category, duration_ms: u64 },

    /// Analysis result appended
    AnalysisComplete { cluster: Option<Cluster>, urgent: bool },

    /// Ledger changed
    LedgerChanged { len: usize },

    /// User-facing notice that did not touch the log
    Notice { message: String, level: NoticeLevel },
}

/// Notice severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "INFO"),
            NoticeLevel::Warning => write!(f, "WARN"),
            NoticeLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Event bus publishing assistant events
pub struct EventBus {
    sender: mpsc::Sender<AssistantEvent>,
}

impl EventBus {
    /// Create new event bus with bounded channel
    pub fn new() -> (Self, mpsc::Receiver<AssistantEvent>) {
        let (sender, receiver) = mpsc::channel(EVENT_CAPACITY);
        (EventBus { sender }, receiver)
    }

    /// Emit an event without blocking
    ///
    /// Full channel or dropped receiver: the event is discarded.
    pub fn emit(&self, event: AssistantEvent) {
        if let Err(e) = self.sender.try_send(event) {
            tracing::debug!(error = %e, "assistant event dropped");
        }
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        EventBus {
            sender: self.sender.clone(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_event_emission() {
        let (bus, mut receiver) = EventBus::new();

        bus.emit(AssistantEvent::TurnStarted {
            text: "fever".to_string(),
        });

        let event = timeout(Duration::from_millis(100), receiver.recv())
            .await
            .expect("Timeout waiting for event")
            .expect("Channel closed");

        assert_eq!(
            event,
            AssistantEvent::TurnStarted {
                text: "fever".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (bus, mut receiver) = EventBus::new();

        bus.emit(AssistantEvent::AnalysisStarted { symptoms: 2 });
        bus.emit(AssistantEvent::AnalysisComplete {
            cluster: Some(Cluster::ColdLike),
            urgent: false,
        });

        assert!(matches!(
            receiver.recv().await.unwrap(),
            AssistantEvent::AnalysisStarted { symptoms: 2 }
        ));
        assert!(matches!(
            receiver.recv().await.unwrap(),
            AssistantEvent::AnalysisComplete { .. }
        ));
    }

    #[tokio::test]
    async fn test_bounded_channel_drops_overflow() {
        let (bus, mut receiver) = EventBus::new();

        for i in 0..(EVENT_CAPACITY + 50) {
            bus.emit(AssistantEvent::LedgerChanged { len: i });
        }

        let mut received = 0;
        while let Ok(_event) = receiver.try_recv() {
            received += 1;
        }
        assert_eq!(received, EVENT_CAPACITY);
    }

    #[test]
    fn test_emit_without_subscriber_is_harmless() {
        let bus = EventBus::default();
        bus.emit(AssistantEvent::LedgerChanged { len: 0 });
    }

    #[test]
    fn test_notice_level_display() {
        assert_eq!(NoticeLevel::Info.to_string(), "INFO");
        assert_eq!(NoticeLevel::Warning.to_string(), "WARN");
        assert_eq!(NoticeLevel::Error.to_string(), "ERROR");
    }
}
