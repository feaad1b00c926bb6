//! Session manager for REPL state
//!
//! Owns the conversation orchestrator and the signed-in user for the
//! lifetime of one interactive run.

use std::time::Instant;

use crate::assistant::ConversationOrchestrator;
use crate::session::SessionContext;
use crate::types::Message;

/// Default number of messages shown by `/history`
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Session manager maintaining REPL state
pub struct SessionManager {
    orchestrator: ConversationOrchestrator,
    auth: SessionContext,
    session_start: Instant,
}

impl SessionManager {
    pub fn new(orchestrator: ConversationOrchestrator, auth: SessionContext) -> Self {
        SessionManager {
            orchestrator,
            auth,
            session_start: Instant::now(),
        }
    }

    pub fn orchestrator(&self) -> &ConversationOrchestrator {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut ConversationOrchestrator {
        &mut self.orchestrator
    }

    pub fn auth(&self) -> &SessionContext {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut SessionContext {
        &mut self.auth
    }

    /// Last `limit` messages, oldest first
    pub fn get_history(&self, limit: usize) -> &[Message] {
        self.orchestrator.messages().recent(limit)
    }

    /// Messages exchanged after the greeting
    pub fn turn_count(&self) -> usize {
        self.orchestrator
            .messages()
            .iter()
            .filter(|m| !m.is_assistant())
            .count()
    }

    /// Get session duration in seconds
    pub fn session_duration(&self) -> u64 {
        self.session_start.elapsed().as_secs()
    }
}
