//! Conversation orchestrator
//!
//! Owns the message log and the symptom ledger for one conversation and
//! sequences turns:
//!
//! 1. `submit` appends the user message immediately and starts the reply
//! 2. `await_reply` waits for it and appends the assistant message
//!
//! At most one reply is outstanding. A second submission while one is
//! pending is rejected, not queued, and a started reply is never cancelled.
//! Reply tasks are spawned on the ambient tokio runtime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use crate::assistant::events::{AssistantEvent, EventBus, NoticeLevel};
use crate::assistant::responder::{Reply, ReplyRequest, ReplySource, Responder, SimulatedResponder};
use crate::errors::{AssistantError, Result};
use crate::ledger::SymptomLedger;
use crate::matcher::GREETING_MESSAGE;
use crate::telemetry::{TelemetryCollector, TelemetryEvent};
use crate::types::{Category, Message, MessageLog, RecordId, Severity, SymptomRecord};

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Artificial latency before each reply
    pub response_delay: Duration,
    /// Open the log with the assistant greeting
    pub greeting: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            response_delay: Duration::from_millis(1000),
            greeting: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    Turn,
    Analysis { symptoms: usize },
}

struct PendingReply {
    kind: PendingKind,
    started: Instant,
    handle: JoinHandle<Reply>,
}

/// Sequences user turns, assistant replies and ledger analysis
pub struct ConversationOrchestrator {
    log: MessageLog,
    ledger: SymptomLedger,
    responder: Arc<dyn Responder>,
    pending: Option<PendingReply>,
    event_bus: EventBus,
    telemetry: TelemetryCollector,
}

impl ConversationOrchestrator {
    /// Orchestrator backed by the rule-based responder
    pub fn new(config: &AssistantConfig) -> Self {
        Self::with_responder(
            Arc::new(SimulatedResponder::new(config.response_delay)),
            config.greeting,
        )
    }

    pub fn with_responder(responder: Arc<dyn Responder>, greeting: bool) -> Self {
        let mut log = MessageLog::new();
        if greeting {
            log.push(Message::assistant(GREETING_MESSAGE, Category::General));
        }

        Self {
            log,
            ledger: SymptomLedger::new(),
            responder,
            pending: None,
            event_bus: EventBus::default(),
            telemetry: TelemetryCollector::new(),
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Append the user message and start computing the reply
    pub fn submit(&mut self, input: &str) -> Result<()> {
        let text = input.trim();
        if text.is_empty() {
            return Err(AssistantError::EmptyInput);
        }
        self.ensure_idle()?;

        self.log.push(Message::user(text));
        self.event_bus.emit(AssistantEvent::TurnStarted {
            text: text.to_string(),
        });
        tracing::debug!(messages = self.log.len(), "user turn appended");

        self.spawn(PendingKind::Turn, ReplyRequest::Text(text.to_string()));
        Ok(())
    }

    /// Start analysis of the current ledger snapshot
    ///
    /// Empty ledger: rejected with a notice, nothing is appended.
    pub fn begin_analysis(&mut self) -> Result<()> {
        if self.ledger.is_empty() {
            return Err(self.notice(AssistantError::EmptyLedger));
        }
        self.ensure_idle()?;

        let snapshot = self.ledger.records().to_vec();
        let symptoms = snapshot.len();
        self.event_bus
            .emit(AssistantEvent::AnalysisStarted { symptoms });
        tracing::debug!(symptoms, "ledger analysis requested");

        self.spawn(PendingKind::Analysis { symptoms }, ReplyRequest::Ledger(snapshot));
        Ok(())
    }

    /// Wait for the outstanding reply and append it
    ///
    /// Dropping this future leaves the reply pending; a later call still
    /// collects it.
    pub async fn await_reply(&mut self) -> Result<&Message> {
        let handle = &mut self
            .pending
            .as_mut()
            .ok_or(AssistantError::NoPendingReply)?
            .handle;
        let joined = handle.await;
        let pending = self.pending.take().ok_or(AssistantError::NoPendingReply)?;
        let reply = joined?;
        let duration_ms = pending.started.elapsed().as_millis() as u64;

        match (pending.kind, &reply.source) {
            (PendingKind::Analysis { symptoms }, ReplySource::Assessment { cluster, urgent }) => {
                self.telemetry.record(TelemetryEvent::AnalysisCompleted {
                    urgent: *urgent,
                    symptoms,
                    timestamp: Instant::now(),
                });
                self.event_bus.emit(AssistantEvent::AnalysisComplete {
                    cluster: *cluster,
                    urgent: *urgent,
                });
                tracing::info!(symptoms, urgent = *urgent, "ledger analysis complete");
            }
            (_, ReplySource::Rule(rule)) => {
                self.telemetry.record(TelemetryEvent::TurnCompleted {
                    rule: *rule,
                    category: reply.category,
                    duration_ms,
                    timestamp: Instant::now(),
                });
                tracing::info!(rule = *rule, category = %reply.category, duration_ms, "reply ready");
            }
            (kind, source) => {
                tracing::warn!(?kind, ?source, "reply source does not match request kind");
            }
        }

        self.event_bus.emit(AssistantEvent::ReplyReady {
            category: reply.category,
            duration_ms,
        });
        Ok(self.log.push(Message::assistant(reply.message, reply.category)))
    }

    /// One full turn: submit then wait
    pub async fn ask(&mut self, input: &str) -> Result<&Message> {
        self.submit(input)?;
        self.await_reply().await
    }

    /// Analyze the ledger and wait for the result
    pub async fn analyze(&mut self) -> Result<&Message> {
        self.begin_analysis()?;
        self.await_reply().await
    }

    /// True while a reply is outstanding; the front end disables input
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn add_symptom(&mut self, name: &str) -> Option<RecordId> {
        let id = self.ledger.add(name)?;
        self.ledger_changed();
        Some(id)
    }

    pub fn remove_symptom(&mut self, id: RecordId) -> Result<SymptomRecord> {
        let removed = self.ledger.remove(id)?;
        self.ledger_changed();
        Ok(removed)
    }

    pub fn remove_symptom_at(&mut self, index: usize) -> Result<SymptomRecord> {
        let removed = self.ledger.remove_at(index)?;
        self.ledger_changed();
        Ok(removed)
    }

    pub fn set_severity(&mut self, id: RecordId, severity: Severity) -> Result<()> {
        self.ledger.set_severity(id, severity)?;
        self.ledger_changed();
        Ok(())
    }

    pub fn set_severity_at(&mut self, index: usize, severity: Severity) -> Result<()> {
        self.ledger.set_severity_at(index, severity)?;
        self.ledger_changed();
        Ok(())
    }

    pub fn set_duration(&mut self, id: RecordId, duration: &str) -> Result<()> {
        self.ledger.set_duration(id, duration)?;
        self.ledger_changed();
        Ok(())
    }

    pub fn clear_symptoms(&mut self) {
        self.ledger.clear();
        self.ledger_changed();
    }

    pub fn messages(&self) -> &MessageLog {
        &self.log
    }

    pub fn ledger(&self) -> &SymptomLedger {
        &self.ledger
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.pending.is_some() {
            return Err(self.notice(AssistantError::ReplyPending));
        }
        Ok(())
    }

    fn spawn(&mut self, kind: PendingKind, request: ReplyRequest) {
        let responder = Arc::clone(&self.responder);
        let handle = tokio::spawn(async move { responder.respond(request).await });
        self.pending = Some(PendingReply {
            kind,
            started: Instant::now(),
            handle,
        });
    }

    fn ledger_changed(&self) {
        let len = self.ledger.len();
        self.event_bus.emit(AssistantEvent::LedgerChanged { len });
        self.telemetry.record(TelemetryEvent::LedgerMutated {
            len,
            timestamp: Instant::now(),
        });
    }

    /// Surface a rejection as a notice and hand the error back
    fn notice(&self, err: AssistantError) -> AssistantError {
        let message = err.to_string();
        tracing::warn!(%message, "request rejected");
        self.telemetry.record(TelemetryEvent::NoticeRaised {
            reason: message.clone(),
            timestamp: Instant::now(),
        });
        self.event_bus.emit(AssistantEvent::Notice {
            message,
            level: NoticeLevel::Warning,
        });
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Cluster;
    use crate::types::Origin;

    fn instant() -> ConversationOrchestrator {
        ConversationOrchestrator::with_responder(Arc::new(SimulatedResponder::instant()), false)
    }

    #[tokio::test]
    async fn test_turn_appends_user_then_assistant() {
        let mut assistant = instant();
        let reply = assistant.ask("I have a fever and sore throat").await.unwrap();
        assert_eq!(reply.category(), Category::General);

        let log = assistant.messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log.as_slice()[0].origin(), Origin::User);
        assert_eq!(log.as_slice()[0].text(), "I have a fever and sore throat");
        assert_eq!(log.as_slice()[1].origin(), Origin::Assistant);
    }

    #[tokio::test]
    async fn test_greeting_opens_log() {
        let assistant = ConversationOrchestrator::with_responder(
            Arc::new(SimulatedResponder::instant()),
            true,
        );
        assert_eq!(assistant.messages().len(), 1);
        assert_eq!(assistant.messages().as_slice()[0].text(), GREETING_MESSAGE);
    }

    #[tokio::test]
    async fn test_blank_input_rejected() {
        let mut assistant = instant();
        assert!(matches!(assistant.submit("   "), Err(AssistantError::EmptyInput)));
        assert!(assistant.messages().is_empty());
        assert!(!assistant.is_pending());
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_pending() {
        let mut assistant = ConversationOrchestrator::with_responder(
            Arc::new(SimulatedResponder::new(Duration::from_millis(50))),
            false,
        );
        assistant.submit("headache").unwrap();
        assert!(assistant.is_pending());

        let err = assistant.submit("cough").unwrap_err();
        assert!(matches!(err, AssistantError::ReplyPending));
        assert_eq!(assistant.messages().len(), 1);

        assistant.await_reply().await.unwrap();
        assert!(!assistant.is_pending());
        assert_eq!(assistant.messages().len(), 2);
        assert_eq!(assistant.telemetry().get_stats().notices, 1);
    }

    #[tokio::test]
    async fn test_abandoned_wait_keeps_reply_pending() {
        let mut assistant = ConversationOrchestrator::with_responder(
            Arc::new(SimulatedResponder::new(Duration::from_millis(50))),
            false,
        );
        assistant.submit("headache").unwrap();

        assert!(
            tokio::time::timeout(Duration::from_millis(5), assistant.await_reply())
                .await
                .is_err()
        );
        assert!(assistant.is_pending());
        assert_eq!(assistant.messages().len(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let reply = assistant.await_reply().await.unwrap();
        assert_eq!(reply.origin(), Origin::Assistant);
        assert!(!assistant.is_pending());
        assert_eq!(assistant.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_await_without_pending() {
        let mut assistant = instant();
        assert!(matches!(
            assistant.await_reply().await,
            Err(AssistantError::NoPendingReply)
        ));
    }

    #[tokio::test]
    async fn test_analyze_empty_ledger_appends_nothing() {
        let (bus, mut receiver) = EventBus::new();
        let mut assistant = instant().with_event_bus(bus);

        let err = assistant.analyze().await.unwrap_err();
        assert!(matches!(err, AssistantError::EmptyLedger));
        assert!(assistant.messages().is_empty());

        match receiver.try_recv().unwrap() {
            AssistantEvent::Notice { level, .. } => assert_eq!(level, NoticeLevel::Warning),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_analyze_appends_single_assistant_message() {
        let mut assistant = instant();
        assistant.add_symptom("runny nose");
        assistant.add_symptom("sneezing");

        let reply = assistant.analyze().await.unwrap();
        assert_eq!(reply.category(), Category::Info);
        assert_eq!(reply.text(), crate::ledger::analyzer::COLD_LIKE_MESSAGE);
        assert_eq!(assistant.messages().len(), 1);
        assert_eq!(assistant.telemetry().get_stats().analyses, 1);
    }

    #[tokio::test]
    async fn test_urgent_analysis_is_warning() {
        let mut assistant = instant();
        let a = assistant.add_symptom("toe ache").unwrap();
        let b = assistant.add_symptom("knee ache").unwrap();
        assistant.set_severity(a, Severity::Severe).unwrap();
        assistant.set_severity(b, Severity::Severe).unwrap();

        let reply = assistant.analyze().await.unwrap();
        assert_eq!(reply.category(), Category::Warning);
        assert_eq!(assistant.telemetry().get_stats().urgent_assessments, 1);
    }

    #[tokio::test]
    async fn test_analysis_uses_snapshot() {
        let (bus, mut receiver) = EventBus::new();
        let mut assistant = ConversationOrchestrator::with_responder(
            Arc::new(SimulatedResponder::new(Duration::from_millis(20))),
            false,
        )
        .with_event_bus(bus);
        assistant.add_symptom("runny nose");
        assistant.begin_analysis().unwrap();
        // mutation after the request does not change the pending result
        assistant.add_symptom("chest pain");
        let reply = assistant.await_reply().await.unwrap();
        assert_eq!(reply.category(), Category::Info);

        let mut saw_cold = false;
        while let Ok(event) = receiver.try_recv() {
            if let AssistantEvent::AnalysisComplete { cluster, .. } = event {
                saw_cold = cluster == Some(Cluster::ColdLike);
            }
        }
        assert!(saw_cold);
    }

    #[tokio::test]
    async fn test_ledger_forwarding() {
        let mut assistant = instant();
        assert!(assistant.add_symptom("").is_none());
        let id = assistant.add_symptom("cough").unwrap();
        assistant.set_duration(id, "2 days").unwrap();
        assistant.set_severity_at(0, Severity::Mild).unwrap();
        assert_eq!(assistant.ledger().records()[0].duration, "2 days");
        assert_eq!(assistant.ledger().records()[0].severity, Severity::Mild);

        assert!(assistant.remove_symptom_at(4).is_err());
        assistant.remove_symptom(id).unwrap();
        assert!(assistant.ledger().is_empty());
    }
}
