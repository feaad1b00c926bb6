//! Assistant integration tests
//!
//! Drives the orchestrator end to end through the public API: chat turns,
//! ledger analysis, lifecycle events and a custom responder.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pandemicnet::assistant::{
    AssistantConfig, AssistantEvent, ConversationOrchestrator, EventBus, Reply, ReplyRequest,
    ReplySource, Responder, SimulatedResponder,
};
use pandemicnet::ledger::analyzer::URGENT_MESSAGE;
use pandemicnet::ledger::Cluster;
use pandemicnet::matcher::rules::{COVID_PATTERN_MESSAGE, EMERGENCY_MESSAGE};
use pandemicnet::matcher::FALLBACK_MESSAGE;
use pandemicnet::types::{Category, Origin, Severity};
use pandemicnet::AssistantError;

fn assistant() -> ConversationOrchestrator {
    ConversationOrchestrator::with_responder(Arc::new(SimulatedResponder::instant()), false)
}

// Chat turns

#[tokio::test]
async fn test_fever_and_sore_throat_turn() {
    let mut assistant = assistant();
    let before = assistant.messages().len();

    assistant.ask("I have a fever and sore throat").await.unwrap();

    let log = assistant.messages().as_slice();
    assert_eq!(log.len(), before + 2);
    assert_eq!(log[before].origin(), Origin::User);
    assert_eq!(log[before + 1].origin(), Origin::Assistant);
    assert_eq!(log[before + 1].category(), Category::General);
    assert!(log[before + 1].text().to_lowercase().contains("fever"));
}

#[tokio::test]
async fn test_emergency_beats_everything_else() {
    let mut assistant = assistant();
    let reply = assistant
        .ask("fever, cough, headache and now chest pain")
        .await
        .unwrap();
    assert_eq!(reply.text(), EMERGENCY_MESSAGE);
    assert_eq!(reply.category(), Category::Warning);
}

#[tokio::test]
async fn test_fever_with_cough_is_covid_pattern() {
    let mut assistant = assistant();
    let reply = assistant.ask("I've got a Fever and a dry COUGH").await.unwrap();
    assert_eq!(reply.text(), COVID_PATTERN_MESSAGE);
}

#[tokio::test]
async fn test_unmatched_text_gets_fallback() {
    let mut assistant = assistant();
    let reply = assistant.ask("my elbow feels strange").await.unwrap();
    assert_eq!(reply.text(), FALLBACK_MESSAGE);
    assert_eq!(reply.category(), Category::General);
}

#[tokio::test]
async fn test_input_is_rejected_while_reply_pending() {
    let mut assistant = ConversationOrchestrator::new(&AssistantConfig {
        response_delay: Duration::from_millis(50),
        greeting: false,
    });

    assistant.submit("headache").unwrap();
    assert!(assistant.is_pending());
    assert!(matches!(
        assistant.submit("dizzy"),
        Err(AssistantError::ReplyPending)
    ));

    // The ledger stays editable while the assistant is typing.
    assistant.add_symptom("headache");
    assert!(matches!(
        assistant.begin_analysis(),
        Err(AssistantError::ReplyPending)
    ));

    assistant.await_reply().await.unwrap();
    assert!(!assistant.is_pending());
    assert_eq!(assistant.messages().len(), 2);
    assert!(matches!(
        assistant.await_reply().await,
        Err(AssistantError::NoPendingReply)
    ));
}

// Ledger analysis

#[tokio::test]
async fn test_cold_beats_allergy() {
    let mut assistant = assistant();
    assistant.add_symptom("runny nose");
    assistant.add_symptom("sneezing");

    let reply = assistant.analyze().await.unwrap();
    assert_eq!(reply.category(), Category::Info);
    assert!(reply.text().contains("common cold"));
}

#[tokio::test]
async fn test_two_severe_entries_escalate() {
    let mut assistant = assistant();
    let first = assistant.add_symptom("back pain").unwrap();
    let second = assistant.add_symptom("stiff neck").unwrap();
    assistant.set_severity(first, Severity::Severe).unwrap();
    assistant.set_severity(second, Severity::Severe).unwrap();

    let reply = assistant.analyze().await.unwrap();
    assert_eq!(reply.text(), URGENT_MESSAGE);
    assert_eq!(reply.category(), Category::Warning);
}

#[tokio::test]
async fn test_empty_ledger_analysis_appends_nothing() {
    let mut assistant = assistant();
    assert!(matches!(
        assistant.analyze().await,
        Err(AssistantError::EmptyLedger)
    ));
    assert!(assistant.messages().is_empty());
    assert_eq!(assistant.telemetry().get_stats().notices, 1);
}

#[tokio::test]
async fn test_blank_symptom_is_ignored() {
    let mut assistant = assistant();
    assert!(assistant.add_symptom("   ").is_none());
    assert!(assistant.ledger().is_empty());

    assistant.add_symptom("fever");
    let record = &assistant.ledger().records()[0];
    assert_eq!(record.severity, Severity::Moderate);
}

#[tokio::test]
async fn test_analysis_uses_snapshot_at_request_time() {
    let mut assistant = assistant();
    assistant.add_symptom("itchy eyes");
    assistant.begin_analysis().unwrap();

    // Mutations after the request do not change the pending result.
    assistant.add_symptom("chest pain");

    let reply = assistant.await_reply().await.unwrap();
    assert_eq!(reply.category(), Category::Info);
    assert_eq!(assistant.ledger().len(), 2);
}

// Events and telemetry

#[tokio::test]
async fn test_lifecycle_events() {
    let (bus, mut events) = EventBus::new();
    let mut assistant = assistant().with_event_bus(bus);

    assistant.add_symptom("loss of smell");
    assistant.analyze().await.unwrap();
    assistant.ask("thanks").await.unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }

    assert_eq!(seen[0], AssistantEvent::LedgerChanged { len: 1 });
    assert_eq!(seen[1], AssistantEvent::AnalysisStarted { symptoms: 1 });
    assert_eq!(
        seen[2],
        AssistantEvent::AnalysisComplete {
            cluster: Some(Cluster::CovidLike),
            urgent: false
        }
    );
    assert!(matches!(seen[3], AssistantEvent::ReplyReady { category: Category::Info, .. }));
    assert_eq!(
        seen[4],
        AssistantEvent::TurnStarted {
            text: "thanks".to_string()
        }
    );
    assert!(matches!(seen[5], AssistantEvent::ReplyReady { .. }));
}

#[tokio::test]
async fn test_telemetry_counts_turns_and_analyses() {
    let mut assistant = assistant();
    assistant.ask("I feel dizzy").await.unwrap();
    assistant.ask("and I have a rash").await.unwrap();
    assistant.add_symptom("chest pain");
    assistant.analyze().await.unwrap();

    let stats = assistant.telemetry().get_stats();
    assert_eq!(stats.turns, 2);
    assert_eq!(stats.analyses, 1);
    assert_eq!(stats.urgent_assessments, 1);
    assert_eq!(stats.ledger_mutations, 1);
}

// Responder seam

struct EchoResponder;

#[async_trait]
impl Responder for EchoResponder {
    async fn respond(&self, request: ReplyRequest) -> Reply {
        let message = match request {
            ReplyRequest::Text(text) => format!("echo: {}", text),
            ReplyRequest::Ledger(records) => format!("{} records", records.len()),
        };
        Reply {
            message,
            category: Category::Success,
            source: ReplySource::Rule("echo"),
        }
    }
}

#[tokio::test]
async fn test_custom_responder() {
    let mut assistant = ConversationOrchestrator::with_responder(Arc::new(EchoResponder), true);
    assert_eq!(assistant.messages().len(), 1);

    let reply = assistant.ask("hello").await.unwrap();
    assert_eq!(reply.text(), "echo: hello");
    assert_eq!(reply.category(), Category::Success);
    assert_eq!(assistant.telemetry().get_stats().by_rule["echo"], 1);
}
