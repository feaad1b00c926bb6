//! Responder seam
//!
//! Produces the assistant side of a turn. `SimulatedResponder` waits a fixed
//! delay before answering, standing in for network latency; tests use a zero
//! delay or their own implementation.

use async_trait::async_trait;
use std::time::Duration;

use crate::ledger::{self, Cluster};
use crate::matcher;
use crate::types::{Category, SymptomRecord};

/// Work handed to a responder
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyRequest {
    /// Free-text chat input
    Text(String),

    /// Snapshot of the ledger at the time analysis was requested
    Ledger(Vec<SymptomRecord>),
}

/// Where a reply came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    Rule(&'static str),
    Assessment { cluster: Option<Cluster>, urgent: bool },
}

/// Responder output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub message: String,
    pub category: Category,
    pub source: ReplySource,
}

/// Pure reply computation shared by every responder
pub fn compute(request: &ReplyRequest) -> Reply {
    match request {
        ReplyRequest::Text(text) => {
            let guidance = matcher::evaluate(text);
            Reply {
                message: guidance.message,
                category: guidance.category,
                source: ReplySource::Rule(guidance.rule),
            }
        }
        ReplyRequest::Ledger(records) => {
            let assessment = ledger::analyze(records);
            Reply {
                message: assessment.message,
                category: assessment.category,
                source: ReplySource::Assessment {
                    cluster: assessment.cluster,
                    urgent: assessment.urgent,
                },
            }
        }
    }
}

#[async_trait]
pub trait Responder: Send + Sync {
    /// Always resolves; there is no failure path
    async fn respond(&self, request: ReplyRequest) -> Reply;
}

/// Rule-based responder with artificial latency
#[derive(Debug, Clone)]
pub struct SimulatedResponder {
    delay: Duration,
}

impl SimulatedResponder {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// No latency, for tests and one-shot use
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedResponder {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

#[async_trait]
impl Responder for SimulatedResponder {
    async fn respond(&self, request: ReplyRequest) -> Reply {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        compute(&request)
    }
}
