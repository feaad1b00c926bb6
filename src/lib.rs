//! PandemicNet - rule-based health assistant for the terminal
//!
//! A chat assistant that answers free-text symptom descriptions from a fixed
//! keyword rule table, plus a symptom tracker whose entries can be analyzed
//! together for likely condition clusters.
//!
//! # Architecture
//!
//! - **matcher**: free-text guidance rules
//! - **ledger**: symptom records and aggregate analysis
//! - **assistant**: conversation orchestration over a pluggable responder
//! - **session**: mock sign-in persisted to a local key-value store
//! - **repl** / **cli**: terminal front end

pub mod errors;
pub mod types;

pub mod ledger;
pub mod matcher;

pub mod assistant;
pub mod session;

// Terminal front end
pub mod cli;
pub mod repl;
pub mod telemetry;

// Re-export commonly used types
pub use errors::{AssistantError, Result};
