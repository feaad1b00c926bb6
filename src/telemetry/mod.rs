//! Telemetry for the assistant session
//!
//! In-process counters only; nothing leaves the machine. `/status` and the
//! exit summary read from here.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use colored::*;

use crate::cli::Verbosity;
use crate::types::Category;

/// Raw events kept for the summary; counters cover the whole session
pub const EVENT_HISTORY_LIMIT: usize = 256;

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    TurnCompleted {
        rule: &'static str,
        category: Category,
        duration_ms: u64,
        timestamp: Instant,
    },
    AnalysisCompleted {
        urgent: bool,
        symptoms: usize,
        timestamp: Instant,
    },
    LedgerMutated {
        len: usize,
        timestamp: Instant,
    },
    NoticeRaised {
        reason: String,
        timestamp: Instant,
    },
}

/// Telemetry statistics
#[derive(Debug, Clone, Default)]
pub struct TelemetryStats {
    pub turns: usize,
    pub analyses: usize,
    pub urgent_assessments: usize,
    pub ledger_mutations: usize,
    pub notices: usize,
    pub total_reply_ms: u64,
    pub by_category: HashMap<Category, usize>,
    pub by_rule: HashMap<&'static str, usize>,
}

impl TelemetryStats {
    /// Mean latency of chat replies in milliseconds
    pub fn average_reply_ms(&self) -> u64 {
        if self.turns == 0 {
            0
        } else {
            self.total_reply_ms / self.turns as u64
        }
    }
}

/// Telemetry collector, cheap to clone
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<VecDeque<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

// Counters stay valid after a poisoning panic.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(EVENT_HISTORY_LIMIT))),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = lock(&self.stats);
            match &event {
                TelemetryEvent::TurnCompleted {
                    rule,
                    category,
                    duration_ms,
                    ..
                } => {
                    stats.turns += 1;
                    stats.total_reply_ms += duration_ms;
                    *stats.by_category.entry(*category).or_insert(0) += 1;
                    *stats.by_rule.entry(*rule).or_insert(0) += 1;
                }
                TelemetryEvent::AnalysisCompleted { urgent, .. } => {
                    stats.analyses += 1;
                    if *urgent {
                        stats.urgent_assessments += 1;
                    }
                }
                TelemetryEvent::LedgerMutated { .. } => {
                    stats.ledger_mutations += 1;
                }
                TelemetryEvent::NoticeRaised { .. } => {
                    stats.notices += 1;
                }
            }
        }

        let mut events = lock(&self.events);
        if events.len() == EVENT_HISTORY_LIMIT {
            events.pop_front();
        }
        events.push_back(event);
    }

    pub fn get_stats(&self) -> TelemetryStats {
        lock(&self.stats).clone()
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Last `n` events, oldest first
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = lock(&self.events);
        let start = events.len().saturating_sub(n);
        events.iter().skip(start).cloned().collect()
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Session summary printer
pub struct TelemetryDisplay {
    collector: TelemetryCollector,
    verbosity: Verbosity,
}

impl TelemetryDisplay {
    pub fn new(collector: TelemetryCollector, verbosity: Verbosity) -> Self {
        Self {
            collector,
            verbosity,
        }
    }

    /// Display summary statistics
    pub fn display_summary(&self) {
        if !self.verbosity.show_progress() {
            return;
        }
        let stats = self.collector.get_stats();
        let elapsed = self.collector.elapsed();

        println!("\n{}", "Session Summary".bold().cyan());
        println!("{}", "-".repeat(40).cyan());
        println!("Duration:          {}s", elapsed.as_secs());
        println!("Messages answered: {}", stats.turns);
        println!("Analyses:          {}", stats.analyses);
        println!("Urgent results:    {}", stats.urgent_assessments);
        println!("Avg reply time:    {}ms", stats.average_reply_ms());

        if self.should_show_details() && !stats.by_rule.is_empty() {
            let mut rules: Vec<_> = stats.by_rule.iter().collect();
            rules.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            println!("Rules fired:");
            for (rule, count) in rules {
                println!("  {:<16} {}", rule, count);
            }
        }

        if self.should_show_details() {
            let notices: Vec<String> = self
                .collector
                .recent_events(EVENT_HISTORY_LIMIT)
                .into_iter()
                .filter_map(|event| match event {
                    TelemetryEvent::NoticeRaised { reason, .. } => Some(reason),
                    _ => None,
                })
                .collect();
            if !notices.is_empty() {
                println!("Recent notices:");
                for reason in notices.iter().rev().take(5) {
                    println!("  {}", reason.yellow());
                }
            }
        }
        println!();
    }

    pub fn should_show_details(&self) -> bool {
        self.verbosity.show_events()
    }
}
