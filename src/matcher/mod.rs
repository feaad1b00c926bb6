//! Free-text symptom matcher
//!
//! Maps one chat message to exactly one canned guidance response. Matching
//! is case-insensitive substring containment against the rule table in
//! [`rules`]; the first rule that fires wins and the fallback guarantees a
//! response for every input.

pub mod rules;

use serde::Serialize;

use crate::types::Category;
pub use rules::{GuidanceRule, Trigger, DISCLAIMER, FALLBACK_MESSAGE, GREETING_MESSAGE};

/// Matcher output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guidance {
    /// Name of the rule that fired
    pub rule: &'static str,
    pub message: String,
    pub category: Category,
}

impl From<&GuidanceRule> for Guidance {
    fn from(rule: &GuidanceRule) -> Self {
        Guidance {
            rule: rule.name,
            message: rule.message.to_string(),
            category: rule.category,
        }
    }
}

/// Lower-case the input and fold typographic apostrophes so "can’t" matches "can't"
pub fn normalize(input: &str) -> String {
    input.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// Evaluate the rule table against `input`
///
/// Total: blank input is the caller's concern and simply falls through to
/// the fallback here.
pub fn evaluate(input: &str) -> Guidance {
    let normalized = normalize(input);
    let rule = rules::rules()
        .find(|rule| rule.trigger.matches(&normalized))
        .unwrap_or(&rules::FALLBACK_RULE);
    tracing::debug!(rule = rule.name, category = %rule.category, "matched guidance rule");
    Guidance::from(rule)
}
