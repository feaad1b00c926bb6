//! Symptom ledger
//!
//! Holds the symptoms the user has declared in the current session. Entries
//! carry a stable [`RecordId`]; positional helpers resolve an index against
//! the current order at call time and never cache it.

pub mod analyzer;

use serde::{Deserialize, Serialize};

use crate::errors::{AssistantError, Result};
use crate::types::{RecordId, Severity, SymptomRecord};

pub use analyzer::{analyze, Assessment, Cluster};

/// In-memory symptom ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymptomLedger {
    records: Vec<SymptomRecord>,
}

impl SymptomLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a symptom with default severity and duration
    ///
    /// Blank names are ignored and return `None`.
    pub fn add(&mut self, name: &str) -> Option<RecordId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let record = SymptomRecord::new(name);
        let id = record.id;
        self.records.push(record);
        tracing::debug!(%id, name, "symptom added");
        Some(id)
    }

    /// Remove by stable id
    pub fn remove(&mut self, id: RecordId) -> Result<SymptomRecord> {
        let index = self.position(id)?;
        Ok(self.records.remove(index))
    }

    /// Remove by current position (0-based)
    pub fn remove_at(&mut self, index: usize) -> Result<SymptomRecord> {
        self.check_index(index)?;
        Ok(self.records.remove(index))
    }

    pub fn set_severity(&mut self, id: RecordId, severity: Severity) -> Result<()> {
        let index = self.position(id)?;
        self.records[index].severity = severity;
        Ok(())
    }

    pub fn set_severity_at(&mut self, index: usize, severity: Severity) -> Result<()> {
        self.check_index(index)?;
        self.records[index].severity = severity;
        Ok(())
    }

    /// Replace the free-text duration; blank text restores the placeholder
    pub fn set_duration(&mut self, id: RecordId, duration: &str) -> Result<()> {
        let index = self.position(id)?;
        let duration = duration.trim();
        self.records[index].duration = if duration.is_empty() {
            crate::types::DEFAULT_DURATION.to_string()
        } else {
            duration.to_string()
        };
        Ok(())
    }

    /// Resolve a position to the id currently stored there
    pub fn id_at(&self, index: usize) -> Result<RecordId> {
        self.check_index(index)?;
        Ok(self.records[index].id)
    }

    pub fn get(&self, id: RecordId) -> Option<&SymptomRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[SymptomRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of entries marked severe
    pub fn severe_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.severity == Severity::Severe)
            .count()
    }

    fn position(&self, id: RecordId) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AssistantError::UnknownRecord(id.to_string()))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.records.len() {
            return Err(AssistantError::InvalidIndex {
                index,
                len: self.records.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_blank_is_noop() {
        let mut ledger = SymptomLedger::new();
        assert!(ledger.add("").is_none());
        assert!(ledger.add("   ").is_none());
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_add_defaults_to_moderate() {
        let mut ledger = SymptomLedger::new();
        let id = ledger.add("fever").unwrap();
        assert_eq!(ledger.len(), 1);
        let record = ledger.get(id).unwrap();
        assert_eq!(record.severity, Severity::Moderate);
        assert_eq!(record.duration, crate::types::DEFAULT_DURATION);
    }

    #[test]
    fn test_add_trims_name() {
        let mut ledger = SymptomLedger::new();
        ledger.add("  cough ");
        assert_eq!(ledger.records()[0].name, "cough");
    }

    #[test]
    fn test_remove_by_id_survives_reindexing() {
        let mut ledger = SymptomLedger::new();
        let a = ledger.add("a").unwrap();
        let b = ledger.add("b").unwrap();
        let c = ledger.add("c").unwrap();

        ledger.remove(a).unwrap();
        // b moved to position 0, its id still resolves
        ledger.set_severity(c, Severity::Severe).unwrap();
        ledger.remove(b).unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.records()[0].id, c);
        assert_eq!(ledger.records()[0].severity, Severity::Severe);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut ledger = SymptomLedger::new();
        ledger.add("a");
        let err = ledger.remove(RecordId::new()).unwrap_err();
        assert!(matches!(err, AssistantError::UnknownRecord(_)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_positional_operations() {
        let mut ledger = SymptomLedger::new();
        ledger.add("a");
        ledger.add("b");

        ledger.set_severity_at(1, Severity::Mild).unwrap();
        assert_eq!(ledger.records()[1].severity, Severity::Mild);

        let removed = ledger.remove_at(0).unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(ledger.records()[0].name, "b");
    }

    #[test]
    fn test_invalid_index_is_rejected() {
        let mut ledger = SymptomLedger::new();
        ledger.add("a");
        assert!(matches!(
            ledger.remove_at(3),
            Err(AssistantError::InvalidIndex { index: 3, len: 1 })
        ));
        assert!(ledger.set_severity_at(1, Severity::Severe).is_err());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_set_duration() {
        let mut ledger = SymptomLedger::new();
        let id = ledger.add("cough").unwrap();
        ledger.set_duration(id, "3 days").unwrap();
        assert_eq!(ledger.get(id).unwrap().duration, "3 days");
        ledger.set_duration(id, " ").unwrap();
        assert_eq!(ledger.get(id).unwrap().duration, crate::types::DEFAULT_DURATION);
    }

    #[test]
    fn test_severe_count_and_clear() {
        let mut ledger = SymptomLedger::new();
        let a = ledger.add("a").unwrap();
        ledger.add("b");
        ledger.set_severity(a, Severity::Severe).unwrap();
        assert_eq!(ledger.severe_count(), 1);

        ledger.clear();
        assert!(ledger.is_empty());
    }
}
