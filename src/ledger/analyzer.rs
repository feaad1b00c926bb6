//! Aggregate symptom analysis
//!
//! Classifies a whole ledger snapshot against fixed illness clusters. Each
//! cluster is tested independently; the first matching cluster in priority
//! order decides the message. Two or more severe entries escalate to urgent
//! care even when no cluster matches.

use serde::Serialize;
use std::fmt;

use crate::matcher::rules::EMERGENCY_KEYWORDS;
use crate::types::{Category, Severity, SymptomRecord};

/// Severe entries needed to escalate without an emergency keyword
pub const URGENT_SEVERE_THRESHOLD: usize = 2;

/// Named symptom clusters, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cluster {
    Emergency,
    CovidLike,
    InfluenzaLike,
    ColdLike,
    AllergyLike,
}

impl Cluster {
    pub const PRIORITY: [Cluster; 5] = [
        Cluster::Emergency,
        Cluster::CovidLike,
        Cluster::InfluenzaLike,
        Cluster::ColdLike,
        Cluster::AllergyLike,
    ];

    /// Symptom-name substrings that place a ledger in this cluster
    ///
    /// The emergency cluster also matches every chat emergency keyword, see
    /// [`Cluster::matches`].
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Cluster::Emergency => &[
                "difficulty breathing",
                "shortness of breath",
                "confusion",
                "bluish lips",
            ],
            Cluster::CovidLike => &["loss of taste", "loss of smell", "taste", "smell", "dry cough"],
            Cluster::InfluenzaLike => &[
                "fever",
                "chills",
                "body ache",
                "muscle ache",
                "muscle pain",
                "fatigue",
                "temperature",
            ],
            Cluster::ColdLike => &[
                "runny nose",
                "stuffy nose",
                "congestion",
                "sore throat",
                "sneez",
                "cough",
            ],
            Cluster::AllergyLike => &["itchy", "watery eyes", "sneez", "runny nose", "hives", "rash"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Cluster::Emergency => "emergency",
            Cluster::CovidLike => "COVID-like",
            Cluster::InfluenzaLike => "influenza-like",
            Cluster::ColdLike => "common-cold-like",
            Cluster::AllergyLike => "allergy-like",
        }
    }

    /// True if any record name contains any of this cluster's keywords
    pub fn matches(&self, records: &[SymptomRecord]) -> bool {
        let shared: &[&str] = match self {
            Cluster::Emergency => EMERGENCY_KEYWORDS,
            _ => &[],
        };
        records.iter().any(|record| {
            self.keywords()
                .iter()
                .chain(shared)
                .any(|kw| record.mentions(kw))
        })
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const URGENT_MESSAGE: &str = "Based on the symptoms you've recorded, you may need urgent medical care. \
Please contact your healthcare provider right away or call your local emergency number. If you have chest pain, \
difficulty breathing, confusion, or bluish lips, call emergency services immediately.";

pub const COVID_LIKE_MESSAGE: &str = "Your symptoms are consistent with a possible COVID-19 infection. \
Please take a COVID-19 test, self-isolate until you have a result, and monitor your symptoms closely. \
Contact a healthcare provider if your symptoms get worse.";

pub const INFLUENZA_LIKE_MESSAGE: &str = "Your symptoms resemble influenza (flu). Rest, stay well hydrated, \
and consider over-the-counter fever reducers. If you are in a high-risk group or symptoms are severe, \
contact a healthcare provider; antiviral treatment works best when started early. \
A COVID-19 test can help rule out COVID-19.";

pub const COLD_LIKE_MESSAGE: &str = "Your symptoms look like a common cold. Rest, drink plenty of fluids, \
and use over-the-counter remedies for relief. Most colds clear up within 7 to 10 days. \
See a healthcare provider if symptoms last longer than that or you develop a high fever.";

pub const ALLERGY_LIKE_MESSAGE: &str = "Your symptoms may be caused by allergies. Try to identify and avoid \
triggers such as pollen, dust, or pet dander. Over-the-counter antihistamines may help. \
If symptoms persist or interfere with daily life, consult a healthcare provider.";

/// Analyzer output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    /// Cluster that decided the message, if any
    pub cluster: Option<Cluster>,
    /// Urgent-care escalation (emergency cluster or severe threshold)
    pub urgent: bool,
    pub message: String,
    pub category: Category,
}

/// Analyze a ledger snapshot
///
/// The caller must not pass an empty slice; the orchestrator surfaces an
/// `EmptyLedger` notice instead. An empty slice still yields the generic
/// message.
pub fn analyze(records: &[SymptomRecord]) -> Assessment {
    let severe = records
        .iter()
        .filter(|r| r.severity == Severity::Severe)
        .count();
    let emergency = Cluster::Emergency.matches(records);

    if emergency || severe >= URGENT_SEVERE_THRESHOLD {
        tracing::info!(emergency, severe, "ledger escalated to urgent care");
        return Assessment {
            cluster: emergency.then_some(Cluster::Emergency),
            urgent: true,
            message: URGENT_MESSAGE.to_string(),
            category: Category::Warning,
        };
    }

    let cluster = Cluster::PRIORITY[1..]
        .iter()
        .copied()
        .find(|cluster| cluster.matches(records));

    let message = match cluster {
        Some(Cluster::CovidLike) => COVID_LIKE_MESSAGE.to_string(),
        Some(Cluster::InfluenzaLike) => INFLUENZA_LIKE_MESSAGE.to_string(),
        Some(Cluster::ColdLike) => COLD_LIKE_MESSAGE.to_string(),
        Some(Cluster::AllergyLike) => ALLERGY_LIKE_MESSAGE.to_string(),
        Some(Cluster::Emergency) | None => monitor_message(records),
    };

    Assessment {
        cluster,
        urgent: false,
        message,
        category: Category::Info,
    }
}

fn monitor_message(records: &[SymptomRecord]) -> String {
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    format!(
        "Based on your symptoms ({}), we recommend monitoring your condition and getting plenty of rest. \
If symptoms worsen or persist for more than a few days, please consult a healthcare provider.",
        names.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(names: &[&str]) -> Vec<SymptomRecord> {
        names.iter().map(|n| SymptomRecord::new(*n)).collect()
    }

    #[test]
    fn test_two_severe_entries_escalate() {
        let ledger = vec![
            SymptomRecord::new("toe ache").with_severity(Severity::Severe),
            SymptomRecord::new("elbow ache").with_severity(Severity::Severe),
        ];
        let assessment = analyze(&ledger);
        assert!(assessment.urgent);
        assert_eq!(assessment.cluster, None);
        assert_eq!(assessment.message, URGENT_MESSAGE);
        assert_eq!(assessment.category, Category::Warning);
    }

    #[test]
    fn test_one_severe_entry_does_not_escalate() {
        let ledger = vec![SymptomRecord::new("toe ache").with_severity(Severity::Severe)];
        assert!(!analyze(&ledger).urgent);
    }

    #[test]
    fn test_emergency_cluster_escalates() {
        let assessment = analyze(&records(&["Chest Pain", "runny nose"]));
        assert!(assessment.urgent);
        assert_eq!(assessment.cluster, Some(Cluster::Emergency));
    }

    #[test]
    fn test_chat_emergency_keywords_escalate_in_ledger() {
        for keyword in EMERGENCY_KEYWORDS {
            let assessment = analyze(&records(&[*keyword]));
            assert!(assessment.urgent, "{} did not escalate", keyword);
            assert_eq!(assessment.cluster, Some(Cluster::Emergency));
        }
    }

    #[test]
    fn test_curly_apostrophe_still_escalates() {
        let assessment = analyze(&records(&["Can\u{2019}t breathe"]));
        assert!(assessment.urgent);
        assert_eq!(assessment.message, URGENT_MESSAGE);
    }

    #[test]
    fn test_cold_wins_over_allergy() {
        let ledger = records(&["runny nose", "sneezing"]);
        assert!(Cluster::AllergyLike.matches(&ledger));
        let assessment = analyze(&ledger);
        assert_eq!(assessment.cluster, Some(Cluster::ColdLike));
        assert_eq!(assessment.message, COLD_LIKE_MESSAGE);
        assert_eq!(assessment.category, Category::Info);
    }

    #[test]
    fn test_covid_before_influenza() {
        let assessment = analyze(&records(&["fever", "loss of smell"]));
        assert_eq!(assessment.cluster, Some(Cluster::CovidLike));
    }

    #[test]
    fn test_influenza() {
        let assessment = analyze(&records(&["Fever", "body aches", "cough"]));
        assert_eq!(assessment.cluster, Some(Cluster::InfluenzaLike));
        assert_eq!(assessment.message, INFLUENZA_LIKE_MESSAGE);
    }

    #[test]
    fn test_allergy_only() {
        let assessment = analyze(&records(&["itchy eyes"]));
        assert_eq!(assessment.cluster, Some(Cluster::AllergyLike));
    }

    #[test]
    fn test_generic_message_lists_names() {
        let assessment = analyze(&records(&["toe ache", "back pain"]));
        assert_eq!(assessment.cluster, None);
        assert!(!assessment.urgent);
        assert!(assessment.message.contains("toe ache, back pain"));
    }
}
