//! Signed-in user profile

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{AssistantError, Result};

/// Profile fields editable from the REPL
pub const EDITABLE_FIELDS: &[&str] = &[
    "name",
    "email",
    "avatar",
    "phone",
    "address",
    "dob",
    "health",
    "vaccination",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthStatus {
    #[default]
    Normal,
    AtRisk,
    Infected,
    Recovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VaccinationStatus {
    #[default]
    None,
    Partial,
    FullyVaccinated,
    Boosted,
}

impl FromStr for HealthStatus {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(HealthStatus::Normal),
            "at-risk" => Ok(HealthStatus::AtRisk),
            "infected" => Ok(HealthStatus::Infected),
            "recovered" => Ok(HealthStatus::Recovered),
            other => Err(AssistantError::InvalidProfileField(format!(
                "health '{}' (expected normal, at-risk, infected or recovered)",
                other
            ))),
        }
    }
}

impl FromStr for VaccinationStatus {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(VaccinationStatus::None),
            "partial" => Ok(VaccinationStatus::Partial),
            "fully-vaccinated" => Ok(VaccinationStatus::FullyVaccinated),
            "boosted" => Ok(VaccinationStatus::Boosted),
            other => Err(AssistantError::InvalidProfileField(format!(
                "vaccination '{}' (expected none, partial, fully-vaccinated or boosted)",
                other
            ))),
        }
    }
}

/// Persisted user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default)]
    pub health_status: HealthStatus,
    #[serde(default)]
    pub vaccination_status: VaccinationStatus,
}

/// Partial profile update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub dob: Option<String>,
    pub health_status: Option<HealthStatus>,
    pub vaccination_status: Option<VaccinationStatus>,
}

impl ProfileUpdate {
    /// Update touching a single field, as typed at the REPL
    pub fn for_field(field: &str, value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AssistantError::InvalidProfileField(format!("{} needs a value", field)));
        }
        let text = Some(value.to_string());
        let update = match field.to_lowercase().as_str() {
            "name" => ProfileUpdate { name: text, ..Default::default() },
            "email" => ProfileUpdate { email: text, ..Default::default() },
            "avatar" => ProfileUpdate { avatar: text, ..Default::default() },
            "phone" => ProfileUpdate { phone: text, ..Default::default() },
            "address" => ProfileUpdate { address: text, ..Default::default() },
            "dob" => ProfileUpdate { dob: text, ..Default::default() },
            "health" => ProfileUpdate {
                health_status: Some(value.parse()?),
                ..Default::default()
            },
            "vaccination" => ProfileUpdate {
                vaccination_status: Some(value.parse()?),
                ..Default::default()
            },
            other => {
                return Err(AssistantError::InvalidProfileField(format!(
                    "unknown field '{}' (one of {})",
                    other,
                    EDITABLE_FIELDS.join(", ")
                )))
            }
        };
        Ok(update)
    }
}

impl UserProfile {
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if update.avatar.is_some() {
            self.avatar = update.avatar;
        }
        if update.phone.is_some() {
            self.phone = update.phone;
        }
        if update.address.is_some() {
            self.address = update.address;
        }
        if update.dob.is_some() {
            self.dob = update.dob;
        }
        if let Some(status) = update.health_status {
            self.health_status = status;
        }
        if let Some(status) = update.vaccination_status {
            self.vaccination_status = status;
        }
    }
}
