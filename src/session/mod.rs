//! Mock authentication session
//!
//! Holds the signed-in user, if any, and mirrors it into a key-value store
//! under a single key so a later run can restore it. Credentials are only
//! shape-checked; there is no backend.

pub mod persistence;
pub mod profile;

use std::sync::Arc;

use rand::Rng;

use crate::errors::{AssistantError, Result};

pub use persistence::{FileStore, KeyValueStore, MemoryStore};
pub use profile::{HealthStatus, ProfileUpdate, UserProfile, VaccinationStatus, EDITABLE_FIELDS};

/// Store key holding the serialized user
pub const USER_KEY: &str = "pandemicnet_user";

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Current authentication state
pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    user: Option<UserProfile>,
}

impl SessionContext {
    /// Restore a session from `store`
    ///
    /// A stored user that fails to parse is dropped from the store and the
    /// session starts signed out.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let user = match store.get(USER_KEY)? {
            Some(json) => match serde_json::from_str::<UserProfile>(&json) {
                Ok(user) => {
                    tracing::debug!(user_id = %user.id, "restored session");
                    Some(user)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "discarding unreadable stored user");
                    store.remove(USER_KEY)?;
                    None
                }
            },
            None => None,
        };

        Ok(Self { store, user })
    }

    /// Signed-out session backed by an in-memory store
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            user: None,
        }
    }

    /// Sign in with any email containing `@` and a long enough password
    pub fn login(&mut self, email: &str, password: &str) -> Result<&UserProfile> {
        let email = email.trim();
        if !valid_email(email) || password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AssistantError::InvalidCredentials);
        }

        let name = email.split('@').next().unwrap_or_default().to_string();
        let user = UserProfile {
            id: generate_user_id(),
            name,
            email: email.to_string(),
            avatar: None,
            phone: None,
            address: None,
            dob: None,
            health_status: HealthStatus::Normal,
            vaccination_status: VaccinationStatus::Boosted,
        };
        tracing::info!(user_id = %user.id, "logged in");
        self.set_user(user)
    }

    /// Create an account; same checks as [`login`](Self::login) plus a name
    pub fn signup(&mut self, name: &str, email: &str, password: &str) -> Result<&UserProfile> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || !valid_email(email) || password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AssistantError::InvalidSignup);
        }

        let user = UserProfile {
            id: generate_user_id(),
            name: name.to_string(),
            email: email.to_string(),
            avatar: None,
            phone: None,
            address: None,
            dob: None,
            health_status: HealthStatus::Normal,
            vaccination_status: VaccinationStatus::None,
        };
        tracing::info!(user_id = %user.id, "signed up");
        self.set_user(user)
    }

    pub fn logout(&mut self) -> Result<()> {
        if let Some(user) = self.user.take() {
            tracing::info!(user_id = %user.id, "logged out");
        }
        self.store.remove(USER_KEY)
    }

    /// Merge `update` into the signed-in user and persist it
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<&UserProfile> {
        let mut user = self.user.clone().ok_or(AssistantError::NotAuthenticated)?;
        user.apply(update);
        self.set_user(user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Name shown in the banner and prompt
    pub fn display_name(&self) -> &str {
        self.user.as_ref().map(|u| u.name.as_str()).unwrap_or("guest")
    }

    fn set_user(&mut self, user: UserProfile) -> Result<&UserProfile> {
        let json = serde_json::to_string(&user)?;
        self.store.set(USER_KEY, &json)?;
        Ok(self.user.insert(user))
    }
}

fn valid_email(email: &str) -> bool {
    email.contains('@')
}

fn generate_user_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("user_{}", suffix)
}
