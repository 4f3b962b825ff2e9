//! Account directory — the seam a real transport plugs into.
//!
//! The shipped build has no networking; [`LocalDirectory`] simulates the
//! server side in-process with an account table keyed by lowercased email,
//! Argon2id-verified passwords, and an optional fixed latency standing in
//! for the network round-trip.  A transport implementation replaces this
//! with real calls carrying the `ml_proto::api` types.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use ml_crypto::password;
use ml_proto::{EmergencyContact, Identity, RegistrationProfile};

use crate::error::SessionError;

#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolve an (email, password) pair to an identity with a fresh
    /// `last_login_at`.  Any mismatch is the one generic credentials error.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, SessionError>;

    /// Create an account with a fresh unique id.
    async fn create_account(&self, profile: &RegistrationProfile)
        -> Result<Identity, SessionError>;

    /// Queue a password-reset notification.  Non-enumerating: unknown emails
    /// succeed.  Transport failures surface as `ResetRequestFailed`.
    async fn request_password_reset(&self, email: &str) -> Result<(), SessionError>;
}

struct AccountRecord {
    identity: Identity,
    password_phc: String,
}

pub struct LocalDirectory {
    accounts: RwLock<HashMap<String, AccountRecord>>,
    latency: Option<Duration>,
}

impl LocalDirectory {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            latency: None,
        }
    }

    /// Directory seeded with the demo client account used by the preview
    /// builds (`demo@therapy.com` / `password123`).
    pub fn with_demo_account() -> Self {
        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            email: "demo@therapy.com".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 15)
                .expect("static demo date is valid"),
            phone: "+1234567890".to_string(),
            emergency_contact: Some(EmergencyContact {
                name: "Jane Doe".to_string(),
                phone: "+1234567891".to_string(),
                relationship: "Spouse".to_string(),
            }),
            created_at: Utc::now(),
            last_login_at: None,
        };
        let password_phc = password::hash_password("password123")
            .expect("demo password hashing cannot fail");

        let mut accounts = HashMap::new();
        accounts.insert(
            identity.email.to_lowercase(),
            AccountRecord {
                identity,
                password_phc,
            },
        );
        Self {
            accounts: RwLock::new(accounts),
            latency: None,
        }
    }

    /// Add a fixed artificial delay before every operation, standing in for
    /// the server round-trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn simulate_roundtrip(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for LocalDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Directory for LocalDirectory {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        self.simulate_roundtrip().await;

        let mut accounts = self.accounts.write().await;
        let record = accounts
            .get_mut(&email.trim().to_lowercase())
            .ok_or(SessionError::InvalidCredentials)?;

        let matches = password::verify_password(password, &record.password_phc)
            .map_err(|_| SessionError::InvalidCredentials)?;
        if !matches {
            return Err(SessionError::InvalidCredentials);
        }

        record.identity.last_login_at = Some(Utc::now());
        Ok(record.identity.clone())
    }

    async fn create_account(
        &self,
        profile: &RegistrationProfile,
    ) -> Result<Identity, SessionError> {
        self.simulate_roundtrip().await;

        let key = profile.email.trim().to_lowercase();
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(SessionError::RegistrationFailed(
                "Email is already registered".to_string(),
            ));
        }

        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            date_of_birth: profile.date_of_birth,
            phone: profile.phone.clone(),
            emergency_contact: None,
            created_at: Utc::now(),
            last_login_at: None,
        };
        let password_phc = password::hash_password(&profile.password)
            .map_err(|e| SessionError::RegistrationFailed(e.to_string()))?;

        accounts.insert(
            key,
            AccountRecord {
                identity: identity.clone(),
                password_phc,
            },
        );
        info!(event = "account_created", user_id = %identity.id);
        Ok(identity)
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), SessionError> {
        self.simulate_roundtrip().await;
        // The notification channel is out of process; locally the request is
        // acknowledged whether or not the email is known.
        info!(event = "password_reset_requested", email = %email.trim().to_lowercase());
        Ok(())
    }
}
