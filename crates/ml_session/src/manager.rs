//! The session state machine and its persistence.
//!
//! States are Unauthenticated and Authenticated(identity, token).  Login and
//! register move to Authenticated (replacing any active session); logout
//! moves to Unauthenticated; failed operations change nothing.  The initial
//! state comes from [`SessionManager::restore`] reading the secret store.
//!
//! Login, register, logout, and restore are serialized by an internal
//! operation lock: overlapping calls run one after another and the later
//! completed call's session stands.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use ml_proto::{Identity, RegistrationProfile};
use ml_store::SecretStore;

use crate::directory::Directory;
use crate::error::SessionError;
use crate::listeners::{AuthListeners, Subscription};

/// Storage keys reserved by the session manager; it is their sole writer.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USER_DATA_KEY: &str = "user_data";

/// Bump when the persisted identity layout changes; records carrying any
/// other version read as absent.
const STORED_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StoredIdentity {
    schema_version: u32,
    #[serde(flatten)]
    identity: Identity,
}

/// The in-memory (identity, token) pair while authenticated.
#[derive(Clone)]
pub struct ActiveSession {
    pub identity: Identity,
    pub token: String,
    /// When this session was installed.  Token expiry, when a policy is
    /// added, hangs off this timestamp.
    pub established_at: DateTime<Utc>,
}

/// Process-wide authentication state.  Cheap to clone (shared Arcs); build
/// one at the composition root and pass clones to consumers.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SecretStore>,
    directory: Arc<dyn Directory>,
    state: Arc<RwLock<Option<ActiveSession>>>,
    listeners: Arc<AuthListeners>,
    op: Arc<Mutex<()>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SecretStore>, directory: Arc<dyn Directory>) -> Self {
        Self {
            store,
            directory,
            state: Arc::new(RwLock::new(None)),
            listeners: Arc::new(AuthListeners::default()),
            op: Arc::new(Mutex::new(())),
        }
    }

    /// Determine the initial state from the secret store.  A complete
    /// persisted session (identity and token) moves the manager to
    /// Authenticated; anything else — including a partial record — leaves it
    /// Unauthenticated.  Listeners are not notified: this establishes the
    /// starting state rather than a transition.
    pub async fn restore(&self) -> Option<Identity> {
        let _guard = self.op.lock().await;
        let identity = self.read_stored_identity().await?;
        let token = self.stored_token().await?;

        *self.state.write() = Some(ActiveSession {
            identity: identity.clone(),
            token,
            established_at: Utc::now(),
        });
        info!(event = "session_restored", user_id = %identity.id);
        Some(identity)
    }

    /// Authenticate and install a new session, replacing any active one.
    /// Storage write failures propagate so the caller can offer a retry.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Identity, String), SessionError> {
        let _guard = self.op.lock().await;
        let identity = self.directory.authenticate(email, password).await?;
        let token = mint_token();

        self.persist(&identity, &token).await?;
        self.install(identity.clone(), token.clone());
        info!(event = "login", user_id = %identity.id);
        Ok((identity, token))
    }

    /// Create an account and install its session.  Both account-creation and
    /// persistence failures surface as `RegistrationFailed`.
    pub async fn register(
        &self,
        profile: &RegistrationProfile,
    ) -> Result<(Identity, String), SessionError> {
        let _guard = self.op.lock().await;
        let identity = self.directory.create_account(profile).await?;
        let token = mint_token();

        self.persist(&identity, &token)
            .await
            .map_err(|e| SessionError::RegistrationFailed(e.to_string()))?;
        self.install(identity.clone(), token.clone());
        info!(event = "register", user_id = %identity.id);
        Ok((identity, token))
    }

    /// Tear down the session.  Key deletions are best-effort — a failed
    /// delete is logged and skipped so storage still converges on absent —
    /// and the in-memory state is always cleared and announced.
    pub async fn logout(&self) {
        let _guard = self.op.lock().await;
        for key in [AUTH_TOKEN_KEY, USER_DATA_KEY] {
            if let Err(e) = self.store.delete(key).await {
                warn!(event = "logout_delete_failed", key, error = %e, "Continuing logout");
            }
        }
        *self.state.write() = None;
        self.listeners.notify(None);
        info!(event = "logout");
    }

    /// Fire-and-forget password-reset request.  Session state is untouched.
    pub async fn forgot_password(&self, email: &str) -> Result<(), SessionError> {
        self.directory.request_password_reset(email).await
    }

    /// Read the persisted identity.  Never fails: missing, unreadable, or
    /// malformed data reads as absent.
    pub async fn stored_identity(&self) -> Option<Identity> {
        self.read_stored_identity().await
    }

    /// Read the persisted token, with the same absent-on-failure contract.
    pub async fn stored_token(&self) -> Option<String> {
        match self.store.get(AUTH_TOKEN_KEY).await {
            Ok(value) => value,
            Err(e) => {
                warn!(event = "stored_token_unreadable", error = %e);
                None
            }
        }
    }

    /// Register an auth-state subscriber.  Subscribers are invoked
    /// synchronously, in registration order, on every login/register/logout
    /// transition, with the new identity or absent.
    pub fn add_listener(
        &self,
        callback: impl Fn(Option<&Identity>) + Send + Sync + 'static,
    ) -> Subscription {
        self.listeners.subscribe(callback)
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.state.read().as_ref().map(|s| s.identity.clone())
    }

    pub fn current_token(&self) -> Option<String> {
        self.state.read().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_some()
    }

    pub fn session_established_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().as_ref().map(|s| s.established_at)
    }

    // ── Internals ────────────────────────────────────────────────────────────

    async fn persist(&self, identity: &Identity, token: &str) -> Result<(), SessionError> {
        let record = StoredIdentity {
            schema_version: STORED_SCHEMA_VERSION,
            identity: identity.clone(),
        };
        self.store.set(AUTH_TOKEN_KEY, token).await?;
        self.store
            .set(USER_DATA_KEY, &serde_json::to_string(&record)?)
            .await?;
        Ok(())
    }

    fn install(&self, identity: Identity, token: String) {
        *self.state.write() = Some(ActiveSession {
            identity: identity.clone(),
            token,
            established_at: Utc::now(),
        });
        self.listeners.notify(Some(&identity));
    }

    async fn read_stored_identity(&self) -> Option<Identity> {
        let raw = match self.store.get(USER_DATA_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(event = "stored_identity_unreadable", error = %e);
                return None;
            }
        };
        match serde_json::from_str::<StoredIdentity>(&raw) {
            Ok(stored) if stored.schema_version == STORED_SCHEMA_VERSION => Some(stored.identity),
            Ok(stored) => {
                warn!(
                    event = "stored_identity_schema_mismatch",
                    found = stored.schema_version
                );
                None
            }
            Err(e) => {
                warn!(event = "stored_identity_malformed", error = %e);
                None
            }
        }
    }
}

/// Opaque bearer token: 32 random bytes, base64.
fn mint_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
