//! ml_session — Mindline authentication session manager
//!
//! Owns the process's current-user identity: login/register/logout and
//! password-reset flows, durable persistence through `ml_store`, and
//! synchronous auth-state fan-out to registered listeners.
//!
//! The manager is an explicitly constructed object, not a global: the
//! composition root builds one `SessionManager` with its chosen store
//! backend and directory, then hands clones of the handle to consumers.
//!
//! # Modules
//! - `manager`   — the session state machine and persistence
//! - `directory` — account lookup seam + in-process simulation
//! - `listeners` — subscription registry for auth-state changes
//! - `error`     — unified error type

pub mod directory;
pub mod error;
pub mod listeners;
pub mod manager;

pub use directory::{Directory, LocalDirectory};
pub use error::SessionError;
pub use listeners::Subscription;
pub use manager::{ActiveSession, SessionManager, AUTH_TOKEN_KEY, USER_DATA_KEY};
