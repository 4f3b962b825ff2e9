use thiserror::Error;

use ml_store::StoreError;

#[derive(Debug, Error)]
pub enum SessionError {
    /// One generic message for any bad email/password pair, so a caller
    /// cannot learn which half was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    #[error("Password reset request failed: {0}")]
    ResetRequestFailed(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
