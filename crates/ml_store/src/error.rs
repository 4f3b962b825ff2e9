use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Keychain error: {0}")]
    Keychain(#[from] keyring::Error),
}
