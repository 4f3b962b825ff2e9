use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Content encoding failed")]
    Encoding,

    #[error("Content decoding failed (marker present but payload invalid)")]
    Decoding,

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}
