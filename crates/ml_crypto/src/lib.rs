//! ml_crypto — Mindline content-protection primitives
//!
//! # Design principles
//! - No custom crypto; all primitives come from audited RustCrypto crates.
//! - Secret key material is zeroized on drop.
//! - Protected values are marker-tagged so protected and plain content are
//!   always distinguishable; unmarked legacy content passes through `reveal`
//!   unchanged.
//!
//! # Module layout
//! - `aead`     — XChaCha20-Poly1305 encrypt/decrypt helpers
//! - `content`  — marker-tagged protect/reveal for message bodies and file references
//! - `kdf`      — HKDF-SHA256 key derivation
//! - `keys`     — conversation key material
//! - `password` — Argon2id password hashing (PHC strings)
//! - `error`    — unified error type

pub mod aead;
pub mod content;
pub mod error;
pub mod kdf;
pub mod keys;
pub mod password;

pub use content::{ContentCipher, CONTENT_TAG, FILE_TAG};
pub use error::CryptoError;
pub use keys::ConversationKey;
