//! Marker-tagged protect/reveal transforms for message bodies and file
//! references.
//!
//! A protected value is self-identifying: the `enc1:` tag (message content)
//! or `encf1:` tag (file references) followed by base64 of the AEAD wire
//! bytes.  `reveal` returns unmarked input unchanged — historical plaintext
//! written before protection was introduced must keep rendering.
//!
//! File references are opaque locator strings; the engine never touches the
//! file bytes themselves.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

use crate::aead;
use crate::error::CryptoError;
use crate::keys::ConversationKey;

/// Tag prefix identifying protected message content.
pub const CONTENT_TAG: &str = "enc1:";
/// Tag prefix identifying protected file references.
pub const FILE_TAG: &str = "encf1:";

const CONTENT_AAD: &[u8] = b"ml-content-v1";
const FILE_AAD: &[u8] = b"ml-fileref-v1";

/// Forward/reverse content transform bound to one conversation key.
pub struct ContentCipher {
    key: ConversationKey,
}

impl ContentCipher {
    pub fn new(key: ConversationKey) -> Self {
        Self { key }
    }

    /// Protect message text for storage or transit.
    pub fn protect(&self, plaintext: &str) -> Result<String, CryptoError> {
        self.seal(CONTENT_TAG, CONTENT_AAD, plaintext)
    }

    /// Reverse transform for display.  Unmarked input is legacy plaintext
    /// and is returned unchanged.
    pub fn reveal(&self, value: &str) -> Result<String, CryptoError> {
        self.open(CONTENT_TAG, CONTENT_AAD, value)
    }

    /// Protect an opaque file locator (URL, URI).
    pub fn protect_file_ref(&self, uri: &str) -> Result<String, CryptoError> {
        self.seal(FILE_TAG, FILE_AAD, uri)
    }

    /// Reverse transform for file locators, with the same pass-through rule.
    pub fn reveal_file_ref(&self, value: &str) -> Result<String, CryptoError> {
        self.open(FILE_TAG, FILE_AAD, value)
    }

    fn seal(&self, tag: &str, aad: &[u8], plaintext: &str) -> Result<String, CryptoError> {
        let wire = aead::encrypt(self.key.as_bytes(), plaintext.as_bytes(), aad)?;
        Ok(format!("{tag}{}", URL_SAFE_NO_PAD.encode(wire)))
    }

    fn open(&self, tag: &str, aad: &[u8], value: &str) -> Result<String, CryptoError> {
        let Some(payload) = value.strip_prefix(tag) else {
            return Ok(value.to_string());
        };
        let wire = URL_SAFE_NO_PAD.decode(payload).map_err(|_| CryptoError::Decoding)?;
        let plaintext = aead::decrypt(self.key.as_bytes(), &wire, aad)?;
        String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::Decoding)
    }
}

/// True when `value` carries either protected-content tag.
pub fn is_protected(value: &str) -> bool {
    value.starts_with(CONTENT_TAG) || value.starts_with(FILE_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> ContentCipher {
        ContentCipher::new(ConversationKey::from_bytes([9u8; 32]))
    }

    #[test]
    fn protect_reveal_roundtrip() {
        let c = cipher();
        let protected = c.protect("hello").unwrap();
        assert!(protected.starts_with(CONTENT_TAG));
        assert!(is_protected(&protected));
        assert_eq!(c.reveal(&protected).unwrap(), "hello");
    }

    #[test]
    fn legacy_plaintext_passes_through() {
        let c = cipher();
        assert_eq!(c.reveal("hello").unwrap(), "hello");
        assert_eq!(c.reveal_file_ref("https://files.example/a.pdf").unwrap(), "https://files.example/a.pdf");
    }

    #[test]
    fn marked_but_corrupt_payload_fails() {
        let c = cipher();
        assert!(matches!(c.reveal("enc1:!!not-base64!!"), Err(CryptoError::Decoding)));
        assert!(matches!(c.reveal("enc1:AAAA"), Err(CryptoError::Decoding)));
    }

    #[test]
    fn wrong_key_fails_to_reveal() {
        let protected = cipher().protect("private note").unwrap();
        let other = ContentCipher::new(ConversationKey::from_bytes([1u8; 32]));
        assert!(matches!(other.reveal(&protected), Err(CryptoError::Decoding)));
    }

    #[test]
    fn file_ref_roundtrip_uses_file_tag() {
        let c = cipher();
        let protected = c.protect_file_ref("file:///records/intake.pdf").unwrap();
        assert!(protected.starts_with(FILE_TAG));
        assert!(!protected.starts_with(CONTENT_TAG));
        assert_eq!(c.reveal_file_ref(&protected).unwrap(), "file:///records/intake.pdf");
    }

    #[test]
    fn content_and_file_domains_are_separate() {
        // A file-tagged value handed to the content path keeps its tag
        // (pass-through), it is never mis-decoded.
        let c = cipher();
        let protected = c.protect_file_ref("file:///records/intake.pdf").unwrap();
        assert_eq!(c.reveal(&protected).unwrap(), protected);
    }

    #[test]
    fn unicode_content_roundtrips() {
        let c = cipher();
        let text = "Größe – 大丈夫 🙂";
        let protected = c.protect(text).unwrap();
        assert_eq!(c.reveal(&protected).unwrap(), text);
    }
}
