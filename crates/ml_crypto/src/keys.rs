//! Conversation key material.

use rand::RngCore;
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;
use crate::kdf;

pub const KEY_LEN: usize = 32;

const DERIVE_SALT: &[u8] = b"ml-conversation-key-v1";

/// 32-byte symmetric key protecting one conversation's content.
/// Zeroized on drop.  Deliberately no `Debug` impl.
#[derive(Clone, ZeroizeOnDrop)]
pub struct ConversationKey(pub(crate) [u8; KEY_LEN]);

impl ConversationKey {
    /// Generate a fresh random key (provisioning a new conversation).
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive the key for `conversation_id` from a per-user root key.
    pub fn derive(root: &ConversationKey, conversation_id: &str) -> Result<Self, CryptoError> {
        let mut out = [0u8; KEY_LEN];
        kdf::hkdf_expand(&root.0, Some(DERIVE_SALT), conversation_id.as_bytes(), &mut out)?;
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}
