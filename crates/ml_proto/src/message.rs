//! Messages, attachments, and the delivery-state machine.
//!
//! A message body only ever exists in its protected form here; plaintext is
//! derived on demand through the content cipher and never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ml_crypto::{ContentCipher, CryptoError};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    Client,
    Therapist,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Image,
    Document,
    Audio,
}

/// Delivery lifecycle of a message.  Variant order is the transition order;
/// moving backwards is rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Sent,
    Delivered,
    Read,
}

impl DeliveryStatus {
    /// Forward-only step.  Re-asserting the current status is a no-op.
    pub fn advance_to(self, next: DeliveryStatus) -> Result<DeliveryStatus, ModelError> {
        if next < self {
            Err(ModelError::InvalidStatusTransition { from: self, to: next })
        } else {
            Ok(next)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub file_name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub url: String,
    /// Present once the locator has been protected for storage/transit.
    pub protected_url: Option<String>,
}

impl Attachment {
    pub fn new(file_name: &str, size_bytes: u64, mime_type: &str, url: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_name: file_name.to_string(),
            size_bytes,
            mime_type: mime_type.to_string(),
            url: url.to_string(),
            protected_url: None,
        }
    }

    /// Protect the file locator.  The attachment's bytes are untouched.
    pub fn protect_url(&mut self, cipher: &ContentCipher) -> Result<(), CryptoError> {
        self.protected_url = Some(cipher.protect_file_ref(&self.url)?);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub sender_role: SenderRole,
    /// The only persisted body form; see [`Message::reveal_body`].
    pub protected_body: String,
    pub kind: ContentKind,
    status: DeliveryStatus,
    pub sent_at: DateTime<Utc>,
    /// Owned exclusively by this message; dropped with it.
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Build a message from plaintext.  The plaintext is protected
    /// immediately and is not retained.
    pub fn compose(
        conversation_id: &str,
        sender_id: &str,
        sender_role: SenderRole,
        kind: ContentKind,
        plaintext: &str,
        cipher: &ContentCipher,
    ) -> Result<Self, CryptoError> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: sender_id.to_string(),
            sender_role,
            protected_body: cipher.protect(plaintext)?,
            kind,
            status: DeliveryStatus::Sent,
            sent_at: Utc::now(),
            attachments: Vec::new(),
        })
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Derive the plaintext body for display.
    pub fn reveal_body(&self, cipher: &ContentCipher) -> Result<String, CryptoError> {
        cipher.reveal(&self.protected_body)
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn is_read(&self) -> bool {
        self.status == DeliveryStatus::Read
    }

    /// Forward-only status change; a rejected transition leaves the status
    /// unchanged.
    pub fn advance_status(&mut self, next: DeliveryStatus) -> Result<(), ModelError> {
        self.status = self.status.advance_to(next)?;
        Ok(())
    }

    /// Promotion to the terminal state, used when a conversation is viewed.
    /// Always a forward move, so it cannot fail.
    pub(crate) fn mark_read(&mut self) {
        self.status = DeliveryStatus::Read;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ml_crypto::ConversationKey;

    fn cipher() -> ContentCipher {
        ContentCipher::new(ConversationKey::from_bytes([4u8; 32]))
    }

    #[test]
    fn only_forward_transitions_succeed() {
        let c = cipher();
        let mut msg = Message::compose("c1", "u1", SenderRole::Client, ContentKind::Text, "hi", &c)
            .unwrap();

        msg.advance_status(DeliveryStatus::Delivered).unwrap();
        msg.advance_status(DeliveryStatus::Read).unwrap();

        let err = msg.advance_status(DeliveryStatus::Delivered).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidStatusTransition {
                from: DeliveryStatus::Read,
                to: DeliveryStatus::Delivered
            }
        ));
        // Rejected transition leaves the status unchanged.
        assert_eq!(msg.status(), DeliveryStatus::Read);
    }

    #[test]
    fn reasserting_current_status_is_a_noop() {
        let c = cipher();
        let mut msg = Message::compose("c1", "u1", SenderRole::Client, ContentKind::Text, "hi", &c)
            .unwrap();
        msg.advance_status(DeliveryStatus::Sent).unwrap();
        assert_eq!(msg.status(), DeliveryStatus::Sent);
    }

    #[test]
    fn skipping_delivered_is_allowed() {
        let c = cipher();
        let mut msg = Message::compose("c1", "u1", SenderRole::Client, ContentKind::Text, "hi", &c)
            .unwrap();
        msg.advance_status(DeliveryStatus::Read).unwrap();
        assert!(msg.is_read());
    }

    #[test]
    fn compose_stores_only_protected_body() {
        let c = cipher();
        let msg = Message::compose(
            "c1",
            "u1",
            SenderRole::Client,
            ContentKind::Text,
            "a private thought",
            &c,
        )
        .unwrap();

        assert!(msg.protected_body.starts_with(ml_crypto::CONTENT_TAG));
        assert!(!msg.protected_body.contains("private thought"));
        assert_eq!(msg.reveal_body(&c).unwrap(), "a private thought");
    }

    #[test]
    fn attachment_url_protection() {
        let c = cipher();
        let mut att = Attachment::new("intake.pdf", 20_480, "application/pdf", "file:///docs/intake.pdf");
        att.protect_url(&c).unwrap();

        let protected = att.protected_url.as_deref().unwrap();
        assert!(protected.starts_with(ml_crypto::FILE_TAG));
        assert_eq!(c.reveal_file_ref(protected).unwrap(), "file:///docs/intake.pdf");
    }

    #[test]
    fn message_serde_roundtrip_keeps_status() {
        let c = cipher();
        let mut msg = Message::compose("c1", "u1", SenderRole::Therapist, ContentKind::Text, "hi", &c)
            .unwrap();
        msg.advance_status(DeliveryStatus::Delivered).unwrap();

        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
        assert_eq!(back.status(), DeliveryStatus::Delivered);
    }
}
