//! API request/response types shared between the client core and a transport.
//! These map directly to JSON bodies on the wire.
//!
//! The shipped build has no real transport (server calls are simulated
//! in-process); any transport that is added later must satisfy these shapes
//! and the session-manager error contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{Identity, RegistrationProfile};
use crate::message::{Attachment, ContentKind, DeliveryStatus, SenderRole};

// ── Authentication ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub identity: Identity,
    /// Opaque bearer token; the client never inspects it.
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub profile: RegistrationProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub identity: Identity,
    pub token: String,
}

/// Fire-and-forget; a 2xx acknowledgement carries no body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

// ── Messaging ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub conversation_id: String,
    pub sender_id: String,
    pub kind: ContentKind,
    /// Marker-tagged protected body; plaintext never crosses this boundary.
    pub protected_body: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message_id: String,
    pub accepted_at: DateTime<Utc>,
}

/// An inbound message as the transport delivers it.
#[derive(Debug, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub message_id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub sender_role: SenderRole,
    pub kind: ContentKind,
    pub protected_body: String,
    pub sent_at: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
}

/// Delivery/read receipt for a previously sent message.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusReceipt {
    pub message_id: String,
    pub status: DeliveryStatus,
}
