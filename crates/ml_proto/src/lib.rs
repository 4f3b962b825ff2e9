//! ml_proto — Mindline data and state layer
//!
//! Pure data/invariant types shared between the session manager, the content
//! cipher, and the UI layer.  No I/O happens here.
//!
//! # Modules
//! - `identity`     — registered-user profile data
//! - `message`      — messages, attachments, and the delivery-state machine
//! - `conversation` — conversations, unread accounting, last-message pointer
//! - `api`          — request/response types a real transport must satisfy
//! - `error`        — model error type

pub mod api;
pub mod conversation;
pub mod error;
pub mod identity;
pub mod message;

pub use conversation::{Conversation, Thread};
pub use error::ModelError;
pub use identity::{EmergencyContact, Identity, RegistrationProfile};
pub use message::{Attachment, ContentKind, DeliveryStatus, Message, SenderRole};
