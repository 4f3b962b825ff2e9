//! Conversations, unread accounting, and the last-message pointer.
//!
//! `Thread` owns a conversation's message sequence and is the only way to
//! mutate it, so the two invariants hold by construction:
//! - the last-message pointer always names the most recently appended message
//! - the unread count never exceeds the number of non-read messages authored
//!   by the counterpart

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{DeliveryStatus, Message, SenderRole};

/// Conversation metadata as the UI layer reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub client_id: String,
    pub therapist_id: String,
    /// Points into the owning thread's message sequence.
    pub last_message_id: Option<String>,
    pub unread_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A conversation plus its owned message sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    conversation: Conversation,
    messages: Vec<Message>,
}

impl Thread {
    pub fn new(id: &str, client_id: &str, therapist_id: &str) -> Self {
        let now = Utc::now();
        Self {
            conversation: Conversation {
                id: id.to_string(),
                client_id: client_id.to_string(),
                therapist_id: therapist_id.to_string(),
                last_message_id: None,
                unread_count: 0,
                created_at: now,
                updated_at: now,
            },
            messages: Vec::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn unread_count(&self) -> u32 {
        self.conversation.unread_count
    }

    /// The most recently appended message.
    pub fn last_message(&self) -> Option<&Message> {
        let id = self.conversation.last_message_id.as_deref()?;
        self.messages.iter().rev().find(|m| m.id == id)
    }

    /// Append a message authored by the local client.  Never affects the
    /// unread count.
    pub fn append_outgoing(&mut self, message: Message) {
        self.append(message);
    }

    /// Append a message that arrived from the counterpart.  Bumps the unread
    /// count unless the message already carries the read status.
    pub fn append_incoming(&mut self, message: Message) {
        if message.sender_role == SenderRole::Therapist && !message.is_read() {
            self.conversation.unread_count += 1;
        }
        self.append(message);
    }

    /// The conversation was opened on screen: zero the unread count and
    /// promote every non-read counterpart message to read.  Both effects are
    /// applied in one pass over in-memory state; observers never see one
    /// without the other.
    pub fn mark_viewed(&mut self) {
        for msg in &mut self.messages {
            if msg.sender_role == SenderRole::Therapist && !msg.is_read() {
                msg.mark_read();
            }
        }
        self.conversation.unread_count = 0;
    }

    /// Advance one message's delivery status (e.g. on a delivery receipt).
    pub fn advance_message_status(
        &mut self,
        message_id: &str,
        next: DeliveryStatus,
    ) -> Result<(), crate::error::ModelError> {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == message_id) {
            msg.advance_status(next)?;
        }
        Ok(())
    }

    fn append(&mut self, message: Message) {
        self.conversation.last_message_id = Some(message.id.clone());
        self.conversation.updated_at = message.sent_at;
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ContentKind, SenderRole};
    use ml_crypto::{ContentCipher, ConversationKey};

    fn cipher() -> ContentCipher {
        ContentCipher::new(ConversationKey::from_bytes([6u8; 32]))
    }

    fn incoming(thread_id: &str, c: &ContentCipher, text: &str) -> Message {
        Message::compose(thread_id, "therapist-1", SenderRole::Therapist, ContentKind::Text, text, c)
            .unwrap()
    }

    fn outgoing(thread_id: &str, c: &ContentCipher, text: &str) -> Message {
        Message::compose(thread_id, "client-1", SenderRole::Client, ContentKind::Text, text, c)
            .unwrap()
    }

    #[test]
    fn three_incoming_then_viewed() {
        let c = cipher();
        let mut thread = Thread::new("conv-1", "client-1", "therapist-1");

        thread.append_incoming(incoming("conv-1", &c, "one"));
        thread.append_incoming(incoming("conv-1", &c, "two"));
        thread.append_incoming(incoming("conv-1", &c, "three"));
        assert_eq!(thread.unread_count(), 3);

        thread.mark_viewed();
        assert_eq!(thread.unread_count(), 0);
        assert!(thread
            .messages()
            .iter()
            .all(|m| m.sender_role != SenderRole::Therapist || m.is_read()));
    }

    #[test]
    fn outgoing_messages_never_count_as_unread() {
        let c = cipher();
        let mut thread = Thread::new("conv-1", "client-1", "therapist-1");

        thread.append_outgoing(outgoing("conv-1", &c, "hello"));
        thread.append_incoming(incoming("conv-1", &c, "hi"));
        assert_eq!(thread.unread_count(), 1);
    }

    #[test]
    fn already_read_incoming_does_not_bump_unread() {
        let c = cipher();
        let mut thread = Thread::new("conv-1", "client-1", "therapist-1");

        let mut msg = incoming("conv-1", &c, "old history");
        msg.advance_status(DeliveryStatus::Read).unwrap();
        thread.append_incoming(msg);
        assert_eq!(thread.unread_count(), 0);
    }

    #[test]
    fn unread_never_exceeds_counterpart_non_read() {
        let c = cipher();
        let mut thread = Thread::new("conv-1", "client-1", "therapist-1");

        thread.append_incoming(incoming("conv-1", &c, "a"));
        thread.append_outgoing(outgoing("conv-1", &c, "b"));
        thread.append_incoming(incoming("conv-1", &c, "c"));

        let counterpart_non_read = thread
            .messages()
            .iter()
            .filter(|m| m.sender_role == SenderRole::Therapist && !m.is_read())
            .count() as u32;
        assert!(thread.unread_count() <= counterpart_non_read);
    }

    #[test]
    fn last_message_tracks_every_append() {
        let c = cipher();
        let mut thread = Thread::new("conv-1", "client-1", "therapist-1");
        assert!(thread.last_message().is_none());

        let first = outgoing("conv-1", &c, "first");
        let first_id = first.id.clone();
        thread.append_outgoing(first);
        assert_eq!(thread.last_message().map(|m| m.id.as_str()), Some(first_id.as_str()));

        let second = incoming("conv-1", &c, "second");
        let second_id = second.id.clone();
        let second_sent_at = second.sent_at;
        thread.append_incoming(second);
        assert_eq!(thread.last_message().map(|m| m.id.as_str()), Some(second_id.as_str()));
        assert_eq!(thread.conversation().updated_at, second_sent_at);
    }

    #[test]
    fn delivery_receipt_advances_one_message() {
        let c = cipher();
        let mut thread = Thread::new("conv-1", "client-1", "therapist-1");
        let msg = outgoing("conv-1", &c, "hello");
        let id = msg.id.clone();
        thread.append_outgoing(msg);

        thread.advance_message_status(&id, DeliveryStatus::Delivered).unwrap();
        assert_eq!(thread.messages()[0].status(), DeliveryStatus::Delivered);

        // Regressions are rejected and change nothing.
        assert!(thread.advance_message_status(&id, DeliveryStatus::Sent).is_err());
        assert_eq!(thread.messages()[0].status(), DeliveryStatus::Delivered);
    }
}
