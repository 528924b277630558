//! Domain model structs persisted in the local database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a UI layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use murmur_shared::constants::IMAGE_PLACEHOLDER_TEXT;
use murmur_shared::{ImageRef, MessageError, MessageId, RoomId, Sender};

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A chat room listed in the directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Unique room identifier.
    pub id: RoomId,
    /// Human-readable room name.
    pub name: String,
    /// When the room was created locally.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Message body
// ---------------------------------------------------------------------------

/// Content of a message: text, an image reference, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Image(ImageRef),
    TextWithImage { text: String, image: ImageRef },
}

impl MessageBody {
    /// Build a body from optional parts, rejecting empty or blank content.
    pub fn new(text: Option<String>, image: Option<ImageRef>) -> Result<Self, MessageError> {
        if matches!(&text, Some(t) if t.trim().is_empty()) {
            return Err(MessageError::BlankText);
        }
        match (text, image) {
            (Some(text), Some(image)) => Ok(Self::TextWithImage { text, image }),
            (Some(text), None) => Ok(Self::Text(text)),
            (None, Some(image)) => Ok(Self::Image(image)),
            (None, None) => Err(MessageError::EmptyBody),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::TextWithImage { text, .. } => Some(text),
            Self::Image(_) => None,
        }
    }

    pub fn image(&self) -> Option<&ImageRef> {
        match self {
            Self::Image(image) | Self::TextWithImage { image, .. } => Some(image),
            Self::Text(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message in a room log.
///
/// Serialized as `{id, sender, text?, imageUrl?, timestamp}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "MessageRecord", into = "MessageRecord")]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Who wrote it.
    pub sender: Sender,
    /// Text and/or image.
    pub body: MessageBody,
    /// Logical append time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Message {
    pub fn new(id: MessageId, sender: Sender, body: MessageBody, timestamp: i64) -> Self {
        Self {
            id,
            sender,
            body,
            timestamp,
        }
    }

    /// Text-only message with a freshly generated id.
    pub fn text(sender: Sender, text: impl Into<String>, timestamp: i64) -> Result<Self, MessageError> {
        let body = MessageBody::new(Some(text.into()), None)?;
        Ok(Self::new(MessageId::new(), sender, body, timestamp))
    }

    /// What gets copied when the user clicks a message.
    pub fn clipboard_text(&self) -> &str {
        self.body.text().unwrap_or(IMAGE_PLACEHOLDER_TEXT)
    }
}

/// On-disk shape of a [`Message`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: MessageId,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ImageRef>,
    pub timestamp: i64,
}

impl TryFrom<MessageRecord> for Message {
    type Error = MessageError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        if record.id.as_str().is_empty() {
            return Err(MessageError::EmptyId);
        }
        let body = MessageBody::new(record.text, record.image_url)?;
        Ok(Self::new(record.id, record.sender, body, record.timestamp))
    }
}

impl From<Message> for MessageRecord {
    fn from(message: Message) -> Self {
        let (text, image_url) = match message.body {
            MessageBody::Text(text) => (Some(text), None),
            MessageBody::Image(image) => (None, Some(image)),
            MessageBody::TextWithImage { text, image } => (Some(text), Some(image)),
        };
        Self {
            id: message.id,
            sender: message.sender,
            text,
            image_url,
            timestamp: message.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_requires_content() {
        assert_eq!(MessageBody::new(None, None), Err(MessageError::EmptyBody));
        assert_eq!(
            MessageBody::new(Some("   ".into()), Some(ImageRef("a.png".into()))),
            Err(MessageError::BlankText)
        );
        let body = MessageBody::new(Some("hi".into()), Some(ImageRef("a.png".into()))).unwrap();
        assert_eq!(body.text(), Some("hi"));
        assert_eq!(body.image().map(ImageRef::as_str), Some("a.png"));
    }

    #[test]
    fn serializes_in_record_layout() {
        let msg = Message::new(
            MessageId("m1".into()),
            Sender::User,
            MessageBody::Image(ImageRef("blob:cat".into())),
            42,
        );
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "m1",
                "sender": "user",
                "imageUrl": "blob:cat",
                "timestamp": 42
            })
        );

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn rejects_record_without_body() {
        let raw = r#"{"id":"x","sender":"ai","timestamp":1}"#;
        assert!(serde_json::from_str::<Message>(raw).is_err());
    }

    #[test]
    fn clipboard_falls_back_for_images() {
        let image_only = Message::new(
            MessageId("m".into()),
            Sender::User,
            MessageBody::Image(ImageRef("x".into())),
            0,
        );
        assert_eq!(image_only.clipboard_text(), "[image message]");

        let text = Message::text(Sender::Synthetic, "hello", 0).unwrap();
        assert_eq!(text.clipboard_text(), "hello");
    }
}
