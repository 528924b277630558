use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::ROOM_LOG_KEY_PREFIX;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub Uuid);

impl RoomId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s.trim()).map(Self)
    }

    /// Key of the durable record holding this room's message log.
    pub fn storage_key(&self) -> String {
        format!("{ROOM_LOG_KEY_PREFIX}{}", self.0)
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Opaque on purpose: seeded history uses non-UUID ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    /// The simulated conversational partner. Older records call it `ai`.
    #[serde(alias = "ai")]
    Synthetic,
}

impl Sender {
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "you",
            Self::Synthetic => "assistant",
        }
    }
}

/// Opaque reference to binary image content (a URL, object URL or path).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_is_room_scoped() {
        let id = RoomId::parse("1b4e28ba-2fa1-11d2-883f-0016d3cca427").unwrap();
        assert_eq!(
            id.storage_key(),
            "chat-messages-1b4e28ba-2fa1-11d2-883f-0016d3cca427"
        );
    }

    #[test]
    fn sender_accepts_legacy_ai() {
        let s: Sender = serde_json::from_str("\"ai\"").unwrap();
        assert_eq!(s, Sender::Synthetic);
        assert_eq!(serde_json::to_string(&Sender::Synthetic).unwrap(), "\"synthetic\"");
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
    }

    #[test]
    fn message_ids_are_unique() {
        assert_ne!(MessageId::new(), MessageId::new());
    }
}
