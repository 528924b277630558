use serde::Serialize;
use tokio::sync::mpsc;

use murmur_store::{Message, Room};

use crate::scroll::ScrollAdjustment;

pub const EVENT_INITIALIZED: &str = "initialized";
pub const EVENT_LOADING_OLDER: &str = "loading-older";
pub const EVENT_WINDOW_EXTENDED: &str = "window-extended";
pub const EVENT_MESSAGE_APPENDED: &str = "message-appended";
pub const EVENT_COMPOSING: &str = "composing";
pub const EVENT_NOTICE: &str = "notice";
pub const EVENT_SCROLL_ADJUSTED: &str = "scroll-adjusted";

/// Everything a room session tells its render layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum SessionEvent {
    Initialized {
        seq: u64,
        room: Room,
        window: Vec<Message>,
        total: usize,
        can_extend: bool,
    },
    /// An older page was requested; show placeholders until it arrives.
    LoadingOlder,
    WindowExtended {
        seq: u64,
        /// The prepended messages, oldest first.
        older: Vec<Message>,
        page_count: usize,
        total_pages: usize,
        can_extend: bool,
    },
    MessageAppended {
        seq: u64,
        message: Message,
        index: usize,
    },
    Composing {
        active: bool,
    },
    /// Non-fatal problem worth showing the user.
    Notice {
        text: String,
    },
    ScrollAdjusted {
        adjustment: ScrollAdjustment,
    },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialized { .. } => EVENT_INITIALIZED,
            Self::LoadingOlder => EVENT_LOADING_OLDER,
            Self::WindowExtended { .. } => EVENT_WINDOW_EXTENDED,
            Self::MessageAppended { .. } => EVENT_MESSAGE_APPENDED,
            Self::Composing { .. } => EVENT_COMPOSING,
            Self::Notice { .. } => EVENT_NOTICE,
            Self::ScrollAdjusted { .. } => EVENT_SCROLL_ADJUSTED,
        }
    }

    /// Sequence number the render layer must echo in `LayoutComplete`
    /// after drawing this event; `None` for events that change no layout.
    pub fn layout_seq(&self) -> Option<u64> {
        match self {
            Self::Initialized { seq, .. }
            | Self::WindowExtended { seq, .. }
            | Self::MessageAppended { seq, .. } => Some(*seq),
            _ => None,
        }
    }

    pub fn changes_layout(&self) -> bool {
        self.layout_seq().is_some()
    }
}

pub async fn emit_event(tx: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    let name = event.name();
    if tx.send(event).await.is_err() {
        tracing::debug!(event = name, "event receiver dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let json = serde_json::to_value(SessionEvent::Composing { active: true }).unwrap();
        assert_eq!(json, serde_json::json!({"event": "composing", "active": true}));
        assert_eq!(SessionEvent::LoadingOlder.name(), EVENT_LOADING_OLDER);
    }

    #[test]
    fn only_window_changes_need_layout() {
        assert!(!SessionEvent::LoadingOlder.changes_layout());
        assert!(!SessionEvent::Notice { text: "x".into() }.changes_layout());
        let extended = SessionEvent::WindowExtended {
            seq: 7,
            older: Vec::new(),
            page_count: 2,
            total_pages: 3,
            can_extend: true,
        };
        assert_eq!(extended.layout_seq(), Some(7));
    }
}
