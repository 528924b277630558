//! Draft state for the message input.

use murmur_shared::{Clock, ImageRef, MessageId, Sender};
use murmur_store::{Message, MessageBody};

#[derive(Debug, Clone, Default)]
pub struct Composer {
    text: String,
    image: Option<ImageRef>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attach_image(&mut self, image: ImageRef) {
        self.image = Some(image);
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    pub fn can_send(&self) -> bool {
        !self.text.trim().is_empty() || self.image.is_some()
    }

    /// Turn the draft into a user message and reset the draft.
    ///
    /// Returns `None` and leaves the draft alone when there is nothing to
    /// send.
    pub fn take_message(&mut self, clock: &dyn Clock) -> Option<Message> {
        if !self.can_send() {
            return None;
        }

        let trimmed = self.text.trim();
        let text = (!trimmed.is_empty()).then(|| trimmed.to_string());
        let body = MessageBody::new(text, self.image.take()).ok()?;
        self.text.clear();

        Some(Message::new(MessageId::new(), Sender::User, body, clock.now_ms()))
    }
}
