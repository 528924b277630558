use tokio::sync::mpsc;

use murmur_shared::{ImageRef, RoomId};

use crate::error::{ClientError, Result};
use crate::session::{RoomSession, SharedSurface, WindowSnapshot};
use crate::state::{ActiveRoom, AppState};

const EVENT_BUFFER: usize = 256;

/// Open a room, replacing whatever room was open before.
///
/// The previous session is only closed once the new one has started, so a
/// bad id leaves the current room untouched.
pub async fn open_room(state: &mut AppState, id: RoomId) -> Result<()> {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let surface: SharedSurface = state.surface.clone();
    let handle = RoomSession::open(state.ctx.clone(), id, surface, tx)?;

    state.close_active().await;
    state.active = Some(ActiveRoom { handle, events: rx });
    Ok(())
}

pub async fn send_text(state: &mut AppState, text: &str) -> Result<()> {
    state.composer.set_text(text);
    send_draft(state).await
}

pub async fn send_image(state: &mut AppState, reference: &str, caption: Option<&str>) -> Result<()> {
    state.composer.attach_image(ImageRef(reference.to_string()));
    state.composer.set_text(caption.unwrap_or_default());
    send_draft(state).await
}

async fn send_draft(state: &mut AppState) -> Result<()> {
    let active = state.active.as_ref().ok_or(ClientError::NoActiveRoom)?;
    let message = state
        .composer
        .take_message(state.ctx.clock.as_ref())
        .ok_or(ClientError::EmptyDraft)?;
    active.handle.send(message).await
}

/// Ask for the previous page, as if the top of the list scrolled into view.
pub async fn load_older(state: &AppState) -> Result<()> {
    state.active()?.handle.approaching_top().await
}

pub async fn status(state: &AppState) -> Result<WindowSnapshot> {
    state.active()?.handle.snapshot().await
}

/// Plain text of the `nth` newest message in the window (1 = newest).
pub async fn copy_message(state: &AppState, nth: usize) -> Result<String> {
    let snapshot = status(state).await?;
    nth.checked_sub(1)
        .and_then(|i| snapshot.window.iter().rev().nth(i))
        .map(|m| m.clipboard_text().to_string())
        .ok_or(ClientError::NoSuchMessage(nth))
}
