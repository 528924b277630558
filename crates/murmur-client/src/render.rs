//! Plain-text rendering for the terminal front end.

use chrono::{DateTime, Local};

use murmur_store::Message;

use crate::events::SessionEvent;
use crate::scroll::{ScrollAdjustment, ScrollSurface};
use crate::state::AppState;

/// Height of one rendered message line.
const LINE_HEIGHT: f64 = 1.0;

/// A terminal "viewport": one line per rendered message.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    lines: usize,
    offset: f64,
}

impl TerminalSurface {
    pub fn lines(&self) -> usize {
        self.lines
    }
}

impl ScrollSurface for TerminalSurface {
    fn scroll_extent(&self) -> f64 {
        self.lines as f64 * LINE_HEIGHT
    }

    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.offset = offset.clamp(0.0, self.scroll_extent());
    }
}

/// `HH:MM` in local time.
pub fn format_time(ms: i64) -> String {
    match DateTime::from_timestamp_millis(ms) {
        Some(utc) => utc.with_timezone(&Local).format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

pub fn render_message(message: &Message) -> String {
    let mut line = format!("[{}] {}:", format_time(message.timestamp), message.sender.label());
    if let Some(text) = message.body.text() {
        line.push(' ');
        line.push_str(text);
    }
    if let Some(image) = message.body.image() {
        line.push_str(&format!(" [image: {image}]"));
    }
    line
}

/// Lines to print for an event, keeping the surface's line count in step
/// with what has been drawn.
pub fn render_event(event: &SessionEvent, surface: &mut TerminalSurface) -> Vec<String> {
    match event {
        SessionEvent::Initialized {
            room,
            window,
            total,
            can_extend,
            ..
        } => {
            surface.lines = window.len();
            let mut out = vec![format!(
                "== {} ({} of {} messages{}) ==",
                room.name,
                window.len(),
                total,
                if *can_extend { ", /older for more" } else { "" }
            )];
            out.extend(window.iter().map(render_message));
            out
        }
        SessionEvent::LoadingOlder => vec!["... loading older messages".to_string()],
        SessionEvent::WindowExtended {
            older,
            page_count,
            total_pages,
            can_extend,
            ..
        } => {
            surface.lines += older.len();
            let mut out = vec![format!(
                "-- {} older messages (page {page_count} of {total_pages}) --",
                older.len()
            )];
            out.extend(older.iter().map(render_message));
            if !can_extend {
                out.push("-- start of conversation --".to_string());
            }
            out
        }
        SessionEvent::MessageAppended { message, .. } => {
            surface.lines += 1;
            vec![render_message(message)]
        }
        SessionEvent::Composing { active: true } => vec!["assistant is typing...".to_string()],
        SessionEvent::Composing { active: false } => Vec::new(),
        SessionEvent::Notice { text } => vec![format!("! {text}")],
        SessionEvent::ScrollAdjusted { adjustment } => {
            if let ScrollAdjustment::Preserved { delta } = adjustment {
                tracing::debug!(delta, "scroll position preserved");
            }
            Vec::new()
        }
    }
}

/// Draw one event to stdout, then report the drawn sequence number back to
/// the open session.
pub async fn present(state: &AppState, event: SessionEvent) {
    let lines = match state.surface.lock() {
        Ok(mut surface) => render_event(&event, &mut surface),
        Err(_) => {
            tracing::error!("viewport lock poisoned");
            return;
        }
    };
    for line in lines {
        println!("{line}");
    }

    if let (Some(seq), Some(active)) = (event.layout_seq(), &state.active) {
        if let Err(e) = active.handle.layout_complete(seq).await {
            tracing::debug!(error = %e, "layout report dropped");
        }
    }
}
