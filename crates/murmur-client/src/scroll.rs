//! Scroll position preservation around window changes.
//!
//! Prepending older messages grows the scrollable extent above the content
//! the user is reading.  [`ScrollAnchor`] measures the extent before the
//! window is mutated and, once the render layer reports that the prepend has
//! been laid out, shifts the offset by exactly the growth.  Tail appends pin
//! the view to the bottom instead.
//!
//! Every layout-changing event carries a sequence number and the render
//! layer echoes the last one it drew.  A pending adjustment is bound to the
//! sequence number of the event that caused it and is only applied once the
//! render layer has drawn that event, never on an earlier acknowledgement.

use serde::Serialize;

/// The scrollable message viewport, as seen by the anchor.
pub trait ScrollSurface {
    /// Total scrollable height.
    fn scroll_extent(&self) -> f64;
    fn scroll_offset(&self) -> f64;
    fn set_scroll_offset(&mut self, offset: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScrollAdjustment {
    Preserved { delta: f64 },
    PinnedToBottom,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Anchor { prior_extent: f64, until: u64 },
    Bottom { until: u64 },
}

impl Pending {
    fn until(&self) -> u64 {
        match *self {
            Self::Anchor { until, .. } | Self::Bottom { until } => until,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScrollAnchor {
    pending: Option<Pending>,
}

impl ScrollAnchor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase one: measure before the window mutation.  `until` is the
    /// sequence number of the event that will draw the prepended messages.
    pub fn capture(&mut self, surface: &dyn ScrollSurface, until: u64) {
        self.pending = Some(Pending::Anchor {
            prior_extent: surface.scroll_extent(),
            until,
        });
    }

    /// Request a jump to the bottom once event `until` is drawn.  An
    /// outstanding anchor takes precedence; a newer pin supersedes an older
    /// one.
    pub fn pin_to_bottom(&mut self, until: u64) {
        match self.pending {
            Some(Pending::Anchor { .. }) => {}
            Some(Pending::Bottom { until: prev }) => {
                self.pending = Some(Pending::Bottom {
                    until: prev.max(until),
                });
            }
            None => self.pending = Some(Pending::Bottom { until }),
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Phase two: apply the adjustment if the render layer has drawn
    /// everything up to and including its event.
    pub fn after_layout(&mut self, surface: &mut dyn ScrollSurface, drawn: u64) -> ScrollAdjustment {
        match self.pending {
            Some(p) if p.until() <= drawn => {
                self.pending = None;
                apply(p, surface)
            }
            _ => ScrollAdjustment::Unchanged,
        }
    }
}

fn apply(pending: Pending, surface: &mut dyn ScrollSurface) -> ScrollAdjustment {
    match pending {
        Pending::Anchor { prior_extent, .. } => {
            let delta = surface.scroll_extent() - prior_extent;
            let offset = surface.scroll_offset() + delta;
            surface.set_scroll_offset(offset);
            ScrollAdjustment::Preserved { delta }
        }
        Pending::Bottom { .. } => {
            let bottom = surface.scroll_extent();
            surface.set_scroll_offset(bottom);
            ScrollAdjustment::PinnedToBottom
        }
    }
}
