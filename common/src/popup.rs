//! Modal popup over the carousel region.
//!
//! While a popup is active the carousel frame is paused, so its periodic
//! redraw cannot overwrite the popup. The session owns the pause bookkeeping;
//! this module holds the popup state and draws the chrome and text.

use heapless::String;

use crate::config::{LINE_HEIGHT, MESSAGE_LEN, POPUP_INSET, TEXT_X_OFFSET, WRAP_WIDTH};
use crate::display::Display;
use crate::frame::FrameId;
use crate::geometry::{Area, Rect};

/// Offset of callback content from the inner area's left edge.
const CONTENT_X_OFFSET: i32 = 15;

/// Offset of text box content from the inner area's left edge.
const TEXTBOX_X_OFFSET: i32 = 12;

/// Vertical offset of popup content.
const CONTENT_Y_OFFSET: i32 = 4;

/// What the active popup shows.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PopupContent {
    /// Hover details of a frame.
    Hover(FrameId),
    /// Static message.
    Text(String<MESSAGE_LEN>),
}

// =============================================================================
// Text Wrapping
// =============================================================================

/// Split `msg` on `\n`, then cut every line into chunks of `width` characters.
/// Empty lines produce no chunk.
pub fn wrap_lines(
    msg: &str,
    width: usize,
) -> impl Iterator<Item = &str> {
    let width = width.max(1);
    msg.split('\n').flat_map(move |line| Chunks { rest: line, width })
}

struct Chunks<'a> {
    rest: &'a str,
    width: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let cut = self
            .rest
            .char_indices()
            .nth(self.width)
            .map_or(self.rest.len(), |(i, _)| i);
        let (chunk, rest) = self.rest.split_at(cut);
        self.rest = rest;
        Some(chunk)
    }
}

/// Draw wrapped text, at most `line_limit` lines, starting at `(x, y)`.
pub fn write_lines(
    display: &mut dyn Display,
    msg: &str,
    x: i32,
    y: i32,
    line_limit: usize,
) {
    for (i, line) in wrap_lines(msg, WRAP_WIDTH).take(line_limit).enumerate() {
        display.text(line, x + TEXT_X_OFFSET, y + LINE_HEIGHT * i as i32);
    }
}

// =============================================================================
// Popup
// =============================================================================

/// Popup state. Occupies the same rectangle as the carousel.
pub struct Popup {
    rect: Rect,
    content: Option<PopupContent>,
}

impl Popup {
    pub const fn new(rect: Rect) -> Self {
        Self { rect, content: None }
    }

    #[inline]
    pub const fn is_active(&self) -> bool { self.content.is_some() }

    pub fn content(&self) -> Option<&PopupContent> { self.content.as_ref() }

    /// Inner area, inset on every side.
    pub const fn inner(&self) -> Area {
        let a = &self.rect.area;
        Area::new(
            a.x + POPUP_INSET,
            a.y + POPUP_INSET,
            a.w.saturating_sub(2 * POPUP_INSET as u32),
            a.h.saturating_sub(2 * POPUP_INSET as u32),
        )
    }

    /// Area handed to hover callbacks: inner size, shifted past the icon.
    pub const fn content_area(&self) -> Area {
        let inner = self.inner();
        Area::new(inner.x + CONTENT_X_OFFSET, inner.y + CONTENT_Y_OFFSET, inner.w, inner.h)
    }

    /// Activate with new content, replacing any active popup.
    pub fn activate(
        &mut self,
        content: PopupContent,
    ) {
        self.content = Some(content);
    }

    /// Deactivate. Returns whether a popup was active.
    pub fn deactivate(&mut self) -> bool { self.content.take().is_some() }

    /// Clear the region and draw the info icon.
    pub fn draw_chrome(
        &self,
        display: &mut dyn Display,
        debug: bool,
    ) {
        let mut rect = self.rect;
        rect.selected = self.is_active();
        rect.clean(display, debug);

        let inner = self.inner();
        if debug {
            display.rect(inner.x, inner.y, inner.w, inner.h, true, false);
        }
        let x = inner.x + 2;
        let y_dot = inner.y + 4;
        display.rect(x, y_dot, 6, 6, true, true);
        display.rect(x, y_dot + 8, 6, 14, true, true);
    }

    /// Draw the message body of a text popup.
    pub fn draw_text(
        &self,
        display: &mut dyn Display,
        msg: &str,
        line_limit: usize,
    ) {
        let inner = self.inner();
        write_lines(display, msg, inner.x + TEXTBOX_X_OFFSET, inner.y + CONTENT_Y_OFFSET, line_limit);
    }

    /// Clear the region.
    pub fn clear(
        &self,
        display: &mut dyn Display,
        debug: bool,
    ) {
        let mut rect = self.rect;
        rect.selected = false;
        rect.clean(display, debug);
    }
}
