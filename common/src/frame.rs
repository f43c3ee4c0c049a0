//! Frames and the frame registry.
//!
//! A frame is a rectangle redrawn periodically by its own scheduler task.
//! Built-in content (header widgets, carousel, page bar) is named by a
//! [`Content`] variant and rendered by the session, which owns the data those
//! widgets read. Custom frames carry a boxed draw callback.
//!
//! The registry is an arena: frames are never removed during a session, so a
//! [`FrameId`] stays valid for the lifetime of the UI. Registration order is
//! the hit-test order.

use alloc::boxed::Box;
use alloc::vec::Vec;

use heapless::String;

use crate::display::Display;
use crate::error::{CallbackError, UiError};
use crate::geometry::{Area, Rect};
use crate::scheduler::TaskId;

/// Maximum frame tag length.
pub const FRAME_TAG_LEN: usize = 16;

/// Reserved tag of the page indicator.
pub const FOOTER_TAG: &str = "footer";

/// Callback drawing into a content area.
pub type DrawFn = Box<dyn FnMut(&mut dyn Display, Area) -> Result<(), CallbackError>>;

/// Stable handle of a registered frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameId(usize);

impl FrameId {
    #[inline]
    pub const fn index(self) -> usize { self.0 }

    #[cfg(test)]
    pub(crate) const fn from_index(i: usize) -> Self { Self(i) }
}

/// What a frame draws on each redraw.
pub enum Content {
    /// `HH:MM:SS` clock.
    Clock,
    /// CPU and memory bars.
    CpuMem,
    /// Signal strength staircase.
    Signal,
    /// Inactivity countdown bar.
    Countdown,
    /// Active carousel page.
    Carousel,
    /// Page indicator.
    PageBar,
    Custom(DrawFn),
}

/// What a frame shows in the popup when the cursor enters it.
pub enum Hover {
    Uptime,
    CpuMem,
    Network,
    Countdown,
    Custom(DrawFn),
}

/// A registered frame.
pub struct Frame {
    tag: String<FRAME_TAG_LEN>,
    pub rect: Rect,
    pub(crate) content: Content,
    pub(crate) hover: Option<Hover>,
    pub(crate) press: Option<DrawFn>,
    pub(crate) paused: bool,
    pub(crate) fast_refresh: bool,
    pub(crate) task: Option<TaskId>,
    redraws: u32,
}

impl Frame {
    /// Create an unregistered frame. Fails if the tag does not fit.
    pub fn new(
        tag: &str,
        rect: Rect,
        content: Content,
    ) -> Result<Self, UiError> {
        let tag = String::try_from(tag).map_err(|_| UiError::TagTooLong)?;
        Ok(Self {
            tag,
            rect,
            content,
            hover: None,
            press: None,
            paused: false,
            fast_refresh: false,
            task: None,
            redraws: 0,
        })
    }

    pub fn with_hover(
        mut self,
        hover: Hover,
    ) -> Self {
        self.hover = Some(hover);
        self
    }

    pub fn with_press(
        mut self,
        press: DrawFn,
    ) -> Self {
        self.press = Some(press);
        self
    }

    #[inline]
    pub fn tag(&self) -> &str { self.tag.as_str() }

    #[inline]
    pub const fn area(&self) -> Area { self.rect.area }

    #[inline]
    pub const fn has_hover(&self) -> bool { self.hover.is_some() }

    /// The frame's own pause flag, independent of hibernation.
    #[inline]
    pub const fn own_paused(&self) -> bool { self.paused }

    #[inline]
    pub const fn fast_refresh_requested(&self) -> bool { self.fast_refresh }

    /// Redraw task, once the frame runs.
    #[inline]
    pub const fn task(&self) -> Option<TaskId> { self.task }

    /// Number of completed redraws.
    #[inline]
    pub const fn redraws(&self) -> u32 { self.redraws }

    pub(crate) fn count_redraw(&mut self) { self.redraws = self.redraws.wrapping_add(1); }
}

/// Arena of frames plus the hibernate flag.
#[derive(Default)]
pub struct FrameRegistry {
    frames: Vec<Frame>,
    hibernating: bool,
}

impl FrameRegistry {
    pub const fn new() -> Self {
        Self {
            frames: Vec::new(),
            hibernating: false,
        }
    }

    /// Add a frame. Rejects duplicate tags and rectangles sharing pixels
    /// with a registered frame.
    pub fn register(
        &mut self,
        frame: Frame,
    ) -> Result<FrameId, UiError> {
        if self.find(frame.tag()).is_some() {
            return Err(UiError::DuplicateTag);
        }
        if self.frames.iter().any(|f| f.area().overlaps(&frame.area())) {
            return Err(UiError::Overlap);
        }
        self.frames.push(frame);
        Ok(FrameId(self.frames.len() - 1))
    }

    /// Lookup by tag. Absent tags are a normal outcome.
    pub fn find(
        &self,
        tag: &str,
    ) -> Option<FrameId> {
        self.frames.iter().position(|f| f.tag() == tag).map(FrameId)
    }

    pub fn get(
        &self,
        id: FrameId,
    ) -> Option<&Frame> {
        self.frames.get(id.0)
    }

    pub fn get_mut(
        &mut self,
        id: FrameId,
    ) -> Option<&mut Frame> {
        self.frames.get_mut(id.0)
    }

    /// First frame, in registration order, whose hit area holds the point.
    pub fn hit(
        &self,
        x: i32,
        y: i32,
    ) -> Option<FrameId> {
        self.frames.iter().position(|f| f.rect.contains(x, y)).map(FrameId)
    }

    /// All ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = FrameId> + use<> { (0..self.frames.len()).map(FrameId) }

    #[inline]
    pub fn len(&self) -> usize { self.frames.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }

    /// A frame is paused by its own flag or by hibernation.
    pub fn is_paused(
        &self,
        id: FrameId,
    ) -> bool {
        self.hibernating || self.get(id).is_some_and(|f| f.paused)
    }

    pub fn set_paused(
        &mut self,
        id: FrameId,
        paused: bool,
    ) {
        if let Some(f) = self.get_mut(id) {
            f.paused = paused;
        }
    }

    /// Ask a frame to redraw on the next scheduler granule.
    pub fn request_refresh(
        &mut self,
        id: FrameId,
    ) {
        if let Some(f) = self.get_mut(id) {
            f.fast_refresh = true;
        }
    }

    #[inline]
    pub const fn is_hibernating(&self) -> bool { self.hibernating }

    /// Pause every frame. Each frame's own pause flag is left untouched.
    pub fn pause_all(&mut self) { self.hibernating = true; }

    /// Lift hibernation. Redrawing is the session's job.
    pub fn resume_all(&mut self) { self.hibernating = false; }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(
        tag: &str,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    ) -> Frame {
        Frame::new(tag, Rect::new(x, y, w, h), Content::Custom(Box::new(|_, _| Ok(())))).unwrap()
    }

    #[test]
    fn test_register_and_find() {
        let mut reg = FrameRegistry::new();
        let a = reg.register(plain("a", 0, 0, 10, 10)).unwrap();
        let b = reg.register(plain("b", 20, 0, 10, 10)).unwrap();
        assert_eq!(reg.find("a"), Some(a));
        assert_eq!(reg.find("b"), Some(b));
        assert_eq!(reg.find("missing"), None);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let mut reg = FrameRegistry::new();
        reg.register(plain("a", 0, 0, 10, 10)).unwrap();
        assert_eq!(reg.register(plain("a", 50, 0, 10, 10)).err(), Some(UiError::DuplicateTag));
    }

    #[test]
    fn test_overlap_rejected() {
        let mut reg = FrameRegistry::new();
        reg.register(plain("a", 0, 0, 10, 10)).unwrap();
        assert_eq!(reg.register(plain("b", 9, 9, 10, 10)).err(), Some(UiError::Overlap));
        // Touching edges are fine
        assert!(reg.register(plain("c", 10, 0, 10, 10)).is_ok());
    }

    #[test]
    fn test_hit_prefers_registration_order() {
        let mut reg = FrameRegistry::new();
        let a = reg.register(plain("a", 0, 0, 10, 10)).unwrap();
        let b = reg.register(plain("b", 11, 0, 10, 10)).unwrap();
        // x = 11 lies in a's extended hit area and in b
        assert_eq!(reg.hit(11, 5), Some(a));
        assert_eq!(reg.hit(15, 5), Some(b));
        assert_eq!(reg.hit(50, 50), None);
    }

    #[test]
    fn test_hibernate_preserves_own_pause() {
        let mut reg = FrameRegistry::new();
        let a = reg.register(plain("a", 0, 0, 10, 10)).unwrap();
        let b = reg.register(plain("b", 20, 0, 10, 10)).unwrap();
        reg.set_paused(b, true);

        reg.pause_all();
        assert!(reg.is_paused(a));
        assert!(reg.is_paused(b));

        reg.resume_all();
        assert!(!reg.is_paused(a));
        assert!(reg.is_paused(b));
    }

    #[test]
    fn test_tag_too_long() {
        let frame = Frame::new("x".repeat(40).as_str(), Rect::new(0, 0, 1, 1), Content::Clock);
        assert!(matches!(frame, Err(UiError::TagTooLong)));
    }
}
