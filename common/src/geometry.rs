//! Rectangle primitive with hit-testing and highlight-on-select.

use crate::display::Display;

/// Content area handed to draw, page and press callbacks.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Area {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Area {
    pub const fn new(
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    ) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge.
    #[inline]
    pub const fn right(&self) -> i32 { self.x + self.w as i32 }

    /// Exclusive bottom edge.
    #[inline]
    pub const fn bottom(&self) -> i32 { self.y + self.h as i32 }

    /// True when the drawn pixels of both areas share at least one pixel.
    pub const fn overlaps(
        &self,
        other: &Area,
    ) -> bool {
        if self.w == 0 || self.h == 0 || other.w == 0 || other.h == 0 {
            return false;
        }
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }
}

/// A frame rectangle and its selection state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub area: Area,
    pub selected: bool,
}

impl Rect {
    pub const fn new(
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    ) -> Self {
        Self {
            area: Area::new(x, y, w, h),
            selected: false,
        }
    }

    /// Hit-test. The width bound includes one extra pixel past the border,
    /// matching the legacy layout the header widgets were designed for.
    pub const fn contains(
        &self,
        x: i32,
        y: i32,
    ) -> bool {
        let a = &self.area;
        a.x <= x && x <= a.x + a.w as i32 + 1 && a.y <= y && y <= a.y + a.h as i32
    }

    /// Update selection from a cursor position and return the new state.
    ///
    /// Draws the border when selection is gained, clears it when lost.
    pub fn select(
        &mut self,
        display: &mut dyn Display,
        x: i32,
        y: i32,
    ) -> bool {
        let hit = self.contains(x, y);
        self.set_selected(display, hit);
        hit
    }

    /// Force the selection state, drawing or clearing the border on change.
    pub fn set_selected(
        &mut self,
        display: &mut dyn Display,
        selected: bool,
    ) {
        if selected != self.selected {
            let a = self.area;
            display.rect(a.x, a.y, a.w, a.h, selected, false);
        }
        self.selected = selected;
    }

    /// Fill the background, then restore the border if selected or in debug mode.
    pub fn clean(
        &self,
        display: &mut dyn Display,
        debug: bool,
    ) {
        let a = self.area;
        display.rect(a.x, a.y, a.w, a.h, false, true);
        if self.selected || debug {
            display.rect(a.x, a.y, a.w, a.h, true, false);
        }
    }

    /// Content area inside the one-pixel border.
    pub const fn inset(&self) -> Area {
        let a = &self.area;
        Area::new(a.x + 1, a.y + 1, a.w.saturating_sub(2), a.h.saturating_sub(2))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::testing::{Op, RecordingDisplay};

    #[test]
    fn test_contains_edges() {
        let r = Rect::new(10, 5, 20, 8);
        assert!(r.contains(10, 5));
        assert!(r.contains(31, 13)); // x + w + 1, y + h
        assert!(!r.contains(32, 13));
        assert!(!r.contains(9, 5));
        assert!(!r.contains(10, 14));
    }

    #[test]
    fn test_select_draws_border_once() {
        let mut display = RecordingDisplay::new();
        let mut r = Rect::new(0, 0, 10, 10);
        assert!(r.select(&mut display, 3, 3));
        assert!(r.select(&mut display, 4, 4));
        assert_eq!(display.count(|op| matches!(op, Op::Rect { on: true, fill: false, .. })), 1);
    }

    #[test]
    fn test_select_loss_clears_border() {
        let mut display = RecordingDisplay::new();
        let mut r = Rect::new(0, 0, 10, 10);
        r.select(&mut display, 3, 3);
        assert!(!r.select(&mut display, 40, 40));
        assert!(!r.selected);
        assert_eq!(
            display.ops().last(),
            Some(&Op::Rect {
                x: 0,
                y: 0,
                w: 10,
                h: 10,
                on: false,
                fill: false
            })
        );
    }

    #[test]
    fn test_clean_redraws_border_in_debug() {
        let mut display = RecordingDisplay::new();
        let r = Rect::new(0, 0, 4, 4);
        r.clean(&mut display, false);
        assert_eq!(display.ops().len(), 1);
        r.clean(&mut display, true);
        assert_eq!(display.ops().len(), 3);
    }

    #[test]
    fn test_inset() {
        assert_eq!(Rect::new(0, 10, 128, 48).inset(), Area::new(1, 11, 126, 46));
        assert_eq!(Rect::new(0, 0, 1, 1).inset(), Area::new(1, 1, 0, 0));
    }

    #[test]
    fn test_overlap_is_exclusive() {
        let header = Area::new(0, 0, 128, 10);
        let body = Area::new(0, 10, 128, 48);
        assert!(!header.overlaps(&body));
        assert!(header.overlaps(&Area::new(100, 9, 5, 5)));
    }

    proptest! {
        #[test]
        fn hit_test_matches_bounds(
            rx in 0i32..100,
            ry in 0i32..60,
            w in 1u32..40,
            h in 1u32..20,
            px in -5i32..160,
            py in -5i32..100,
        ) {
            let r = Rect::new(rx, ry, w, h);
            let inside = rx <= px && px <= rx + w as i32 + 1 && ry <= py && py <= ry + h as i32;
            prop_assert_eq!(r.contains(px, py), inside);
        }
    }
}
