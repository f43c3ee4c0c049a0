//! Pointer position and single-frame selection.

use crate::display::Display;
use crate::frame::{FrameId, FrameRegistry};

/// Result of moving the cursor.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Selection unchanged (same frame, or no frame under the cursor).
    Stay,
    /// Cursor entered a different frame.
    Enter { from: Option<FrameId>, to: FrameId },
}

/// Cursor glyph position and the selected frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Cursor {
    x: i32,
    y: i32,
    selected: Option<FrameId>,
}

impl Cursor {
    pub const fn new(
        x: i32,
        y: i32,
    ) -> Self {
        Self { x, y, selected: None }
    }

    #[inline]
    pub const fn position(&self) -> (i32, i32) { (self.x, self.y) }

    #[inline]
    pub const fn selected(&self) -> Option<FrameId> { self.selected }

    /// Draw the 2x2 glyph and publish it.
    pub fn draw(
        &self,
        display: &mut dyn Display,
    ) {
        let x = if self.x - 1 < 0 { self.x } else { self.x - 1 };
        display.rect(x, self.y + 1, 2, 2, true, true);
        display.show();
    }

    /// Erase the glyph at the current position.
    pub fn clear(
        &self,
        display: &mut dyn Display,
    ) {
        display.rect(self.x - 1, self.y + 1, 2, 2, false, true);
    }

    /// Move to `(x, y)` and reselect.
    ///
    /// Only the first frame under the cursor (registration order) stays
    /// selected; every other frame is deselected. The glyph is not redrawn
    /// here, the caller draws it after handling the transition.
    pub fn update(
        &mut self,
        display: &mut dyn Display,
        frames: &mut FrameRegistry,
        x: i32,
        y: i32,
    ) -> Transition {
        self.clear(display);
        self.x = x;
        self.y = y;

        let hit = frames.hit(x, y);
        for id in frames.ids().filter(|id| Some(*id) != hit) {
            if let Some(frame) = frames.get_mut(id) {
                frame.rect.set_selected(display, false);
            }
        }
        let Some(to) = hit else {
            return Transition::Stay;
        };
        if let Some(frame) = frames.get_mut(to) {
            frame.rect.set_selected(display, true);
        }

        if self.selected == Some(to) {
            return Transition::Stay;
        }
        let from = self.selected.replace(to);
        Transition::Enter { from, to }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use super::*;
    use crate::frame::{Content, Frame};
    use crate::geometry::Rect;
    use crate::testing::{Op, RecordingDisplay};

    fn registry() -> (FrameRegistry, FrameId, FrameId) {
        let mut reg = FrameRegistry::new();
        let a = reg
            .register(Frame::new("a", Rect::new(0, 0, 10, 10), Content::Custom(Box::new(|_, _| Ok(())))).unwrap())
            .unwrap();
        let b = reg
            .register(Frame::new("b", Rect::new(20, 0, 10, 10), Content::Custom(Box::new(|_, _| Ok(())))).unwrap())
            .unwrap();
        (reg, a, b)
    }

    #[test]
    fn test_enter_and_stay() {
        let (mut reg, a, b) = registry();
        let mut display = RecordingDisplay::new();
        let mut cursor = Cursor::new(0, 0);

        assert_eq!(cursor.update(&mut display, &mut reg, 5, 5), Transition::Enter { from: None, to: a });
        assert_eq!(cursor.update(&mut display, &mut reg, 6, 6), Transition::Stay);
        assert_eq!(cursor.update(&mut display, &mut reg, 25, 5), Transition::Enter { from: Some(a), to: b });
        assert_eq!(cursor.selected(), Some(b));
    }

    #[test]
    fn test_single_selection() {
        let (mut reg, a, b) = registry();
        let mut display = RecordingDisplay::new();
        let mut cursor = Cursor::new(0, 0);
        cursor.update(&mut display, &mut reg, 5, 5);
        cursor.update(&mut display, &mut reg, 25, 5);
        assert!(!reg.get(a).unwrap().rect.selected);
        assert!(reg.get(b).unwrap().rect.selected);
    }

    #[test]
    fn test_moving_inside_frame_keeps_border() {
        let (mut reg, _, _) = registry();
        let mut display = RecordingDisplay::new();
        let mut cursor = Cursor::new(0, 0);
        cursor.update(&mut display, &mut reg, 5, 5);
        let before = display.ops().len();
        cursor.update(&mut display, &mut reg, 6, 7);
        let border_ops = display.ops()[before..]
            .iter()
            .filter(|op| matches!(op, Op::Rect { w: 10, h: 10, .. }))
            .count();
        assert_eq!(border_ops, 0);
    }

    #[test]
    fn test_empty_space_keeps_selection() {
        let (mut reg, a, _) = registry();
        let mut display = RecordingDisplay::new();
        let mut cursor = Cursor::new(0, 0);
        cursor.update(&mut display, &mut reg, 5, 5);
        assert_eq!(cursor.update(&mut display, &mut reg, 100, 50), Transition::Stay);
        assert_eq!(cursor.selected(), Some(a));
        assert!(!reg.get(a).unwrap().rect.selected);
    }

    #[test]
    fn test_glyph_clamped_at_left_edge() {
        let mut display = RecordingDisplay::new();
        Cursor::new(0, 63).draw(&mut display);
        assert_eq!(
            display.ops()[0],
            Op::Rect {
                x: 0,
                y: 64,
                w: 2,
                h: 2,
                on: true,
                fill: true
            }
        );
        assert_eq!(display.shows(), 1);
    }
}
