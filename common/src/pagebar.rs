//! Page indicator drawn in the `footer` frame.

use crate::display::Display;
use crate::geometry::Area;

/// Segment width for `count` pages: `round(w / count)`.
#[inline]
pub const fn segment_len(
    width: u32,
    count: usize,
) -> u32 {
    if count == 0 {
        return 0;
    }
    let n = count as u32;
    (width + n / 2) / n
}

/// Fill the segment of the active page. Nothing is drawn without pages.
pub fn draw_page_bar(
    display: &mut dyn Display,
    area: Area,
    count: usize,
    active: usize,
) {
    let len = segment_len(area.w, count);
    if len == 0 {
        return;
    }
    display.rect(
        area.x + (active as u32 * len) as i32 + 1,
        area.y + 1,
        len.saturating_sub(2),
        area.h.saturating_sub(2),
        true,
        true,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Op, RecordingDisplay};

    #[test]
    fn test_segment_rounding() {
        assert_eq!(segment_len(126, 3), 42);
        assert_eq!(segment_len(126, 5), 25);
        assert_eq!(segment_len(126, 4), 32); // 31.5 rounds up
        assert_eq!(segment_len(126, 0), 0);
    }

    #[test]
    fn test_active_segment_position() {
        let mut display = RecordingDisplay::new();
        draw_page_bar(&mut display, Area::new(1, 59, 126, 4), 3, 2);
        assert_eq!(
            display.ops(),
            [Op::Rect {
                x: 86,
                y: 60,
                w: 40,
                h: 2,
                on: true,
                fill: true
            }]
        );
    }

    #[test]
    fn test_no_pages_draws_nothing() {
        let mut display = RecordingDisplay::new();
        draw_page_bar(&mut display, Area::new(1, 59, 126, 4), 0, 0);
        assert!(display.ops().is_empty());
    }
}
