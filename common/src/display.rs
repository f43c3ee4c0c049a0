//! Display capability and the embedded-graphics adapter.
//!
//! The UI draws through the small [`Display`] trait (rect, text, line, pixel,
//! show, power). [`Canvas`] implements it on top of any monochrome
//! embedded-graphics [`DrawTarget`] that also implements [`Panel`], so the
//! same UI runs on the simulator window and on the SH1106 buffer.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use profont::PROFONT_7_POINT;

/// Drawing surface used by every frame, page and popup.
///
/// Coordinates are signed so partially off-screen frames clip instead of
/// wrapping.
pub trait Display {
    /// Clear the whole surface.
    fn clean(&mut self);

    /// Draw a rectangle outline (`fill == false`) or a filled block.
    fn rect(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        on: bool,
        fill: bool,
    );

    /// Draw text with its top-left corner at `(x, y)`.
    fn text(
        &mut self,
        s: &str,
        x: i32,
        y: i32,
    );

    fn line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        on: bool,
    );

    fn pixel(
        &mut self,
        x: i32,
        y: i32,
        on: bool,
    );

    /// Publish pending drawing to the panel.
    fn show(&mut self);

    fn poweron(&mut self);

    fn poweroff(&mut self);
}

/// A monochrome panel that can publish its buffer and switch power.
pub trait Panel: DrawTarget<Color = BinaryColor> {
    /// Make everything drawn so far visible.
    fn flush(&mut self);

    fn set_power(
        &mut self,
        on: bool,
    );
}

// =============================================================================
// Styles
// =============================================================================

const TEXT_STYLE: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&PROFONT_7_POINT, BinaryColor::On);

const FILL_ON: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_fill(BinaryColor::On);
const FILL_OFF: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_fill(BinaryColor::Off);
const STROKE_ON: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
const STROKE_OFF: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_stroke(BinaryColor::Off, 1);

#[inline]
const fn color(on: bool) -> BinaryColor {
    if on { BinaryColor::On } else { BinaryColor::Off }
}

// =============================================================================
// Canvas
// =============================================================================

/// [`Display`] implementation over an embedded-graphics [`Panel`].
pub struct Canvas<P> {
    panel: P,
}

impl<P: Panel> Canvas<P> {
    pub const fn new(panel: P) -> Self { Self { panel } }

    pub fn panel(&self) -> &P { &self.panel }

    pub fn panel_mut(&mut self) -> &mut P { &mut self.panel }

    pub fn into_inner(self) -> P { self.panel }
}

impl<P: Panel> Display for Canvas<P> {
    fn clean(&mut self) { self.panel.clear(BinaryColor::Off).ok(); }

    fn rect(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        on: bool,
        fill: bool,
    ) {
        let style = match (fill, on) {
            (true, true) => FILL_ON,
            (true, false) => FILL_OFF,
            (false, true) => STROKE_ON,
            (false, false) => STROKE_OFF,
        };
        Rectangle::new(Point::new(x, y), Size::new(w, h))
            .into_styled(style)
            .draw(&mut self.panel)
            .ok();
    }

    fn text(
        &mut self,
        s: &str,
        x: i32,
        y: i32,
    ) {
        Text::with_baseline(s, Point::new(x, y), TEXT_STYLE, Baseline::Top)
            .draw(&mut self.panel)
            .ok();
    }

    fn line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        on: bool,
    ) {
        let style = if on { STROKE_ON } else { STROKE_OFF };
        Line::new(Point::new(x0, y0), Point::new(x1, y1))
            .into_styled(style)
            .draw(&mut self.panel)
            .ok();
    }

    fn pixel(
        &mut self,
        x: i32,
        y: i32,
        on: bool,
    ) {
        Pixel(Point::new(x, y), color(on)).draw(&mut self.panel).ok();
    }

    fn show(&mut self) { self.panel.flush(); }

    fn poweron(&mut self) { self.panel.set_power(true); }

    fn poweroff(&mut self) { self.panel.set_power(false); }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::mock_display::MockDisplay;

    use super::*;

    struct MockPanel {
        inner: MockDisplay<BinaryColor>,
        flushes: u32,
        powered: bool,
    }

    impl MockPanel {
        fn new() -> Self {
            let mut inner = MockDisplay::new();
            inner.set_allow_overdraw(true);
            inner.set_allow_out_of_bounds_drawing(true);
            Self {
                inner,
                flushes: 0,
                powered: true,
            }
        }
    }

    impl OriginDimensions for MockPanel {
        fn size(&self) -> Size { self.inner.size() }
    }

    impl DrawTarget for MockPanel {
        type Color = BinaryColor;
        type Error = core::convert::Infallible;

        fn draw_iter<I>(
            &mut self,
            pixels: I,
        ) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            self.inner.draw_iter(pixels)
        }
    }

    impl Panel for MockPanel {
        fn flush(&mut self) { self.flushes += 1; }

        fn set_power(
            &mut self,
            on: bool,
        ) {
            self.powered = on;
        }
    }

    #[test]
    fn test_filled_rect_sets_pixels() {
        let mut canvas = Canvas::new(MockPanel::new());
        canvas.rect(2, 3, 4, 2, true, true);
        let panel = canvas.panel();
        assert_eq!(panel.inner.get_pixel(Point::new(2, 3)), Some(BinaryColor::On));
        assert_eq!(panel.inner.get_pixel(Point::new(5, 4)), Some(BinaryColor::On));
        assert_eq!(panel.inner.get_pixel(Point::new(6, 4)), None);
    }

    #[test]
    fn test_outline_clear_turns_border_off() {
        let mut canvas = Canvas::new(MockPanel::new());
        canvas.rect(0, 0, 5, 5, true, false);
        canvas.rect(0, 0, 5, 5, false, false);
        assert_eq!(canvas.panel().inner.get_pixel(Point::new(0, 0)), Some(BinaryColor::Off));
    }

    #[test]
    fn test_show_and_power_reach_panel() {
        let mut canvas = Canvas::new(MockPanel::new());
        canvas.show();
        canvas.poweroff();
        assert_eq!(canvas.panel().flushes, 1);
        assert!(!canvas.panel().powered);
        canvas.poweron();
        assert!(canvas.panel().powered);
    }

    #[test]
    fn test_text_draws_something() {
        let mut canvas = Canvas::new(MockPanel::new());
        canvas.text("A", 0, 0);
        let lit = canvas.panel().inner.affected_area();
        assert!(lit.size.width > 0);
    }
}
