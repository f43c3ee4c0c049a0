//! Simulated monochrome panel.
//!
//! Wraps a [`SimulatorDisplay`] and tracks power and flushes so the UI can
//! run without hardware. In headless mode the last flushed frame is dumped
//! as ASCII; with the `window` feature the main loop pushes flushed frames
//! to an SDL window.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::SimulatorDisplay;
use oledui_common::Panel;

/// Panel backed by the embedded-graphics simulator buffer.
pub struct SimPanel {
    display: SimulatorDisplay<BinaryColor>,
    /// Mirror of the simulator buffer for the ASCII dump.
    pixels: Vec<bool>,
    powered: bool,
    flushes: u32,
    dirty: bool,
}

impl SimPanel {
    pub fn new(
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            display: SimulatorDisplay::new(Size::new(width, height)),
            pixels: vec![false; (width * height) as usize],
            powered: false,
            flushes: 0,
            dirty: false,
        }
    }

    #[inline]
    pub const fn powered(&self) -> bool { self.powered }

    #[inline]
    pub const fn flushes(&self) -> u32 { self.flushes }

    pub fn display(&self) -> &SimulatorDisplay<BinaryColor> { &self.display }

    /// True once per flush; the window loop uses it to skip idle updates.
    pub fn take_dirty(&mut self) -> bool { core::mem::take(&mut self.dirty) }

    /// Render the buffer as text, two rows per line. Blank while powered off.
    pub fn to_ascii(&self) -> String {
        let size = self.display.size();
        let mut out = String::with_capacity(((size.width + 1) * size.height / 2) as usize);
        for y in (0..size.height as i32).step_by(2) {
            for x in 0..size.width as i32 {
                let top = self.lit(x, y);
                let bottom = self.lit(x, y + 1);
                out.push(match (top, bottom) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                });
            }
            out.push('\n');
        }
        out
    }

    fn lit(
        &self,
        x: i32,
        y: i32,
    ) -> bool {
        self.powered && self.pixel(x, y)
    }

    /// Buffer content at `(x, y)`, regardless of power.
    pub fn pixel(
        &self,
        x: i32,
        y: i32,
    ) -> bool {
        buffer_index(self.display.size(), x, y).is_some_and(|i| self.pixels[i])
    }
}

fn buffer_index(
    size: Size,
    x: i32,
    y: i32,
) -> Option<usize> {
    if x < 0 || y < 0 || x >= size.width as i32 || y >= size.height as i32 {
        return None;
    }
    Some(y as usize * size.width as usize + x as usize)
}

impl DrawTarget for SimPanel {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let size = self.display.size();
        let buffer = &mut self.pixels;
        self.display.draw_iter(pixels.into_iter().inspect(|Pixel(point, color)| {
            if let Some(i) = buffer_index(size, point.x, point.y) {
                buffer[i] = color.is_on();
            }
        }))
    }
}

impl OriginDimensions for SimPanel {
    fn size(&self) -> Size { self.display.size() }
}

impl Panel for SimPanel {
    fn flush(&mut self) {
        self.flushes = self.flushes.wrapping_add(1);
        self.dirty = true;
    }

    fn set_power(
        &mut self,
        on: bool,
    ) {
        self.powered = on;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use oledui_common::{Canvas, Display};

    use super::*;

    #[test]
    fn test_canvas_draws_into_panel() {
        let mut canvas = Canvas::new(SimPanel::new(16, 8));
        canvas.poweron();
        canvas.rect(0, 0, 2, 2, true, true);
        canvas.show();
        let panel = canvas.panel();
        assert_eq!(panel.flushes(), 1);
        assert!(panel.pixel(1, 1));
        assert!(!panel.pixel(2, 1));
        assert!(panel.to_ascii().starts_with("██ "));
    }

    #[test]
    fn test_powered_off_dumps_blank() {
        let mut canvas = Canvas::new(SimPanel::new(4, 2));
        canvas.rect(0, 0, 4, 2, true, true);
        assert_eq!(canvas.panel().to_ascii(), "    \n");
        canvas.poweron();
        assert_eq!(canvas.panel().to_ascii(), "████\n");
    }

    #[test]
    fn test_dirty_flag_cleared_on_take() {
        let mut panel = SimPanel::new(4, 2);
        panel.flush();
        assert!(panel.take_dirty());
        assert!(!panel.take_dirty());
    }
}
