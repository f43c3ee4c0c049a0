//! SH1106 / SSD1306 OLED support over I2C.
//!
//! Drawing happens into [`Sh1106Panel`], a page-organised frame buffer that
//! implements `DrawTarget`. On `flush` the finished buffer is handed to a
//! [`FrameSink`]; the firmware's sink forwards it to a task that owns the
//! async [`Sh1106`] bus driver, so the UI never waits on I2C.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_hal_async::i2c::I2c;
use oledui_common::{DisplayKind, Panel};

/// Usual 7-bit address (0x3D with the address pin pulled high).
pub const I2C_ADDR: u8 = 0x3C;

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
pub const PAGES: usize = HEIGHT / 8;

/// One bit per pixel, eight rows per byte, LSB on top.
pub type PageBuffer = [[u8; WIDTH]; PAGES];

#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Control byte prefixes.
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

pub const INIT_SEQUENCE: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x80,
    cmd::SET_MUX_RATIO,
    0x3F,
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    0x14,
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x12,
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

/// RAM column of the first visible pixel. The SH1106 has 132 columns
/// centred on a 128 pixel glass.
pub const fn column_offset(kind: DisplayKind) -> u8 {
    match kind {
        DisplayKind::Sh1106 => 2,
        DisplayKind::Ssd1306 => 0,
    }
}

/// Commands selecting `page` and its first column.
pub const fn page_address(
    page: u8,
    offset: u8,
) -> [u8; 3] {
    [
        cmd::SET_PAGE_ADDR | (page & 0x07),
        cmd::SET_LOW_COLUMN | (offset & 0x0F),
        cmd::SET_HIGH_COLUMN | (offset >> 4),
    ]
}

// =============================================================================
// Frame Buffer
// =============================================================================

/// Receives finished frames and power requests from the panel.
pub trait FrameSink {
    fn submit(
        &mut self,
        pages: &PageBuffer,
    );

    fn power(
        &mut self,
        on: bool,
    );
}

pub struct Sh1106Panel<S> {
    buffer: PageBuffer,
    sink: S,
}

impl<S: FrameSink> Sh1106Panel<S> {
    pub const fn new(sink: S) -> Self {
        Self {
            buffer: [[0; WIDTH]; PAGES],
            sink,
        }
    }

    pub const fn buffer(&self) -> &PageBuffer { &self.buffer }

    pub fn is_set(
        &self,
        x: usize,
        y: usize,
    ) -> bool {
        x < WIDTH && y < HEIGHT && self.buffer[y / 8][x] & (1 << (y % 8)) != 0
    }
}

impl<S> OriginDimensions for Sh1106Panel<S> {
    fn size(&self) -> Size { Size::new(WIDTH as u32, HEIGHT as u32) }
}

impl<S> DrawTarget for Sh1106Panel<S> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if x >= WIDTH || y >= HEIGHT {
                continue;
            }
            let byte = &mut self.buffer[y / 8][x];
            let mask = 1 << (y % 8);
            if color.is_on() {
                *byte |= mask;
            } else {
                *byte &= !mask;
            }
        }
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        for page in &mut self.buffer {
            page.fill(fill);
        }
        Ok(())
    }
}

impl<S: FrameSink> Panel for Sh1106Panel<S> {
    fn flush(&mut self) { self.sink.submit(&self.buffer); }

    fn set_power(
        &mut self,
        on: bool,
    ) {
        self.sink.power(on);
    }
}

// =============================================================================
// Bus Driver
// =============================================================================

/// Async I2C driver writing page buffers to the controller.
pub struct Sh1106<I2C> {
    i2c: I2C,
    address: u8,
    offset: u8,
}

impl<I2C: I2c> Sh1106<I2C> {
    pub const fn new(
        i2c: I2C,
        kind: DisplayKind,
    ) -> Self {
        Self {
            i2c,
            address: I2C_ADDR,
            offset: column_offset(kind),
        }
    }

    pub async fn init(&mut self) -> Result<(), I2C::Error> {
        for &c in INIT_SEQUENCE {
            self.command(c).await?;
        }
        Ok(())
    }

    async fn command(
        &mut self,
        c: u8,
    ) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[CONTROL_COMMAND, c]).await
    }

    pub async fn set_power(
        &mut self,
        on: bool,
    ) -> Result<(), I2C::Error> {
        self.command(if on { cmd::DISPLAY_ON } else { cmd::DISPLAY_OFF }).await
    }

    /// Write every page of `pages` to display RAM.
    pub async fn write_pages(
        &mut self,
        pages: &PageBuffer,
    ) -> Result<(), I2C::Error> {
        let mut data = [0u8; WIDTH + 1];
        data[0] = CONTROL_DATA;
        for (page, row) in pages.iter().enumerate() {
            for c in page_address(page as u8, self.offset) {
                self.command(c).await?;
            }
            data[1..].copy_from_slice(row);
            self.i2c.write(self.address, &data).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        frames: u32,
        first_byte: u8,
        power: Option<bool>,
    }

    impl FrameSink for &mut Recorder {
        fn submit(
            &mut self,
            pages: &PageBuffer,
        ) {
            self.frames += 1;
            self.first_byte = pages[0][0];
        }

        fn power(
            &mut self,
            on: bool,
        ) {
            self.power = Some(on);
        }
    }

    #[test]
    fn test_pixel_packing() {
        let mut rec = Recorder::default();
        let mut panel = Sh1106Panel::new(&mut rec);
        Pixel(Point::new(0, 0), BinaryColor::On).draw(&mut panel).ok();
        Pixel(Point::new(3, 9), BinaryColor::On).draw(&mut panel).ok();
        assert_eq!(panel.buffer()[0][0], 0b0000_0001);
        assert_eq!(panel.buffer()[1][3], 0b0000_0010);
        assert!(panel.is_set(3, 9));
        assert!(!panel.is_set(3, 8));
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut rec = Recorder::default();
        let mut panel = Sh1106Panel::new(&mut rec);
        Rectangle::new(Point::new(-4, -4), Size::new(200, 100))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut panel)
            .ok();
        assert!(panel.buffer().iter().all(|page| page.iter().all(|b| *b == 0xFF)));
        panel.clear(BinaryColor::Off).ok();
        assert!(!panel.is_set(0, 0));
    }

    #[test]
    fn test_flush_and_power_reach_sink() {
        let mut rec = Recorder::default();
        {
            let mut panel = Sh1106Panel::new(&mut rec);
            Pixel(Point::new(0, 2), BinaryColor::On).draw(&mut panel).ok();
            panel.flush();
            panel.set_power(false);
        }
        assert_eq!(rec.frames, 1);
        assert_eq!(rec.first_byte, 0b0000_0100);
        assert_eq!(rec.power, Some(false));
    }

    #[test]
    fn test_page_address_commands() {
        assert_eq!(page_address(3, column_offset(DisplayKind::Sh1106)), [0xB3, 0x02, 0x10]);
        assert_eq!(page_address(7, column_offset(DisplayKind::Ssd1306)), [0xB7, 0x00, 0x10]);
    }

    #[test]
    fn test_init_ends_with_display_on() {
        assert_eq!(INIT_SEQUENCE.first(), Some(&cmd::DISPLAY_OFF));
        assert_eq!(INIT_SEQUENCE.last(), Some(&cmd::DISPLAY_ON));
    }
}
