//! Idle animation shown while hibernating.
//!
//! Runs as its own scheduler task, outside the frame registry. Without an
//! animation, or once the animation is finished, the screensaver stops and
//! powers the display off.

use crate::capabilities::{Animation, Grid};
use crate::display::Display;
use crate::geometry::Rect;

/// Outcome of one screensaver tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// A frame was drawn.
    Drawn,
    /// Animation finished or absent; display powered off.
    Stopped,
}

/// Screensaver state.
pub struct ScreenSaver {
    rect: Rect,
    running: bool,
    ticks: u32,
}

impl ScreenSaver {
    /// Cover the whole panel, one pixel past each edge.
    pub const fn new(
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            rect: Rect::new(0, 0, width + 1, height + 1),
            running: false,
            ticks: 0,
        }
    }

    #[inline]
    pub const fn is_running(&self) -> bool { self.running }

    /// Ticks since the last start.
    #[inline]
    pub const fn ticks(&self) -> u32 { self.ticks }

    pub fn start(&mut self) {
        self.running = true;
        self.ticks = 0;
    }

    /// Draw the next animation frame, or stop and power off.
    pub fn tick(
        &mut self,
        display: &mut dyn Display,
        animation: Option<&mut (dyn Animation + 'static)>,
    ) -> Tick {
        self.ticks = self.ticks.wrapping_add(1);
        let Some(animation) = animation else {
            self.running = false;
            self.rect.clean(display, false);
            display.poweroff();
            return Tick::Stopped;
        };
        match animation.next_frame() {
            Some(grid) => {
                self.render(display, grid);
                Tick::Drawn
            }
            None => {
                self.cancel(display, Some(animation));
                display.poweroff();
                Tick::Stopped
            }
        }
    }

    fn render(
        &self,
        display: &mut dyn Display,
        grid: &Grid,
    ) {
        self.rect.clean(display, false);
        if grid.height() == 0 {
            return;
        }
        let scale = (self.rect.area.h / grid.height() as u32).max(1);
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let on = grid.get(x, y);
                if scale == 1 {
                    display.pixel(x as i32, y as i32, on);
                } else {
                    let s = scale as i32;
                    display.rect(x as i32 * s, y as i32 * s, scale, scale, on, true);
                }
            }
        }
        display.show();
    }

    /// Stop, reset the animation and clear the panel.
    pub fn cancel(
        &mut self,
        display: &mut dyn Display,
        animation: Option<&mut (dyn Animation + 'static)>,
    ) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Some(animation) = animation {
            animation.reset();
        }
        self.rect.clean(display, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FiniteAnimation, Op, RecordingDisplay};

    #[test]
    fn test_absent_animation_powers_off() {
        let mut saver = ScreenSaver::new(128, 64);
        let mut display = RecordingDisplay::new();
        saver.start();
        assert_eq!(saver.tick(&mut display, None), Tick::Stopped);
        assert!(!saver.is_running());
        assert!(!display.powered);
    }

    #[test]
    fn test_runs_until_animation_ends() {
        let mut saver = ScreenSaver::new(128, 64);
        let mut display = RecordingDisplay::new();
        let mut anim = FiniteAnimation::new(2);
        let resets = anim.resets.clone();
        saver.start();
        assert_eq!(saver.tick(&mut display, Some(&mut anim)), Tick::Drawn);
        assert_eq!(saver.tick(&mut display, Some(&mut anim)), Tick::Drawn);
        assert_eq!(saver.tick(&mut display, Some(&mut anim)), Tick::Stopped);
        assert_eq!(resets.get(), 1);
        assert!(!display.powered);
    }

    #[test]
    fn test_grid_scaled_to_panel() {
        // 4x4 grid on a 64 px tall panel: 65 / 4 = 16 px squares
        let mut saver = ScreenSaver::new(128, 64);
        let mut display = RecordingDisplay::new();
        let mut anim = FiniteAnimation::new(1);
        saver.start();
        saver.tick(&mut display, Some(&mut anim));
        assert!(display.ops().contains(&Op::Rect {
            x: 16,
            y: 16,
            w: 16,
            h: 16,
            on: true,
            fill: true
        }));
        assert_eq!(display.count(|op| matches!(op, Op::Rect { w: 16, .. })), 16);
    }

    #[test]
    fn test_cancel_resets_animation() {
        let mut saver = ScreenSaver::new(128, 64);
        let mut display = RecordingDisplay::new();
        let mut anim = FiniteAnimation::new(5);
        let resets = anim.resets.clone();
        saver.start();
        saver.tick(&mut display, Some(&mut anim));
        saver.cancel(&mut display, Some(&mut anim));
        assert_eq!(resets.get(), 1);
        saver.cancel(&mut display, Some(&mut anim));
        assert_eq!(resets.get(), 1);
    }
}
