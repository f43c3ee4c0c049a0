//! Clocks driving the UI scheduler.

use std::cell::Cell;
use std::rc::Rc;
#[cfg(feature = "window")]
use std::time::Instant;

use oledui_common::Clock;

/// Real time since the simulator started.
#[cfg(feature = "window")]
pub struct WallClock(Instant);

#[cfg(feature = "window")]
impl WallClock {
    pub fn new() -> Self { Self(Instant::now()) }
}

#[cfg(feature = "window")]
impl Clock for WallClock {
    fn now_ms(&self) -> u64 { self.0.elapsed().as_millis() as u64 }
}

/// Virtual time advanced by the headless loop, so a scripted run finishes
/// instantly and always behaves the same.
#[derive(Clone, Default)]
pub struct VirtualClock(Rc<Cell<u64>>);

impl VirtualClock {
    pub fn advance(
        &self,
        ms: u64,
    ) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> u64 { self.0.get() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_shared() {
        let clock = VirtualClock::default();
        let reader = clock.clone();
        clock.advance(50);
        clock.advance(25);
        assert_eq!(reader.now_ms(), 75);
    }
}
