//! Test doubles shared by the unit tests.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::capabilities::{Animation, Clock, Grid, Haptic, Shell};
use crate::display::Display;
use crate::error::CallbackError;

/// One recorded display call.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Op {
    Clean,
    Rect {
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        on: bool,
        fill: bool,
    },
    Text {
        s: String,
        x: i32,
        y: i32,
    },
    Line,
    Pixel {
        x: i32,
        y: i32,
        on: bool,
    },
    Show,
    PowerOn,
    PowerOff,
}

/// Display that records every call.
#[derive(Default)]
pub struct RecordingDisplay {
    ops: Vec<Op>,
    pub powered: bool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            powered: true,
        }
    }

    pub fn ops(&self) -> &[Op] { &self.ops }

    pub fn reset(&mut self) { self.ops.clear(); }

    pub fn count(
        &self,
        f: impl Fn(&Op) -> bool,
    ) -> usize {
        self.ops.iter().filter(|op| f(op)).count()
    }

    pub fn shows(&self) -> usize { self.count(|op| matches!(op, Op::Show)) }

    /// All text drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { s, .. } => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_text(
        &self,
        needle: &str,
    ) -> bool {
        self.texts().iter().any(|s| s.contains(needle))
    }
}

impl Display for RecordingDisplay {
    fn clean(&mut self) { self.ops.push(Op::Clean); }

    fn rect(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        on: bool,
        fill: bool,
    ) {
        self.ops.push(Op::Rect { x, y, w, h, on, fill });
    }

    fn text(
        &mut self,
        s: &str,
        x: i32,
        y: i32,
    ) {
        self.ops.push(Op::Text { s: s.to_string(), x, y });
    }

    fn line(
        &mut self,
        _x0: i32,
        _y0: i32,
        _x1: i32,
        _y1: i32,
        _on: bool,
    ) {
        self.ops.push(Op::Line);
    }

    fn pixel(
        &mut self,
        x: i32,
        y: i32,
        on: bool,
    ) {
        self.ops.push(Op::Pixel { x, y, on });
    }

    fn show(&mut self) { self.ops.push(Op::Show); }

    fn poweron(&mut self) {
        self.powered = true;
        self.ops.push(Op::PowerOn);
    }

    fn poweroff(&mut self) {
        self.powered = false;
        self.ops.push(Op::PowerOff);
    }
}

/// Clock advanced by hand; clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn new() -> Self { Self::default() }

    pub fn set(
        &self,
        ms: u64,
    ) {
        self.0.set(ms);
    }

    pub fn advance(
        &self,
        ms: u64,
    ) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 { self.0.get() }
}

/// Haptic motor counting taps.
#[derive(Clone, Default)]
pub struct CountingHaptic(pub Rc<Cell<u32>>);

impl Haptic for CountingHaptic {
    fn tap(&mut self) { self.0.set(self.0.get() + 1); }
}

/// Animation yielding a fixed number of frames.
pub struct FiniteAnimation {
    grid: Grid,
    left: u32,
    total: u32,
    pub resets: Rc<Cell<u32>>,
}

impl FiniteAnimation {
    pub fn new(frames: u32) -> Self {
        let mut grid = Grid::new(4, 4);
        grid.set(1, 1, true);
        Self {
            grid,
            left: frames,
            total: frames,
            resets: Rc::default(),
        }
    }
}

impl Animation for FiniteAnimation {
    fn next_frame(&mut self) -> Option<&Grid> {
        if self.left == 0 {
            return None;
        }
        self.left -= 1;
        Some(&self.grid)
    }

    fn reset(&mut self) {
        self.left = self.total;
        self.resets.set(self.resets.get() + 1);
    }

    fn generation(&self) -> u32 { self.total - self.left }
}

/// Shell answering from canned output and recording executed commands.
#[derive(Clone, Default)]
pub struct FakeShell {
    pub executed: Rc<RefCell<Vec<String>>>,
    pub busy: Rc<Cell<bool>>,
}

impl Shell for FakeShell {
    fn exec(
        &mut self,
        cmd: &str,
    ) -> Result<String, CallbackError> {
        self.executed.borrow_mut().push(cmd.to_string());
        if cmd.starts_with("fail") {
            return Err(CallbackError::new("no such module"));
        }
        Ok(alloc::format!("out:{cmd}"))
    }

    fn spawn(
        &mut self,
        cmd: &str,
    ) -> Result<String, CallbackError> {
        self.executed.borrow_mut().push(cmd.to_string());
        self.busy.set(true);
        Ok("bg.task".to_string())
    }

    fn output(
        &mut self,
        _tag: &str,
    ) -> Option<String> {
        Some("bg progress 50".to_string())
    }

    fn is_busy(
        &mut self,
        _tag: &str,
    ) -> bool {
        self.busy.get()
    }
}
