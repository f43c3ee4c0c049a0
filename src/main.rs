// Crate-level lints: Allow common embedded/graphics patterns that pedantic lints flag
#![allow(clippy::cast_possible_truncation)] // u128 -> u64 millisecond counters
#![allow(clippy::cast_precision_loss)] // load averages and EMA in f32
#![allow(clippy::cast_possible_wrap)] // u32 -> i32 pixel math
#![allow(clippy::cast_sign_loss)] // i32 -> u32 where values are positive

//! Desktop simulator for the oledui page UI.
//!
//! Runs the same `PageUi` as the firmware against a simulated monochrome
//! panel. The default build is headless: a scripted demo drives the UI on a
//! virtual clock and dumps frames to the terminal as ASCII. With the
//! `window` feature the UI runs in real time in an SDL window.
//!
//! # Window Controls
//!
//! Mouse moves the cursor, click presses. Keys mirror the panel buttons:
//!   A - Previous page
//!   B - Next page
//!   X - Press
//!   Y - Display off / on
//!   P - Show a popup
//!   G - Toggle frame outlines

mod clock;
mod config;
mod life;
mod monitor;
mod panel;
mod profiling;
mod shell;

use std::cell::Cell;
use std::fmt;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use oledui_common::config::GRANULE_MS;
use oledui_common::{
    Action, Canvas, Capabilities, Clock, Display, Page, PageOutput, PageUi, PointerAction, PointerEvent, UiError,
};

use crate::clock::VirtualClock;
use crate::config::{Cli, LIFE_HEIGHT, LIFE_WIDTH, SimConfig};
use crate::life::Life;
use crate::monitor::HostMonitor;
use crate::panel::SimPanel;
use crate::profiling::PollMetrics;
use crate::shell::DemoShell;

type SimUi = PageUi<Canvas<SimPanel>>;

// =============================================================================
// UI Setup
// =============================================================================

/// Build the UI with every simulator capability and a few demo pages.
fn build_ui(
    cfg: &SimConfig,
    clock: Box<dyn Clock>,
) -> Result<SimUi, UiError> {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(1, |d| d.subsec_nanos());
    let caps = Capabilities::new(clock)
        .with_pointer(Ok(()))
        .with_animation(Box::new(Life::new(LIFE_WIDTH, LIFE_HEIGHT, seed)))
        .with_monitor(Box::new(HostMonitor::new()))
        .with_shell(Box::new(DemoShell::new()));
    let panel = SimPanel::new(cfg.ui.width, cfg.ui.height);
    let mut ui = PageUi::load(cfg.ui, Canvas::new(panel), caps)?;

    ui.add_page(bars_page());
    ui.genpage("version", false)?;
    ui.genpage("scan wifi &", false)?;
    ui.genpage("echo auto run", true)?;
    Ok(ui)
}

/// Page drawing bars that shift on every redraw. Press shows a message.
fn bars_page() -> Page {
    let phase = Rc::new(Cell::new(0u32));
    Page::render(move |display: &mut dyn Display, area| {
        let p = phase.get();
        phase.set(p.wrapping_add(1));
        for i in 0..8u32 {
            let h = (i + p) % 8 * area.h / 8 + 1;
            let x = area.x + 4 + (i * 12) as i32;
            display.rect(x, area.y + area.h as i32 - h as i32, 8, h, true, true);
        }
        Ok(PageOutput::Press(Box::new(|display: &mut dyn Display, area| {
            display.text("bars pressed", area.x + 4, area.y + 4);
            Ok(())
        })))
    })
}

/// Print and drop every buffered log entry.
fn drain_log(ui: &mut SimUi) {
    while let Some(entry) = ui.log_mut().pop() {
        eprintln!("{entry}");
    }
}

// =============================================================================
// Headless Demo
// =============================================================================

#[cfg(not(feature = "window"))]
enum Step {
    Cursor(i32, i32),
    Pointer(PointerAction, i32, i32),
    Control(Action),
    Popup(&'static str),
}

#[cfg(not(feature = "window"))]
impl fmt::Display for Step {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Cursor(x, y) => write!(f, "cursor {x},{y}"),
            Self::Pointer(action, x, y) => write!(f, "pointer {action:?} {x},{y}"),
            Self::Control(action) => write!(f, "control {}", action.name()),
            Self::Popup(msg) => write!(f, "popup {msg:?}"),
        }
    }
}

/// Timeline of the headless demo: `(virtual ms, step)`.
#[cfg(not(feature = "window"))]
const SCRIPT: &[(u64, Step)] = &[
    (1_000, Step::Cursor(64, 60)),
    (1_500, Step::Pointer(PointerAction::Right, 64, 3)),
    (2_500, Step::Control(Action::Next)),
    (3_500, Step::Control(Action::Press)),
    (4_500, Step::Popup("Hello from the simulator")),
    (6_500, Step::Control(Action::Press)),
    (7_500, Step::Cursor(50, 5)),
    (9_000, Step::Cursor(64, 30)),
    (10_000, Step::Control(Action::Off)),
    (14_000, Step::Control(Action::On)),
    (15_000, Step::Control(Action::Prev)),
];

#[cfg(not(feature = "window"))]
fn apply(
    ui: &mut SimUi,
    step: &Step,
) {
    match *step {
        Step::Cursor(x, y) => ui.cursor(x, y),
        Step::Pointer(action, x, y) => ui.pointer(PointerEvent {
            x,
            y,
            toggle: false,
            action: Some(action),
        }),
        Step::Control(action) => ui.control(action),
        Step::Popup(msg) => ui.popup(msg),
    }
}

#[cfg(not(feature = "window"))]
fn run_headless(cfg: &SimConfig) -> Result<(), UiError> {
    let clock = VirtualClock::default();
    let mut ui = build_ui(cfg, Box::new(clock.clone()))?;
    let mut metrics = PollMetrics::new();
    let mut script = SCRIPT.iter().peekable();
    let end_ms = u64::from(cfg.seconds) * 1000;

    while clock.now_ms() < end_ms {
        let start = Instant::now();
        let mut dump = false;
        while let Some((at, step)) = script.next_if(|(at, _)| *at <= clock.now_ms()) {
            println!("[{at:>8}] > {step}");
            apply(&mut ui, step);
            dump = true;
        }
        ui.poll();
        drain_log(&mut ui);
        if dump {
            print!("{}", ui.display().panel().to_ascii());
        }
        metrics.record_poll(start.elapsed(), start.elapsed(), config::LOOP_TIME);
        clock.advance(u64::from(GRANULE_MS));
    }

    println!("{}", ui.display().panel().to_ascii());
    println!(
        "polls={} flushes={} page={}/{} avg={}us max={}us",
        metrics.total_polls,
        ui.display().panel().flushes(),
        ui.active_page(),
        ui.page_count(),
        metrics.work_time_avg_us(),
        metrics.work_time_max_us
    );
    Ok(())
}

// =============================================================================
// SDL Window
// =============================================================================

#[cfg(feature = "window")]
fn run_window(cfg: &SimConfig) -> Result<(), UiError> {
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::prelude::*;
    use embedded_graphics_simulator::sdl2::Keycode;
    use embedded_graphics_simulator::{
        BinaryColorTheme, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
    };
    use oledui_common::PowerState;

    use crate::clock::WallClock;
    use crate::config::{LOOP_TIME, WINDOW_SCALE};

    let mut ui = build_ui(cfg, Box::new(WallClock::new()))?;
    let settings = OutputSettingsBuilder::new()
        .scale(WINDOW_SCALE)
        .theme(BinaryColorTheme::OledBlue)
        .build();
    let mut window = Window::new("oledui simulator", &settings);
    let blank: SimulatorDisplay<BinaryColor> = SimulatorDisplay::new(Size::new(cfg.ui.width, cfg.ui.height));
    let mut metrics = PollMetrics::new();
    window.update(ui.display().panel().display());

    loop {
        let start = Instant::now();
        for ev in window.events() {
            match ev {
                SimulatorEvent::Quit => return Ok(()),
                SimulatorEvent::MouseMove { point } => ui.cursor(point.x, point.y),
                SimulatorEvent::MouseButtonDown { point, .. } => {
                    ui.cursor(point.x, point.y);
                    ui.control_with(Some(Action::Press), false);
                }
                SimulatorEvent::KeyDown { keycode, repeat, .. } => {
                    // Ignore OS key repeat
                    if repeat {
                        continue;
                    }
                    match keycode {
                        Keycode::A => ui.control(Action::Prev),
                        Keycode::B => ui.control(Action::Next),
                        Keycode::X => ui.control(Action::Press),
                        Keycode::Y => match ui.power_state() {
                            PowerState::Active => ui.control(Action::Off),
                            PowerState::Hibernating => ui.control(Action::On),
                        },
                        Keycode::P => ui.popup("Key P pressed"),
                        Keycode::G => {
                            let on = ui.debug(None);
                            ui.debug(Some(!on));
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        ui.poll();
        drain_log(&mut ui);
        let panel = ui.display_mut().panel_mut();
        if panel.take_dirty() {
            if panel.powered() {
                window.update(panel.display());
            } else {
                window.update(&blank);
            }
        }

        let work = start.elapsed();
        let sleep = LOOP_TIME.saturating_sub(work);
        std::thread::sleep(sleep);
        metrics.record_poll(start.elapsed(), work, sleep);
    }
}

fn main() -> ExitCode {
    let cfg = match SimConfig::try_from(Cli::parse()) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    #[cfg(feature = "window")]
    let result = run_window(&cfg);
    #[cfg(not(feature = "window"))]
    let result = run_headless(&cfg);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
