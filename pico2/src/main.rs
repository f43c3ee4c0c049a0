//! oledui firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Runs the page UI on a 128x64 SH1106 OLED connected to I2C0.
//!
//! # Architecture
//!
//! The main task owns the `PageUi` and polls it every granule. Drawing goes
//! into an in-RAM page buffer; `show` copies it to a shared frame and wakes
//! the flush task, which writes it to the panel over async I2C while the
//! main task carries on.
//!
//! # Button Controls
//!
//! - **A**: Previous page
//! - **B**: Next page
//! - **X**: Press (page action, or close popup)
//! - **Y**: Display off / on

#![no_std]
#![no_main]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

use alloc::boxed::Box;
use core::cell::RefCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use embedded_alloc::LlffHeap as Heap;
use oledui_common::config::GRANULE_MS;
use oledui_common::{Canvas, Capabilities, Clock, Display, Haptic, Page, PageOutput, PageUi, UiConfig};
use oledui_pico2::cpu_cycles;
use oledui_pico2::input::{ButtonLevels, ButtonPad};
use oledui_pico2::monitor::{BoardMonitor, BoardStats};
use oledui_pico2::sh1106::{FrameSink, PAGES, PageBuffer, Sh1106, Sh1106Panel, WIDTH};
use {defmt_rtt as _, panic_probe as _};

// =============================================================================
// Board Configuration
// =============================================================================

const HEAP_SIZE: usize = 48 * 1024;

/// I2C bus speed for the panel.
const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Length of one haptic motor pulse.
const HAPTIC_PULSE_MS: u64 = 30;

/// Inactivity timeout before the display hibernates.
const POWEROFF_S: u32 = 60;

#[global_allocator]
static HEAP: Heap = Heap::empty();

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"oledui-pico2"),
    embassy_rp::binary_info::rp_program_description!(c"Frame-based page UI on an SH1106 OLED"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

static BOARD_STATS: BoardStats = BoardStats::new();

// =============================================================================
// Display Flush Pipeline
// =============================================================================

/// Last frame published by the UI.
static FRAME: Mutex<CriticalSectionRawMutex, RefCell<PageBuffer>> = Mutex::new(RefCell::new([[0; WIDTH]; PAGES]));

/// Power state requested by the UI.
static PANEL_POWER: AtomicBool = AtomicBool::new(true);

/// Wakes the flush task after a new frame or power request.
static FLUSH_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Last flush time in microseconds (for profiling).
static LAST_FLUSH_TIME_US: AtomicU32 = AtomicU32::new(0);

/// Panel sink handing frames to the flush task.
struct SignalSink;

impl FrameSink for SignalSink {
    fn submit(
        &mut self,
        pages: &PageBuffer,
    ) {
        FRAME.lock(|frame| *frame.borrow_mut() = *pages);
        FLUSH_SIGNAL.signal(());
    }

    fn power(
        &mut self,
        on: bool,
    ) {
        PANEL_POWER.store(on, Ordering::Relaxed);
        FLUSH_SIGNAL.signal(());
    }
}

/// Display flush task - applies power changes and writes the latest frame.
///
/// Frames published while a write is in flight collapse into one, so the
/// panel always ends on the newest frame.
#[embassy_executor::task]
async fn display_flush_task(mut oled: Sh1106<I2c<'static, I2C0, i2c::Async>>) {
    info!("Display flush task started");
    let mut powered = true;
    let mut pages: PageBuffer = [[0; WIDTH]; PAGES];

    loop {
        FLUSH_SIGNAL.wait().await;

        let want = PANEL_POWER.load(Ordering::Relaxed);
        if want != powered {
            if let Err(e) = oled.set_power(want).await {
                warn!("Panel power failed: {}", e);
                continue;
            }
            powered = want;
        }
        if !powered {
            continue;
        }

        FRAME.lock(|frame| pages = *frame.borrow());
        let flush_start = Instant::now();
        if let Err(e) = oled.write_pages(&pages).await {
            warn!("Panel write failed: {}", e);
        }
        LAST_FLUSH_TIME_US.store(flush_start.elapsed().as_micros() as u32, Ordering::Relaxed);
    }
}

// =============================================================================
// Capabilities
// =============================================================================

struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 { Instant::now().as_millis() }
}

static HAPTIC_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

struct MotorHaptic;

impl Haptic for MotorHaptic {
    fn tap(&mut self) { HAPTIC_SIGNAL.signal(()); }
}

/// Pulses the vibration motor once per tap request.
#[embassy_executor::task]
async fn haptic_task(mut motor: Output<'static>) {
    loop {
        HAPTIC_SIGNAL.wait().await;
        motor.set_high();
        Timer::after_millis(HAPTIC_PULSE_MS).await;
        motor.set_low();
    }
}

/// Page listing the button mapping and the last flush time.
fn buttons_page() -> Page {
    Page::render(|display: &mut dyn Display, area| {
        let flush_us = LAST_FLUSH_TIME_US.load(Ordering::Relaxed);
        let x = area.x + 3;
        display.text("A prev  B next", x, area.y + 2);
        display.text("X press Y off", x, area.y + 12);
        display.text(&alloc::format!("flush {}us", flush_us), x, area.y + 22);
        Ok(PageOutput::Static)
    })
}

fn init_heap() {
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE);
    }
}

// =============================================================================
// Main
// =============================================================================

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("oledui starting...");
    init_heap();

    let p = embassy_rp::init(Default::default());
    cpu_cycles::init(cpu_cycles::DEFAULT_FREQ_HZ);
    info!("DWT cycle counter initialized at {} MHz", cpu_cycles::DEFAULT_FREQ_HZ / 1_000_000);

    // Panel on I2C0: SDA=4, SCL=5
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let bus = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c_config);

    let ui_config = match UiConfig::new(
        WIDTH as u32,
        (PAGES * 8) as u32,
        "sh1106",
        Some("buttons"),
        Some(POWEROFF_S),
        true,
    ) {
        Ok(cfg) => cfg,
        Err(e) => defmt::panic!("Invalid UI config: {}", defmt::Display2Format(&e)),
    };

    let mut oled = Sh1106::new(bus, ui_config.display);
    if let Err(e) = oled.init().await {
        warn!("Panel init failed: {}", e);
    }
    spawner.spawn(display_flush_task(oled)).unwrap();
    info!("Display flush task spawned");

    let motor = Output::new(p.PIN_22, Level::Low);
    spawner.spawn(haptic_task(motor)).unwrap();

    // Buttons are active-low with pull-ups
    let btn_a = Input::new(p.PIN_12, Pull::Up);
    let btn_b = Input::new(p.PIN_13, Pull::Up);
    let btn_x = Input::new(p.PIN_14, Pull::Up);
    let btn_y = Input::new(p.PIN_15, Pull::Up);
    let mut pad = ButtonPad::new();
    info!("Buttons initialized!");

    let caps = Capabilities::new(Box::new(EmbassyClock))
        .with_haptic(Ok(Box::new(MotorHaptic)))
        .with_monitor(Box::new(BoardMonitor::new(&BOARD_STATS)));
    let mut ui = match PageUi::load(ui_config, Canvas::new(Sh1106Panel::new(SignalSink)), caps) {
        Ok(ui) => ui,
        Err(e) => defmt::panic!("UI load failed: {}", defmt::Display2Format(&e)),
    };
    ui.add_page(buttons_page());
    // Entries are already forwarded to defmt
    while ui.log_mut().pop().is_some() {}
    info!("Main loop starting");

    let granule = Duration::from_millis(u64::from(GRANULE_MS));
    loop {
        let loop_start = Instant::now();
        let cycles_start = cpu_cycles::read();

        let levels = ButtonLevels {
            a: btn_a.is_low(),
            b: btn_b.is_low(),
            x: btn_x.is_low(),
            y: btn_y.is_low(),
        };
        for action in pad.process(levels, loop_start.as_millis(), ui.power_state()) {
            ui.control(action);
        }

        ui.poll();
        while ui.log_mut().pop().is_some() {}

        let busy_cycles = cpu_cycles::elapsed(cycles_start, cpu_cycles::read());
        BOARD_STATS.record_heap(HEAP.used(), HEAP_SIZE);
        BOARD_STATS.record_uptime(loop_start.as_millis());

        let work = loop_start.elapsed();
        if work < granule {
            Timer::after(granule - work).await;
        }
        BOARD_STATS.record_loop(busy_cycles, loop_start.elapsed().as_micros() as u32);
    }
}
