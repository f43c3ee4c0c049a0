//! Firmware library - host-testable modules of the Pico 2 OLED UI.
//!
//! The binary (`main.rs`) wires these modules to embassy tasks and the RP2350
//! peripherals.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p oledui-pico2 --lib --target x86_64-unknown-linux-gnu
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

// Input
pub mod button;
pub mod input;

// Display
pub mod sh1106;

// Profiling
pub mod cpu_cycles;
pub mod monitor;
