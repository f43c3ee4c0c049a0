//! Built-in carousel pages and command pages.
//!
//! Default pages: system info, intercon host cache and an empty page.
//! Command pages are created at runtime by `genpage` and run a command
//! through the [`Shell`] capability, either on every redraw or on press.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::fmt::Write;

use heapless::String as HString;

use crate::capabilities::{Host, Shell, SystemMonitor};
use crate::config::POPUP_LINE_LIMIT;
use crate::display::Display;
use crate::error::UiError;
use crate::geometry::Area;
use crate::popup::write_lines;

/// Hosts listed on the intercon page.
const INTERCON_LINE_LIMIT: usize = 3;

/// Lines of the command header on a command page.
const COMMAND_LINE_LIMIT: usize = 2;

/// Vertical offset of command output below the command header.
const OUTPUT_Y_OFFSET: i32 = 20;

// =============================================================================
// Default Pages
// =============================================================================

/// Device name, address and version.
pub fn draw_system(
    display: &mut dyn Display,
    area: Area,
    monitor: Option<&dyn SystemMonitor>,
) {
    let Area { x, y, .. } = area;
    let name = monitor.and_then(|m| m.device_name());
    let address = monitor.and_then(|m| m.address());
    let version = monitor.and_then(|m| m.version());

    display.text(name.as_deref().unwrap_or("oledui"), x, y + 5);

    let mut line: HString<32> = HString::new();
    write!(line, "  {}", address.as_deref().unwrap_or("n/a")).ok();
    display.text(&line, x, y + 15);

    line.clear();
    write!(line, "  V: {}", version.as_deref().unwrap_or(env!("CARGO_PKG_VERSION"))).ok();
    display.text(&line, x, y + 25);
}

/// Shorten a host entry to `(value, key)` for one display line.
///
/// Dotted names keep the first label and the last two address octets;
/// MAC-style names keep the first group and the last two address groups.
pub fn short_host(host: &Host) -> (String, String) {
    let sep = if host.name.contains('.') { '.' } else { ':' };
    let key = host.name.split(sep).next().unwrap_or_default().to_string();
    let parts: alloc::vec::Vec<&str> = host.address.split(sep).collect();
    let tail = &parts[parts.len().saturating_sub(2)..];
    let mut value = String::new();
    for (i, part) in tail.iter().enumerate() {
        if i > 0 {
            value.push(sep);
        }
        value.push_str(part);
    }
    (value, key)
}

/// Cached peer hosts, at most three lines.
pub fn draw_intercon(
    display: &mut dyn Display,
    area: Area,
    monitor: Option<&dyn SystemMonitor>,
) {
    let Area { x, y, .. } = area;
    let line_start = y + 5;
    display.text("InterCon cache", x, line_start);

    let hosts = monitor.map(|m| m.hosts()).unwrap_or_default();
    if hosts.is_empty() {
        display.text("Empty", x + 40, line_start + 20);
        return;
    }
    for (i, host) in hosts.iter().take(INTERCON_LINE_LIMIT).enumerate() {
        let (value, key) = short_host(host);
        let mut line: HString<32> = HString::new();
        write!(line, " {value} {key}").ok();
        display.text(&line, x, line_start + 10 * (i as i32 + 1));
    }
}

// =============================================================================
// Command Pages
// =============================================================================

/// Page running a shell command.
pub struct CommandPage {
    cmd: String,
    run: bool,
    task_tag: Option<String>,
}

impl CommandPage {
    /// `run == true` executes on every redraw, otherwise on press.
    pub fn new(
        cmd: &str,
        run: bool,
    ) -> Result<Self, UiError> {
        let cmd = cmd.trim();
        if cmd.is_empty() {
            return Err(UiError::EmptyCommand);
        }
        Ok(Self {
            cmd: cmd.to_string(),
            run,
            task_tag: None,
        })
    }

    #[inline]
    pub fn command(&self) -> &str { &self.cmd }

    #[inline]
    pub const fn auto_run(&self) -> bool { self.run }

    /// Commands whose last token carries `>>` or `&` run in the background.
    pub fn is_background(&self) -> bool {
        self.cmd
            .split_whitespace()
            .last()
            .is_some_and(|last| last.contains(">>") || last.contains('&'))
    }

    /// Tag of the running background task, if any.
    pub fn task_tag(&self) -> Option<&str> { self.task_tag.as_deref() }

    /// Draw the page. Returns true when the page wants a press action.
    pub fn render(
        &mut self,
        display: &mut dyn Display,
        area: Area,
        shell: &mut Option<Box<dyn Shell>>,
        output: &mut String,
    ) -> bool {
        let x = area.x + 2;
        let y = area.y + 4;
        write_lines(display, &self.cmd, x, y, COMMAND_LINE_LIMIT);
        self.refresh_output(shell, output);

        if self.run {
            self.execute(display, x, y, shell, output);
            return false;
        }
        write_lines(display, output, x, y + OUTPUT_Y_OFFSET, POPUP_LINE_LIMIT);
        if output.is_empty() {
            display.text("press", x + area.w as i32 / 2 - 20, y + 30);
        }
        true
    }

    /// Pull buffered output of a background task, forgetting the tag once
    /// the task is done.
    fn refresh_output(
        &mut self,
        shell: &mut Option<Box<dyn Shell>>,
        output: &mut String,
    ) {
        let (Some(tag), Some(shell)) = (self.task_tag.as_deref(), shell.as_mut()) else {
            return;
        };
        let buffer: String = shell.output(tag).unwrap_or_default().chars().filter(|c| *c != ' ').collect();
        if !buffer.is_empty() {
            *output = buffer;
            if !shell.is_busy(tag) {
                self.task_tag = None;
            }
        }
    }

    /// Run the command and draw its output below `(x, y)`.
    pub fn execute(
        &mut self,
        display: &mut dyn Display,
        x: i32,
        y: i32,
        shell: &mut Option<Box<dyn Shell>>,
        output: &mut String,
    ) {
        match shell.as_mut() {
            None => *output = "no shell".to_string(),
            Some(shell) if self.is_background() => {
                if self.task_tag.is_none() {
                    match shell.spawn(&self.cmd) {
                        Ok(tag) => {
                            let buffer: String =
                                shell.output(&tag).unwrap_or_default().chars().filter(|c| *c != ' ').collect();
                            if !buffer.is_empty() {
                                *output = buffer;
                            }
                            self.task_tag = Some(tag);
                        }
                        Err(err) => *output = err.to_string(),
                    }
                }
            }
            Some(shell) => {
                *output = match shell.exec(&self.cmd) {
                    Ok(out) => out,
                    Err(err) => err.to_string(),
                };
            }
        }
        write_lines(display, output, x, y + OUTPUT_Y_OFFSET, POPUP_LINE_LIMIT);
    }
}
