//! The page UI session.
//!
//! [`PageUi`] owns the display, the capabilities, every frame and the
//! scheduler. The platform loop calls [`PageUi::poll`] once per granule and
//! forwards input through [`PageUi::control`] and [`PageUi::pointer`]. All
//! state is mutated from that single loop, so no locking is needed.

use alloc::boxed::Box;
use alloc::vec::Vec;

use heapless::String;

use crate::capabilities::{Animation, Capabilities, Clock, Haptic, Shell, SystemMonitor};
use crate::carousel::{Carousel, Page, PageEnv};
use crate::config::{
    APP_PERIOD_MS, BOOT_TEXT, BOOT_TEXT_POS, CLOCK_PERIOD_MS, CPU_MEM_PERIOD_MS, MESSAGE_LEN, PAGE_SWITCH_DEBOUNCE_MS,
    POPUP_LINE_LIMIT, SCREENSAVER_PERIOD_MS, SIGNAL_PERIOD_MS, UiConfig,
};
use crate::control::{Action, PointerEvent, PowerState};
use crate::cursor::{Cursor, Transition};
use crate::display::Display;
use crate::error::{ConfigError, UiError};
use crate::frame::{Content, FOOTER_TAG, Frame, FrameId, FrameRegistry, Hover};
use crate::geometry::Rect;
use crate::header::{self, CLOCK_RECT, COUNTDOWN_RECT, CPU_MEM_RECT, Countdown, SIGNAL_RECT};
use crate::log::{LogBuffer, log_debug, log_error, log_info, log_warn};
use crate::pagebar;
use crate::pages::CommandPage;
use crate::popup::{Popup, PopupContent};
use crate::scheduler::{QueryReply, Scheduler, TAG_PREFIX, TaskId, TaskKind, TaskQuery, task_tag};
use crate::screensaver::{ScreenSaver, Tick};

/// Task tag of the carousel frame.
pub const APP_TASK: &str = "page";

/// Task tag of the screensaver.
pub const SCREENSAVER_TASK: &str = "anim";

/// A running page UI.
pub struct PageUi<D: Display> {
    config: UiConfig,
    /// Last addressable column.
    width: u32,
    /// Last addressable row.
    height: u32,
    display: D,
    clock: Box<dyn Clock>,
    haptic: Option<Box<dyn Haptic>>,
    pointer_enabled: bool,
    animation: Option<Box<dyn Animation>>,
    monitor: Option<Box<dyn SystemMonitor>>,
    shell: Option<Box<dyn Shell>>,
    frames: FrameRegistry,
    scheduler: Scheduler,
    cursor: Cursor,
    carousel: Carousel,
    popup: Popup,
    screensaver: ScreenSaver,
    countdown: Option<Countdown>,
    app: FrameId,
    footer: FrameId,
    last_page_switch: Option<u64>,
    hibernations: u32,
    debug: bool,
    log: LogBuffer,
}

impl<D: Display> PageUi<D> {
    // =========================================================================
    // Load
    // =========================================================================

    /// Build the UI: boot message, header widgets, carousel with the default
    /// pages, page bar, popup and screensaver. Every frame task is due on the
    /// first [`poll`](Self::poll).
    ///
    /// Failing haptic or pointer setup only disables that feature.
    pub fn load(
        config: UiConfig,
        mut display: D,
        caps: Capabilities,
    ) -> Result<Self, UiError> {
        let Capabilities {
            clock,
            haptic,
            pointer,
            animation,
            monitor,
            shell,
        } = caps;
        config.validate()?;
        let now = clock.now_ms();
        let mut log = LogBuffer::new();

        display.poweron();
        display.clean();
        display.text(BOOT_TEXT, BOOT_TEXT_POS.0, BOOT_TEXT_POS.1);
        display.show();

        let haptic = match haptic {
            Ok(h) => h.filter(|_| config.haptic),
            Err(err) => {
                log_warn!(log, now, "haptic off: {}", err);
                None
            }
        };
        let pointer_enabled = match pointer {
            Ok(()) => config.control.is_some(),
            Err(err) => {
                log_warn!(log, now, "pointer off: {}", err);
                false
            }
        };

        let width = config.width - 1;
        let height = config.height - 1;
        let countdown = config.poweroff_s.map(Countdown::new);

        let mut frames = FrameRegistry::new();
        let mut scheduler = Scheduler::new();
        let mut spawn_frame = |frames: &mut FrameRegistry, frame: Frame, period_ms: u32| -> Result<FrameId, UiError> {
            let id = frames.register(frame)?;
            if let Some(frame) = frames.get_mut(id) {
                let task = scheduler.spawn(frame.tag(), TaskKind::Frame(id), period_ms, now)?;
                frame.task = Some(task);
            }
            Ok(id)
        };

        spawn_frame(
            &mut frames,
            Frame::new("rssi", SIGNAL_RECT, Content::Signal)?.with_hover(Hover::Network),
            SIGNAL_PERIOD_MS,
        )?;
        if let Some(period) = config.countdown_period_ms() {
            spawn_frame(
                &mut frames,
                Frame::new("timer", COUNTDOWN_RECT, Content::Countdown)?.with_hover(Hover::Countdown),
                period,
            )?;
        }
        spawn_frame(
            &mut frames,
            Frame::new("time", CLOCK_RECT, Content::Clock)?.with_hover(Hover::Uptime),
            CLOCK_PERIOD_MS,
        )?;
        spawn_frame(
            &mut frames,
            Frame::new("cpu_mem", CPU_MEM_RECT, Content::CpuMem)?.with_hover(Hover::CpuMem),
            CPU_MEM_PERIOD_MS,
        )?;

        let app_rect = Rect::new(0, height as i32 - 53, width + 1, height - 15);
        let app = frames.register(Frame::new(APP_TASK, app_rect, Content::Carousel)?)?;
        let app_task = scheduler.spawn(APP_TASK, TaskKind::Frame(app), APP_PERIOD_MS, now)?;
        if let Some(frame) = frames.get_mut(app) {
            frame.task = Some(app_task);
        }

        // Redrawn on page switches only
        let footer_rect = Rect::new(0, height as i32 - 5, width + 1, 6);
        let footer = frames.register(Frame::new(FOOTER_TAG, footer_rect, Content::PageBar)?)?;

        let mut carousel = Carousel::new();
        carousel.add_pages(Page::defaults());
        carousel.set_index(config.start_page);

        log_info!(
            log,
            now,
            "load {}x{} {} frames={}",
            config.width,
            config.height,
            config.display.name(),
            frames.len()
        );

        Ok(Self {
            width,
            height,
            display,
            clock,
            haptic,
            pointer_enabled,
            animation,
            monitor,
            shell,
            frames,
            scheduler,
            cursor: Cursor::new(0, height as i32),
            carousel,
            popup: Popup::new(app_rect),
            screensaver: ScreenSaver::new(width, height),
            countdown,
            app,
            footer,
            last_page_switch: None,
            hibernations: 0,
            debug: false,
            log,
            config,
        })
    }

    #[inline]
    fn now(&self) -> u64 { self.clock.now_ms() }

    // =========================================================================
    // Run Loop
    // =========================================================================

    /// Run every task due now, plus frames waiting for a fast refresh.
    pub fn poll(&mut self) {
        let now = self.now();
        let frames = &self.frames;
        let due = self.scheduler.due(now, |kind| match kind {
            TaskKind::Frame(id) => frames.get(id).is_some_and(Frame::fast_refresh_requested),
            TaskKind::ScreenSaver => false,
        });
        for (task, kind) in due {
            // An earlier task in this round may have replaced or killed it
            if !self.scheduler.is_alive(task) {
                continue;
            }
            match kind {
                TaskKind::Frame(id) => self.run_frame_task(task, id),
                TaskKind::ScreenSaver => self.run_screensaver_task(task),
            }
            self.scheduler.complete(task, now);
        }
    }

    fn run_frame_task(
        &mut self,
        task: TaskId,
        id: FrameId,
    ) {
        if let Some(frame) = self.frames.get_mut(id) {
            frame.fast_refresh = false;
        }
        if self.frames.is_paused(id) {
            self.scheduler.set_output(task, format_args!("paused"));
            return;
        }
        self.draw_frame(id);
        let redraws = self.frames.get(id).map_or(0, Frame::redraws);
        self.scheduler.set_output(task, format_args!("draws: {redraws}"));

        let ticks_countdown = self
            .frames
            .get(id)
            .is_some_and(|f| matches!(f.content, Content::Countdown));
        if ticks_countdown && self.countdown.as_mut().is_some_and(Countdown::tick) {
            let now = self.now();
            log_info!(self.log, now, "inactivity timeout");
            self.hibernate();
        }
    }

    fn run_screensaver_task(
        &mut self,
        task: TaskId,
    ) {
        if !self.screensaver.is_running() {
            self.scheduler.kill_kind(TaskKind::ScreenSaver);
            return;
        }
        match self.screensaver.tick(&mut self.display, self.animation.as_deref_mut()) {
            Tick::Drawn => {
                let generation = self.animation.as_ref().map_or(0, |a| a.generation());
                self.scheduler.set_output(
                    task,
                    format_args!("ticks: {} gen: {}", self.screensaver.ticks(), generation),
                );
            }
            Tick::Stopped => {
                self.scheduler.kill_kind(TaskKind::ScreenSaver);
                let now = self.now();
                log_debug!(self.log, now, "screensaver stopped");
            }
        }
    }

    /// Clean the frame, draw its content into the inset area, then redraw the
    /// cursor and publish. A failing callback is logged and the frame stays
    /// scheduled.
    fn draw_frame(
        &mut self,
        id: FrameId,
    ) {
        let now = self.now();
        let debug = self.debug;
        let Some(frame) = self.frames.get_mut(id) else {
            return;
        };
        let display: &mut dyn Display = &mut self.display;
        frame.rect.clean(display, debug);
        let area = frame.rect.inset();
        let monitor = self.monitor.as_deref();
        let result = match &mut frame.content {
            Content::Clock => {
                header::draw_clock(display, area, monitor);
                Ok(())
            }
            Content::CpuMem => {
                header::draw_cpu_mem(display, area, monitor);
                Ok(())
            }
            Content::Signal => {
                header::draw_signal(display, area, monitor);
                Ok(())
            }
            Content::Countdown => {
                if let Some(countdown) = &self.countdown {
                    header::draw_countdown(display, area, countdown);
                }
                Ok(())
            }
            Content::Carousel => {
                let mut env = PageEnv {
                    monitor,
                    shell: &mut self.shell,
                };
                self.carousel.render(display, area, &mut env)
            }
            Content::PageBar => {
                pagebar::draw_page_bar(display, area, self.carousel.len(), self.carousel.active_index());
                if let Some(haptic) = self.haptic.as_deref_mut() {
                    haptic.tap();
                }
                Ok(())
            }
            Content::Custom(draw) => draw(&mut *display, area),
        };
        frame.count_redraw();
        if let Err(err) = result {
            log_error!(self.log, now, "{} draw: {}", frame.tag(), err);
        }
        self.cursor.draw(display);
        display.show();
    }

    // =========================================================================
    // Control
    // =========================================================================

    /// Apply an action as if the footer were selected.
    pub fn control(
        &mut self,
        action: Action,
    ) {
        self.control_with(Some(action), true);
    }

    /// Parse and apply a textual action (`next`, `prev`, `on`, `off`,
    /// `press`).
    pub fn control_str(
        &mut self,
        action: &str,
    ) -> Result<Action, ConfigError> {
        let action = action.parse::<Action>()?;
        self.control(action);
        Ok(action)
    }

    /// Every control input wakes the UI and restarts the countdown. Page
    /// switches need the footer selected (or `force`) and are debounced.
    pub fn control_with(
        &mut self,
        action: Option<Action>,
        force: bool,
    ) {
        self.wake();
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.reset();
        }
        self.cursor.draw(&mut self.display);
        let Some(action) = action else {
            return;
        };
        let now = self.now();
        match action {
            Action::Next | Action::Prev => {
                if !force && self.cursor.selected() != Some(self.footer) {
                    return;
                }
                if self
                    .last_page_switch
                    .is_some_and(|last| now.saturating_sub(last) < PAGE_SWITCH_DEBOUNCE_MS)
                {
                    log_debug!(self.log, now, "{} debounced", action.name());
                    return;
                }
                self.last_page_switch = Some(now);
                let index = if action == Action::Next {
                    self.carousel.next()
                } else {
                    self.carousel.previous()
                };
                log_debug!(self.log, now, "page {}/{}", index, self.carousel.len());
                self.frames.request_refresh(self.app);
                self.draw_frame(self.footer);
            }
            Action::Off => self.hibernate(),
            Action::On => {
                self.stop_screensaver();
                if self.frames.is_hibernating() {
                    self.resume_all();
                }
                self.display.poweron();
            }
            Action::Press => {
                if !self.cancel_popup() {
                    self.press();
                }
            }
        }
    }

    /// Handle a pointer event: move the cursor (Y grows upward on the
    /// device) and map horizontal moves and clicks onto actions. Ignored
    /// when the pointer is unavailable.
    pub fn pointer(
        &mut self,
        event: PointerEvent,
    ) {
        if !self.pointer_enabled {
            return;
        }
        let Some(pointer_action) = event.action else {
            return;
        };
        self.cursor(event.x, self.height as i32 - event.y);
        self.control_with(pointer_action.action(), false);
        self.display.show();
    }

    #[inline]
    pub const fn pointer_enabled(&self) -> bool { self.pointer_enabled }

    /// Run the press action of the active page into the carousel area.
    fn press(&mut self) {
        if !self.carousel.has_press() {
            return;
        }
        let now = self.now();
        let debug = self.debug;
        let Some(frame) = self.frames.get_mut(self.app) else {
            return;
        };
        let display: &mut dyn Display = &mut self.display;
        frame.rect.clean(display, debug);
        let mut env = PageEnv {
            monitor: self.monitor.as_deref(),
            shell: &mut self.shell,
        };
        if let Err(err) = self.carousel.press(display, frame.rect.inset(), &mut env) {
            display.text(err.message(), frame.rect.area.x, frame.rect.area.y);
            log_error!(self.log, now, "press: {}", err);
        }
        display.show();
    }

    /// Invoke the press callback of a custom frame. Returns false when the
    /// frame has none.
    pub fn press_frame(
        &mut self,
        id: FrameId,
    ) -> bool {
        let now = self.now();
        let debug = self.debug;
        let Some(frame) = self.frames.get_mut(id) else {
            return false;
        };
        let Some(press) = frame.press.as_mut() else {
            return false;
        };
        let display: &mut dyn Display = &mut self.display;
        frame.rect.clean(display, debug);
        if let Err(err) = press(&mut *display, frame.rect.inset()) {
            log_error!(self.log, now, "{} press: {}", frame.tag(), err);
        }
        display.show();
        true
    }

    // =========================================================================
    // Cursor and Popup
    // =========================================================================

    /// Move the cursor. Leaving the footer redraws it; entering a frame with
    /// hover details opens them in the popup, entering any other frame
    /// closes the popup.
    pub fn cursor(
        &mut self,
        x: i32,
        y: i32,
    ) {
        let transition = self.cursor.update(&mut self.display, &mut self.frames, x, y);
        if let Transition::Enter { from, to } = transition {
            if from == Some(self.footer) {
                self.draw_frame(self.footer);
            }
            if !self.hover(to) {
                self.cancel_popup();
            }
        }
        self.cursor.draw(&mut self.display);
    }

    fn hover(
        &mut self,
        id: FrameId,
    ) -> bool {
        if !self.frames.get(id).is_some_and(Frame::has_hover) {
            return false;
        }
        self.popup.activate(PopupContent::Hover(id));
        self.frames.set_paused(self.app, true);
        self.draw_popup();
        true
    }

    /// Show a text popup over the carousel. Wakes the UI first.
    pub fn popup(
        &mut self,
        msg: &str,
    ) {
        self.wake();
        let mut text: String<MESSAGE_LEN> = String::new();
        for c in msg.chars() {
            if text.push(c).is_err() {
                break;
            }
        }
        self.popup.activate(PopupContent::Text(text));
        self.frames.set_paused(self.app, true);
        self.draw_popup();
    }

    /// Close the popup and resume the carousel. Returns false when no popup
    /// was open.
    pub fn cancel_popup(&mut self) -> bool {
        if !self.popup.deactivate() {
            return false;
        }
        self.popup.clear(&mut self.display, self.debug);
        self.frames.set_paused(self.app, false);
        self.frames.request_refresh(self.app);
        self.display.show();
        true
    }

    #[inline]
    pub const fn popup_active(&self) -> bool { self.popup.is_active() }

    fn draw_popup(&mut self) {
        let Some(content) = self.popup.content().cloned() else {
            return;
        };
        let now = self.now();
        let display: &mut dyn Display = &mut self.display;
        self.popup.draw_chrome(display, self.debug);
        match content {
            PopupContent::Text(msg) => self.popup.draw_text(display, &msg, POPUP_LINE_LIMIT),
            PopupContent::Hover(id) => {
                let area = self.popup.content_area();
                let monitor = self.monitor.as_deref();
                if let Some(frame) = self.frames.get_mut(id) {
                    let result = match frame.hover.as_mut() {
                        Some(Hover::Uptime) => {
                            header::hover_uptime(display, area, monitor);
                            Ok(())
                        }
                        Some(Hover::CpuMem) => {
                            header::hover_cpu_mem(display, area, monitor);
                            Ok(())
                        }
                        Some(Hover::Network) => {
                            header::hover_network(display, area, monitor);
                            Ok(())
                        }
                        Some(Hover::Countdown) => {
                            if let Some(countdown) = &self.countdown {
                                header::hover_countdown(display, area, countdown);
                            }
                            Ok(())
                        }
                        Some(Hover::Custom(draw)) => draw(&mut *display, area),
                        None => Ok(()),
                    };
                    if let Err(err) = result {
                        log_error!(self.log, now, "{} hover: {}", frame.tag(), err);
                    }
                }
            }
        }
        display.show();
        self.cursor.draw(display);
    }

    // =========================================================================
    // Power
    // =========================================================================

    /// Pause every frame and start the screensaver. Without an animation
    /// the screensaver powers the display off on its first tick.
    fn hibernate(&mut self) {
        let now = self.now();
        self.frames.pause_all();
        self.screensaver.start();
        if let Err(err) = self
            .scheduler
            .spawn(SCREENSAVER_TASK, TaskKind::ScreenSaver, SCREENSAVER_PERIOD_MS, now)
        {
            log_warn!(self.log, now, "screensaver: {}", err);
        }
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.reset();
        }
        self.hibernations = self.hibernations.wrapping_add(1);
        log_info!(self.log, now, "hibernate");
    }

    fn stop_screensaver(&mut self) {
        self.screensaver.cancel(&mut self.display, self.animation.as_deref_mut());
        self.scheduler.kill_kind(TaskKind::ScreenSaver);
    }

    /// Pause every frame. Each frame keeps its own pause flag.
    pub fn pause_all(&mut self) { self.frames.pause_all(); }

    /// Lift hibernation and redraw every frame once, then the popup on top.
    pub fn resume_all(&mut self) {
        self.frames.resume_all();
        for id in self.frames.ids() {
            if !self.frames.is_paused(id) {
                self.draw_frame(id);
            }
        }
        if self.popup.is_active() {
            self.draw_popup();
        }
    }

    /// Leave hibernation: stop the screensaver, redraw, power on. The page
    /// bar redraw taps the haptic motor. No-op while active.
    pub fn wake(&mut self) {
        if !self.frames.is_hibernating() {
            return;
        }
        self.stop_screensaver();
        self.resume_all();
        self.display.poweron();
        let now = self.now();
        log_info!(self.log, now, "wake");
    }

    pub const fn power_state(&self) -> PowerState {
        if self.frames.is_hibernating() {
            PowerState::Hibernating
        } else {
            PowerState::Active
        }
    }

    /// Number of times the UI entered hibernation.
    #[inline]
    pub const fn hibernations(&self) -> u32 { self.hibernations }

    #[inline]
    pub const fn screensaver_running(&self) -> bool { self.screensaver.is_running() }

    pub fn countdown(&self) -> Option<&Countdown> { self.countdown.as_ref() }

    // =========================================================================
    // Pages
    // =========================================================================

    /// Append a page. Returns its index.
    pub fn add_page(
        &mut self,
        page: Page,
    ) -> usize {
        self.carousel.add_page(page);
        self.carousel.len() - 1
    }

    pub fn add_pages(
        &mut self,
        pages: Vec<Page>,
    ) {
        self.carousel.add_pages(pages);
    }

    /// Append a shell command page. With `run` the command executes on every
    /// redraw, otherwise on press.
    pub fn genpage(
        &mut self,
        cmd: &str,
        run: bool,
    ) -> Result<usize, UiError> {
        let page = CommandPage::new(cmd, run)?;
        let now = self.now();
        log_debug!(self.log, now, "genpage: {}", page.command());
        Ok(self.add_page(Page::Command(page)))
    }

    #[inline]
    pub const fn active_page(&self) -> usize { self.carousel.active_index() }

    #[inline]
    pub fn page_count(&self) -> usize { self.carousel.len() }

    pub fn carousel(&self) -> &Carousel { &self.carousel }

    // =========================================================================
    // Frames and Tasks
    // =========================================================================

    /// Register a custom frame and start its redraw task.
    pub fn add_frame(
        &mut self,
        frame: Frame,
        period_ms: u32,
    ) -> Result<FrameId, UiError> {
        let id = self.frames.register(frame)?;
        self.run_frame(id, period_ms)?;
        Ok(id)
    }

    /// (Re)start the redraw task of a frame under its own tag.
    pub fn run_frame(
        &mut self,
        id: FrameId,
        period_ms: u32,
    ) -> Result<TaskId, UiError> {
        let now = self.now();
        let Some(frame) = self.frames.get_mut(id) else {
            return Err(UiError::UnknownFrame);
        };
        let task = self.scheduler.spawn(frame.tag(), TaskKind::Frame(id), period_ms, now)?;
        frame.task = Some(task);
        Ok(task)
    }

    pub fn frame_id(
        &self,
        tag: &str,
    ) -> Option<FrameId> {
        self.frames.find(tag)
    }

    pub fn get_frame(
        &self,
        tag: &str,
    ) -> Option<&Frame> {
        self.frames.find(tag).and_then(|id| self.frames.get(id))
    }

    pub fn frames(&self) -> &FrameRegistry { &self.frames }

    /// Set a frame's own pause flag.
    pub fn set_frame_paused(
        &mut self,
        id: FrameId,
        paused: bool,
    ) {
        self.frames.set_paused(id, paused);
    }

    /// Redraw a frame on the next poll instead of waiting a full period.
    pub fn clb_refresh(
        &mut self,
        id: FrameId,
    ) {
        self.frames.request_refresh(id);
    }

    /// Show, probe or kill a task. Accepts bare frame tags or full
    /// `oledui.` tags.
    pub fn query(
        &mut self,
        tag: &str,
        op: TaskQuery,
    ) -> QueryReply {
        if tag.starts_with(TAG_PREFIX) {
            return self.scheduler.query(tag, op);
        }
        match task_tag(tag) {
            Ok(full) => self.scheduler.query(&full, op),
            Err(_) => QueryReply::NotFound,
        }
    }

    pub fn scheduler(&self) -> &Scheduler { &self.scheduler }

    // =========================================================================
    // Misc
    // =========================================================================

    /// Toggle frame outlines. `None` only reads the flag.
    pub fn debug(
        &mut self,
        state: Option<bool>,
    ) -> bool {
        if let Some(state) = state {
            self.debug = state;
            for id in self.frames.ids() {
                self.frames.request_refresh(id);
            }
        }
        self.debug
    }

    pub fn config(&self) -> &UiConfig { &self.config }

    /// Panel size in pixels.
    pub const fn size(&self) -> (u32, u32) { (self.width + 1, self.height + 1) }

    pub fn display(&self) -> &D { &self.display }

    pub fn display_mut(&mut self) -> &mut D { &mut self.display }

    pub fn log(&self) -> &LogBuffer { &self.log }

    pub fn log_mut(&mut self) -> &mut LogBuffer { &mut self.log }
}
