//! Page carousel: an append-only page list with a wrapping active index.
//!
//! Pages are never reordered or removed. Switching pages clears the cached
//! press output so stale output never leaks across pages.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::capabilities::{Shell, SystemMonitor};
use crate::display::Display;
use crate::error::CallbackError;
use crate::frame::DrawFn;
use crate::geometry::Area;
use crate::pages::{self, CommandPage};

/// Render callback of a user page.
pub type PageFn = Box<dyn FnMut(&mut dyn Display, Area) -> Result<PageOutput, CallbackError>>;

/// What a page returns after drawing.
pub enum PageOutput {
    /// Nothing interactive.
    Static,
    /// Callback run when the user presses the button on this page.
    Press(DrawFn),
}

/// A carousel page.
pub enum Page {
    /// Device name, address and version.
    System,
    /// Intercon host cache.
    Intercon,
    /// Blank page.
    Empty,
    /// Shell command page created by `genpage`.
    Command(CommandPage),
    /// User render callback.
    Render(PageFn),
}

impl Page {
    /// Wrap a render callback.
    pub fn render<F>(f: F) -> Self
    where
        F: FnMut(&mut dyn Display, Area) -> Result<PageOutput, CallbackError> + 'static,
    {
        Self::Render(Box::new(f))
    }

    /// Default page list registered at load.
    pub fn defaults() -> Vec<Page> { alloc::vec![Page::System, Page::Intercon, Page::Empty] }
}

/// Press behaviour registered by the active page on its last redraw.
enum PressAction {
    Callback(DrawFn),
    /// Execute the active command page.
    Command,
}

/// Capabilities pages may read while drawing.
pub struct PageEnv<'a> {
    pub monitor: Option<&'a dyn SystemMonitor>,
    pub shell: &'a mut Option<Box<dyn Shell>>,
}

/// Carousel state.
#[derive(Default)]
pub struct Carousel {
    pages: Vec<Page>,
    index: usize,
    press_output: String,
    press: Option<PressAction>,
}

impl Carousel {
    pub fn new() -> Self { Self::default() }

    pub fn add_page(
        &mut self,
        page: Page,
    ) {
        self.pages.push(page);
    }

    pub fn add_pages(
        &mut self,
        pages: impl IntoIterator<Item = Page>,
    ) {
        self.pages.extend(pages);
    }

    #[inline]
    pub fn len(&self) -> usize { self.pages.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.pages.is_empty() }

    #[inline]
    pub const fn active_index(&self) -> usize { self.index }

    /// Cached output of the last press on the active page.
    pub fn press_output(&self) -> &str { &self.press_output }

    #[inline]
    pub const fn has_press(&self) -> bool { self.press.is_some() }

    /// Jump to `index` if it exists.
    pub fn set_index(
        &mut self,
        index: usize,
    ) {
        if index < self.pages.len() {
            self.index = index;
            self.leave_page();
        }
    }

    /// Advance with wraparound. No-op on an empty carousel.
    pub fn next(&mut self) -> usize {
        if !self.pages.is_empty() {
            self.index = (self.index + 1) % self.pages.len();
            self.leave_page();
        }
        self.index
    }

    /// Step back with wraparound. No-op on an empty carousel.
    pub fn previous(&mut self) -> usize {
        if !self.pages.is_empty() {
            self.index = (self.index + self.pages.len() - 1) % self.pages.len();
            self.leave_page();
        }
        self.index
    }

    fn leave_page(&mut self) {
        self.press_output.clear();
        self.press = None;
    }

    /// Draw the active page into `area` and record its press action.
    ///
    /// A page error is drawn as text in the area and returned for logging.
    pub fn render(
        &mut self,
        display: &mut dyn Display,
        area: Area,
        env: &mut PageEnv<'_>,
    ) -> Result<(), CallbackError> {
        let Some(page) = self.pages.get_mut(self.index) else {
            return Ok(());
        };
        self.press = None;
        match page {
            Page::System => pages::draw_system(display, area, env.monitor),
            Page::Intercon => pages::draw_intercon(display, area, env.monitor),
            Page::Empty => {}
            Page::Command(cmd) => {
                if cmd.render(display, area, env.shell, &mut self.press_output) {
                    self.press = Some(PressAction::Command);
                }
            }
            Page::Render(f) => match f(display, area) {
                Ok(PageOutput::Static) => {}
                Ok(PageOutput::Press(press)) => self.press = Some(PressAction::Callback(press)),
                Err(err) => {
                    display.text(err.message(), area.x, area.y);
                    return Err(err);
                }
            },
        }
        Ok(())
    }

    /// Run the press action of the active page. Returns `Ok(false)` when the
    /// page registered none.
    pub fn press(
        &mut self,
        display: &mut dyn Display,
        area: Area,
        env: &mut PageEnv<'_>,
    ) -> Result<bool, CallbackError> {
        match &mut self.press {
            None => Ok(false),
            Some(PressAction::Callback(f)) => f(display, area).map(|()| true),
            Some(PressAction::Command) => {
                if let Some(Page::Command(cmd)) = self.pages.get_mut(self.index) {
                    cmd.execute(display, area.x, area.y, env.shell, &mut self.press_output);
                }
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use proptest::prelude::*;

    use super::*;
    use crate::testing::{FakeShell, RecordingDisplay};

    fn carousel(n: usize) -> Carousel {
        let mut c = Carousel::new();
        c.add_pages((0..n).map(|_| Page::Empty));
        c
    }

    fn area() -> Area { Area::new(1, 11, 126, 46) }

    #[test]
    fn test_next_wraps() {
        let mut c = carousel(3);
        c.set_index(2);
        assert_eq!(c.next(), 0);
        assert_eq!(c.previous(), 2);
    }

    #[test]
    fn test_empty_carousel_stays_at_zero() {
        let mut c = Carousel::new();
        assert_eq!(c.next(), 0);
        assert_eq!(c.previous(), 0);
        let mut display = RecordingDisplay::new();
        let mut shell = None;
        let mut env = PageEnv {
            monitor: None,
            shell: &mut shell,
        };
        assert!(c.render(&mut display, area(), &mut env).is_ok());
        assert!(display.ops().is_empty());
    }

    #[test]
    fn test_page_error_drawn_as_text() {
        let mut c = Carousel::new();
        c.add_page(Page::render(|_, _| Err(CallbackError::new("boom"))));
        let mut display = RecordingDisplay::new();
        let mut shell = None;
        let mut env = PageEnv {
            monitor: None,
            shell: &mut shell,
        };
        let err = c.render(&mut display, area(), &mut env).unwrap_err();
        assert_eq!(err.message(), "boom");
        assert_eq!(display.texts(), ["boom"]);
    }

    #[test]
    fn test_press_callback_registered_by_page() {
        let pressed = Rc::new(Cell::new(0));
        let counter = pressed.clone();
        let mut c = Carousel::new();
        c.add_page(Page::render(move |_, _| {
            let counter = counter.clone();
            Ok(PageOutput::Press(Box::new(move |_, _| {
                counter.set(counter.get() + 1);
                Ok(())
            })))
        }));
        c.add_page(Page::Empty);

        let mut display = RecordingDisplay::new();
        let mut shell = None;
        let mut env = PageEnv {
            monitor: None,
            shell: &mut shell,
        };
        assert_eq!(c.press(&mut display, area(), &mut env), Ok(false));
        c.render(&mut display, area(), &mut env).unwrap();
        assert_eq!(c.press(&mut display, area(), &mut env), Ok(true));
        assert_eq!(pressed.get(), 1);

        // Switching pages drops the press action
        c.next();
        assert_eq!(c.press(&mut display, area(), &mut env), Ok(false));
    }

    #[test]
    fn test_switch_clears_press_output() {
        let mut c = Carousel::new();
        c.add_page(Page::Command(CommandPage::new("system info", false).unwrap()));
        c.add_page(Page::Empty);
        let mut display = RecordingDisplay::new();
        let mut shell: Option<Box<dyn Shell>> = Some(Box::new(FakeShell::default()));
        let mut env = PageEnv {
            monitor: None,
            shell: &mut shell,
        };
        c.render(&mut display, area(), &mut env).unwrap();
        assert_eq!(c.press(&mut display, area(), &mut env), Ok(true));
        assert_eq!(c.press_output(), "out:system info");
        c.next();
        assert_eq!(c.press_output(), "");
    }

    proptest! {
        #[test]
        fn wraparound_is_modular(n in 1usize..20, start in 0usize..20, steps in 0usize..50) {
            let mut c = carousel(n);
            c.set_index(start % n);
            let begin = c.active_index();
            for _ in 0..steps {
                c.next();
            }
            prop_assert_eq!(c.active_index(), (begin + steps) % n);
            for _ in 0..steps {
                c.previous();
            }
            prop_assert_eq!(c.active_index(), begin);
        }
    }
}
