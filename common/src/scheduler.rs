//! Cooperative run-loop for periodic UI tasks.
//!
//! Each task has a tag, a period and the next due time. The platform calls
//! `PageUi::poll` once per [`GRANULE_MS`]; every due task runs to completion
//! and is rescheduled one period later. Nothing preempts a task, so the
//! display and the frame registry are only ever touched by one task at a
//! time.
//!
//! At most one task exists per tag: spawning an existing tag replaces the
//! old task, which never runs again.

use alloc::vec::Vec;
use core::fmt::Write;

use heapless::String;

use crate::config::GRANULE_MS;
use crate::error::UiError;
use crate::frame::FrameId;

/// Maximum task tag length (`oledui.<frame tag>`).
pub const TAG_LEN: usize = 24;

/// Maximum task output length.
pub const OUTPUT_LEN: usize = 32;

/// Task tag prefix shared by all UI tasks.
pub const TAG_PREFIX: &str = "oledui.";

pub type TaskTag = String<TAG_LEN>;

/// Unique id of a spawned task. Never reused, so a replaced task is never
/// confused with its successor.
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskId(u32);

/// What a task does when it runs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskKind {
    /// Periodic redraw of a registered frame.
    Frame(FrameId),
    /// Idle animation tick.
    ScreenSaver,
}

/// Task management operations exposed through `PageUi::query`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskQuery {
    Show,
    IsBusy,
    Kill,
}

/// Answer to a [`TaskQuery`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum QueryReply {
    Output(String<OUTPUT_LEN>),
    Busy(bool),
    Killed(bool),
    NotFound,
}

#[derive(Debug)]
struct Task {
    id: TaskId,
    tag: TaskTag,
    kind: TaskKind,
    period_ms: u32,
    next_due_ms: u64,
    runs: u32,
    output: String<OUTPUT_LEN>,
}

/// Build the full task tag for a frame or component tag.
pub fn task_tag(tag: &str) -> Result<TaskTag, UiError> {
    let mut full = TaskTag::new();
    write!(full, "{TAG_PREFIX}{tag}").map_err(|_| UiError::TagTooLong)?;
    Ok(full)
}

/// Clamp a period to at least one granule.
#[inline]
pub fn clamp_period(period_ms: u32) -> u32 { period_ms.max(GRANULE_MS) }

/// Task table.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
    next_id: u32,
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
        }
    }

    /// Start a task, replacing any task with the same tag. The first run is
    /// due immediately.
    pub fn spawn(
        &mut self,
        tag: &str,
        kind: TaskKind,
        period_ms: u32,
        now_ms: u64,
    ) -> Result<TaskId, UiError> {
        let full = task_tag(tag)?;
        self.tasks.retain(|t| t.tag != full);
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.tasks.push(Task {
            id,
            tag: full,
            kind,
            period_ms: clamp_period(period_ms),
            next_due_ms: now_ms,
            runs: 0,
            output: String::new(),
        });
        Ok(id)
    }

    /// Stop a task by its full tag. Returns whether one was running.
    pub fn kill(
        &mut self,
        full_tag: &str,
    ) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.tag.as_str() != full_tag);
        before != self.tasks.len()
    }

    /// Stop every task of the given kind.
    pub fn kill_kind(
        &mut self,
        kind: TaskKind,
    ) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.kind != kind);
        before != self.tasks.len()
    }

    pub fn is_busy(
        &self,
        full_tag: &str,
    ) -> bool {
        self.tasks.iter().any(|t| t.tag.as_str() == full_tag)
    }

    pub fn has_kind(
        &self,
        kind: TaskKind,
    ) -> bool {
        self.tasks.iter().any(|t| t.kind == kind)
    }

    /// Tasks due at `now_ms`, plus tasks for which `expedite` answers true
    /// (fast refresh), in spawn order.
    pub fn due(
        &self,
        now_ms: u64,
        expedite: impl Fn(TaskKind) -> bool,
    ) -> Vec<(TaskId, TaskKind)> {
        self.tasks
            .iter()
            .filter(|t| t.next_due_ms <= now_ms || expedite(t.kind))
            .map(|t| (t.id, t.kind))
            .collect()
    }

    /// True while the task has not been killed or replaced.
    pub fn is_alive(
        &self,
        id: TaskId,
    ) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Record a finished run and schedule the next one a period later.
    pub fn complete(
        &mut self,
        id: TaskId,
        now_ms: u64,
    ) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.runs = task.runs.wrapping_add(1);
            task.next_due_ms = now_ms + u64::from(task.period_ms);
        }
    }

    /// Replace the output line of a task.
    pub fn set_output(
        &mut self,
        id: TaskId,
        args: core::fmt::Arguments<'_>,
    ) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.output.clear();
            task.output.write_fmt(args).ok();
        }
    }

    pub fn runs(
        &self,
        full_tag: &str,
    ) -> Option<u32> {
        self.tasks.iter().find(|t| t.tag.as_str() == full_tag).map(|t| t.runs)
    }

    pub fn period_ms(
        &self,
        full_tag: &str,
    ) -> Option<u32> {
        self.tasks.iter().find(|t| t.tag.as_str() == full_tag).map(|t| t.period_ms)
    }

    /// Show / is-busy / kill a task by its full tag.
    pub fn query(
        &mut self,
        full_tag: &str,
        op: TaskQuery,
    ) -> QueryReply {
        match op {
            TaskQuery::Show => self
                .tasks
                .iter()
                .find(|t| t.tag.as_str() == full_tag)
                .map_or(QueryReply::NotFound, |t| QueryReply::Output(t.output.clone())),
            TaskQuery::IsBusy => QueryReply::Busy(self.is_busy(full_tag)),
            TaskQuery::Kill => QueryReply::Killed(self.kill(full_tag)),
        }
    }

    /// Full tags of all running tasks, in spawn order.
    pub fn tags(&self) -> impl Iterator<Item = &str> { self.tasks.iter().map(|t| t.tag.as_str()) }

    #[inline]
    pub fn len(&self) -> usize { self.tasks.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.tasks.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(i: usize) -> TaskKind { TaskKind::Frame(FrameId::from_index(i)) }

    #[test]
    fn test_spawn_due_immediately() {
        let mut s = Scheduler::new();
        let id = s.spawn("time", frame(0), 1000, 500).unwrap();
        assert_eq!(s.due(500, |_| false), [(id, frame(0))]);
        s.complete(id, 500);
        assert!(s.due(1499, |_| false).is_empty());
        assert_eq!(s.due(1500, |_| false).len(), 1);
    }

    #[test]
    fn test_spawn_same_tag_replaces() {
        let mut s = Scheduler::new();
        let old = s.spawn("page", frame(0), 900, 0).unwrap();
        let new = s.spawn("page", frame(0), 300, 0).unwrap();
        assert_eq!(s.len(), 1);
        assert!(!s.is_alive(old));
        assert!(s.is_alive(new));
        assert_eq!(s.period_ms("oledui.page"), Some(300));
    }

    #[test]
    fn test_period_clamped_to_granule() {
        let mut s = Scheduler::new();
        s.spawn("fast", frame(0), 5, 0).unwrap();
        assert_eq!(s.period_ms("oledui.fast"), Some(GRANULE_MS));
    }

    #[test]
    fn test_expedite_ignores_due_time() {
        let mut s = Scheduler::new();
        let id = s.spawn("page", frame(1), 900, 0).unwrap();
        s.complete(id, 0);
        assert!(s.due(50, |_| false).is_empty());
        assert_eq!(s.due(50, |k| k == frame(1)).len(), 1);
    }

    #[test]
    fn test_query_ops() {
        let mut s = Scheduler::new();
        let id = s.spawn("anim", TaskKind::ScreenSaver, 100, 0).unwrap();
        s.set_output(id, format_args!("GameOfLife: {}", 7));
        assert_eq!(
            s.query("oledui.anim", TaskQuery::Show),
            QueryReply::Output(String::try_from("GameOfLife: 7").unwrap())
        );
        assert_eq!(s.query("oledui.anim", TaskQuery::IsBusy), QueryReply::Busy(true));
        assert_eq!(s.query("oledui.anim", TaskQuery::Kill), QueryReply::Killed(true));
        assert_eq!(s.query("oledui.anim", TaskQuery::Show), QueryReply::NotFound);
        assert_eq!(s.query("oledui.anim", TaskQuery::Kill), QueryReply::Killed(false));
    }

    #[test]
    fn test_tag_too_long() {
        let mut s = Scheduler::new();
        let err = s.spawn("a-very-long-frame-tag-name", frame(0), 100, 0);
        assert_eq!(err, Err(UiError::TagTooLong));
    }
}
