//! Todo domain model and time-range violation taxonomy.
//!
//! # Responsibility
//! - Describe one schedulable slice of work against exactly one Task.
//! - Name every time-range rule a Todo can break.
//!
//! # Invariants
//! - `task_id` always references the owning Task.
//! - When `event_id` is unset the Todo belongs to its Task's Event.
//! - Planned and actual spans must lie inside the Task's planned window; this is
//!   checked by `TodoService`, not by storage.

use crate::model::event::EventId;
use crate::model::span::{EpochMs, TimeSpan};
use crate::model::status::Status;
use crate::model::task::{Task, TaskId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for todos.
pub type TodoId = Uuid;

/// Concrete, schedulable unit of work for one Task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub task_id: TaskId,
    /// Overrides the Task's Event, e.g. for a one-off location change.
    pub event_id: Option<EventId>,
    pub planned_time: TimeSpan,
    /// When execution actually happened, if it did.
    pub actual_time: TimeSpan,
    pub status: Status,
    pub completed_at: Option<EpochMs>,
}

impl Todo {
    /// Creates a pending todo for `task_id` with unset spans.
    pub fn new(task_id: TaskId) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            event_id: None,
            planned_time: TimeSpan::UNSET,
            actual_time: TimeSpan::UNSET,
            status: Status::Pending,
            completed_at: None,
        }
    }

    /// Returns this todo with the given planned span.
    pub fn planned(mut self, planned_time: TimeSpan) -> Self {
        self.planned_time = planned_time;
        self
    }

    /// Event this todo belongs to, falling back to the owning task's event.
    pub fn effective_event_id(&self, task: &Task) -> EventId {
        self.event_id.unwrap_or(task.event_id)
    }
}

/// Which of a Todo's spans a rule was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Planned,
    Actual,
}

impl Display for SpanKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planned => write!(f, "planned"),
            Self::Actual => write!(f, "actual"),
        }
    }
}

/// A broken time-range rule on a Todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRangeViolation {
    /// Span start lies outside the Task's planned window.
    StartOutsideTask {
        span: SpanKind,
        instant: EpochMs,
        window: (EpochMs, EpochMs),
    },
    /// Span end lies outside the Task's planned window.
    EndOutsideTask {
        span: SpanKind,
        instant: EpochMs,
        window: (EpochMs, EpochMs),
    },
    /// Span end precedes span start.
    EndBeforeStart {
        span: SpanKind,
        start: EpochMs,
        end: EpochMs,
    },
}

impl TimeRangeViolation {
    pub fn span(&self) -> SpanKind {
        match self {
            Self::StartOutsideTask { span, .. }
            | Self::EndOutsideTask { span, .. }
            | Self::EndBeforeStart { span, .. } => *span,
        }
    }

    /// Stable machine-readable code for logs.
    pub fn code(&self) -> &'static str {
        match (self, self.span()) {
            (Self::StartOutsideTask { .. }, SpanKind::Planned) => "planned_start_outside_task",
            (Self::EndOutsideTask { .. }, SpanKind::Planned) => "planned_end_outside_task",
            (Self::EndBeforeStart { .. }, SpanKind::Planned) => "planned_end_before_start",
            (Self::StartOutsideTask { .. }, SpanKind::Actual) => "actual_start_outside_task",
            (Self::EndOutsideTask { .. }, SpanKind::Actual) => "actual_end_outside_task",
            (Self::EndBeforeStart { .. }, SpanKind::Actual) => "actual_end_before_start",
        }
    }
}

impl Display for TimeRangeViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartOutsideTask {
                span,
                instant,
                window: (start, end),
            } => write!(
                f,
                "todo {span} start time {instant} must be within task time range [{start}, {end}]"
            ),
            Self::EndOutsideTask {
                span,
                instant,
                window: (start, end),
            } => write!(
                f,
                "todo {span} end time {instant} must be within task time range [{start}, {end}]"
            ),
            Self::EndBeforeStart { span, start, end } => write!(
                f,
                "todo {span} end time {end} cannot be before start time {start}"
            ),
        }
    }
}

impl Error for TimeRangeViolation {}
