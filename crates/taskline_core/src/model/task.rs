//! Task domain model.
//!
//! # Responsibility
//! - Describe the concrete execution plan of one Event.
//!
//! # Invariants
//! - `event_id` always references the owning Event.
//! - `parent_task_id` and `pre_task_ids` are stored opaquely: existence and
//!   acyclicity are not checked.
//! - `planned_time` is not cross-checked against `allowed_time`.

use crate::model::event::EventId;
use crate::model::span::{now_epoch_ms, EpochMs, TimeSpan};
use crate::model::status::Status;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for tasks.
pub type TaskId = Uuid;

/// Execution plan for an Event within an allowed time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub event_id: EventId,
    /// Optional parent in the task tree. Deleting the parent leaves this task alone.
    pub parent_task_id: Option<TaskId>,
    /// Prerequisite task IDs, in caller order.
    pub pre_task_ids: Vec<TaskId>,
    pub description: String,
    /// Outer bound available to this task.
    pub allowed_time: TimeSpan,
    /// Committed execution window. Todos must fall inside it.
    pub planned_time: TimeSpan,
    pub status: Status,
    pub created_at: EpochMs,
}

impl Task {
    /// Creates a pending task for `event_id` with unset windows.
    pub fn new(event_id: EventId, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            parent_task_id: None,
            pre_task_ids: Vec::new(),
            description: description.into(),
            allowed_time: TimeSpan::UNSET,
            planned_time: TimeSpan::UNSET,
            status: Status::Pending,
            created_at: now_epoch_ms(),
        }
    }

    /// Returns this task with the given planned window.
    pub fn planned(mut self, planned_time: TimeSpan) -> Self {
        self.planned_time = planned_time;
        self
    }
}
