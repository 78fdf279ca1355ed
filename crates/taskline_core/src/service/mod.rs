//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Enforce Todo time-range rules and run cascades atomically.
//! - Keep CLI/transport layers decoupled from storage details.

use std::fmt::{Display, Formatter};

pub mod event_service;
pub mod sign_service;
pub mod task_service;
pub mod todo_service;
pub mod user_service;

/// Step of a cascade deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStage {
    /// Removing the todos owned by the parent.
    DeleteTodos,
    /// Removing the tasks owned by the parent event.
    DeleteTasks,
    /// Removing the task row itself.
    DeleteTask,
    /// Removing the event row itself.
    DeleteEvent,
}

impl Display for CascadeStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeleteTodos => write!(f, "failed to delete related todos"),
            Self::DeleteTasks => write!(f, "failed to delete related tasks"),
            Self::DeleteTask => write!(f, "failed to delete task"),
            Self::DeleteEvent => write!(f, "failed to delete event"),
        }
    }
}
