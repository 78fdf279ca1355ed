//! Core domain logic for Taskline.
//! This crate owns the Event -> Task -> Todo invariants: todo time-range
//! containment and atomic cascade deletion. It also holds the sign resource
//! and user accounts.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, CoreLogger};
pub use model::event::{Event, EventId};
pub use model::sign::{Sign, SignId};
pub use model::span::{now_epoch_ms, EpochMs, TimeSpan};
pub use model::status::Status;
pub use model::task::{Task, TaskId};
pub use model::todo::{SpanKind, TimeRangeViolation, Todo, TodoId};
pub use model::user::{Role, User, UserId};
pub use repo::event_repo::EventRepository;
pub use repo::sign_repo::{SignRepository, SqliteSignRepository};
pub use repo::task_repo::TaskRepository;
pub use repo::todo_repo::TodoRepository;
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RecordKind, RepoError, RepoResult, SqlitePlannerRepository, Transactional};
pub use service::event_service::{EventDeletion, EventService, EventServiceError};
pub use service::sign_service::SignService;
pub use service::task_service::{TaskService, TaskServiceError};
pub use service::todo_service::{
    check_time_ranges, DetailsStage, PlannedTodo, TodoService, TodoServiceError,
};
pub use service::user_service::{UserService, UserServiceError, UserUpdate};
pub use service::CascadeStage;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
