//! Todo use-case service.
//!
//! # Responsibility
//! - Validate Todo time ranges against the parent Task before every write.
//! - Provide the event + task + todo composite create.
//!
//! # Invariants
//! - Create checks the parent Task exists before any time logic runs.
//! - A rule is applied only when all of its inputs are present; otherwise it
//!   is skipped, never failed.
//! - Containment is inclusive; the first broken rule is reported.
//! - Overlapping Todos under one Task are allowed.

use crate::logging::CoreLogger;
use crate::model::event::{Event, EventId};
use crate::model::span::TimeSpan;
use crate::model::task::{Task, TaskId};
use crate::model::todo::{SpanKind, TimeRangeViolation, Todo, TodoId};
use crate::repo::event_repo::EventRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::todo_repo::TodoRepository;
use crate::repo::{RecordKind, RepoError, RepoResult, Transactional};
use std::error::Error;
use std::fmt::{Display, Formatter};

const LOG_TARGET: &str = "todo_service";

/// Step of `create_todo_with_details` that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsStage {
    CreateEvent,
    CreateTask,
    CreateTodo,
}

impl Display for DetailsStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateEvent => write!(f, "failed to create event"),
            Self::CreateTask => write!(f, "failed to create task"),
            Self::CreateTodo => write!(f, "failed to create todo"),
        }
    }
}

/// Errors from todo service operations.
#[derive(Debug)]
pub enum TodoServiceError {
    /// Referenced Task does not exist (checked before time validation).
    TaskNotFound(TaskId),
    /// Target todo does not exist.
    TodoNotFound(TodoId),
    /// Parent Task could not be loaded for validation.
    ParentTaskUnavailable { task_id: TaskId, source: RepoError },
    /// A time-range rule was broken.
    Validation(TimeRangeViolation),
    /// A step of the composite create failed; nothing was persisted.
    Stage {
        stage: DetailsStage,
        source: Box<TodoServiceError>,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "referenced task does not exist: {id}"),
            Self::TodoNotFound(id) => write!(f, "todo not found: {id}"),
            Self::ParentTaskUnavailable { task_id, source } => {
                write!(f, "failed to resolve parent task {task_id}: {source}")
            }
            Self::Validation(violation) => write!(f, "{violation}"),
            Self::Stage { stage, source } => write!(f, "{stage}: {source}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ParentTaskUnavailable { source, .. } => Some(source),
            Self::Validation(violation) => Some(violation),
            Self::Stage { source, .. } => Some(source.as_ref()),
            Self::Repo(err) => Some(err),
            Self::TaskNotFound(_) | Self::TodoNotFound(_) => None,
        }
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                record: RecordKind::Todo,
                id,
            } => Self::TodoNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<TimeRangeViolation> for TodoServiceError {
    fn from(value: TimeRangeViolation) -> Self {
        Self::Validation(value)
    }
}

/// Result of `create_todo_with_details`, with IDs linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTodo {
    pub event: Event,
    pub task: Task,
    pub todo: Todo,
}

/// Todo service facade over repository implementations.
pub struct TodoService<R>
where
    R: TodoRepository + TaskRepository + EventRepository + Transactional,
{
    repo: R,
    logger: CoreLogger,
}

impl<R> TodoService<R>
where
    R: TodoRepository + TaskRepository + EventRepository + Transactional,
{
    /// Creates a service that logs through the process-wide logger.
    pub fn new(repo: R) -> Self {
        Self::with_logger(repo, CoreLogger::global())
    }

    /// Creates a service that logs through `logger`.
    pub fn with_logger(repo: R, logger: CoreLogger) -> Self {
        Self { repo, logger }
    }

    /// Validates and persists a new todo.
    ///
    /// # Errors
    /// - `TaskNotFound` when `todo.task_id` does not exist.
    /// - `ParentTaskUnavailable` when the task cannot be loaded.
    /// - `Validation` when a time-range rule is broken.
    pub fn create_todo(&self, todo: &Todo) -> Result<TodoId, TodoServiceError> {
        if !self.repo.task_exists(todo.task_id)? {
            self.logger.warn(
                LOG_TARGET,
                format_args!(
                    "event=todo_create module=todo_service status=error error_code=task_not_found task_id={}",
                    todo.task_id
                ),
            );
            return Err(TodoServiceError::TaskNotFound(todo.task_id));
        }

        self.validate("todo_create", todo)?;
        let todo_id = self.repo.create_todo(todo)?;
        self.logger.info(
            LOG_TARGET,
            format_args!(
                "event=todo_create module=todo_service status=ok todo_id={todo_id} task_id={}",
                todo.task_id
            ),
        );
        Ok(todo_id)
    }

    /// Validates and writes an existing todo (full replacement).
    ///
    /// # Errors
    /// - `ParentTaskUnavailable` when the task cannot be loaded.
    /// - `Validation` when a time-range rule is broken.
    /// - `TodoNotFound` when no todo has `todo.id`.
    pub fn update_todo(&self, todo: &Todo) -> Result<(), TodoServiceError> {
        self.logger.debug(
            LOG_TARGET,
            format_args!(
                "event=todo_update module=todo_service status=start todo_id={} task_id={}",
                todo.id, todo.task_id
            ),
        );
        self.validate("todo_update", todo)?;
        self.repo.update_todo(todo)?;
        self.logger.info(
            LOG_TARGET,
            format_args!(
                "event=todo_update module=todo_service status=ok todo_id={}",
                todo.id
            ),
        );
        Ok(())
    }

    /// Lists all todos.
    pub fn list_todos(&self) -> RepoResult<Vec<Todo>> {
        self.repo.list_todos()
    }

    /// Lists todos owned by one task.
    pub fn list_todos_for_task(&self, task_id: TaskId) -> RepoResult<Vec<Todo>> {
        self.repo.list_todos_for_task(task_id)
    }

    /// Gets one todo by ID.
    pub fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        self.repo.get_todo(id)
    }

    /// Deletes one todo by ID.
    pub fn delete_todo(&self, id: TodoId) -> Result<(), TodoServiceError> {
        self.repo.delete_todo(id)?;
        self.logger.info(
            LOG_TARGET,
            format_args!("event=todo_delete module=todo_service status=ok todo_id={id}"),
        );
        Ok(())
    }

    /// Creates an event, a task under it, and a todo under that task.
    ///
    /// The task is linked to the event and the todo to the task before
    /// persisting. All three writes share one transaction: on failure the
    /// error names the failed stage and nothing is persisted.
    pub fn create_todo_with_details(
        &self,
        event: Event,
        mut task: Task,
        mut todo: Todo,
    ) -> Result<PlannedTodo, TodoServiceError> {
        let result = self.repo.atomically(|| -> Result<(), TodoServiceError> {
            let event_id: EventId = self
                .repo
                .create_event(&event)
                .map_err(|err| stage_error(DetailsStage::CreateEvent, err.into()))?;

            task.event_id = event_id;
            let task_id = self
                .repo
                .create_task(&task)
                .map_err(|err| stage_error(DetailsStage::CreateTask, err.into()))?;

            todo.task_id = task_id;
            self.create_todo(&todo)
                .map_err(|err| stage_error(DetailsStage::CreateTodo, err))?;
            Ok(())
        });

        if let Err(err) = result {
            self.logger.warn(
                LOG_TARGET,
                format_args!(
                    "event=todo_plan module=todo_service status=error error={err}"
                ),
            );
            return Err(err);
        }

        Ok(PlannedTodo { event, task, todo })
    }

    fn validate(&self, operation: &'static str, todo: &Todo) -> Result<(), TodoServiceError> {
        let task = self.resolve_parent_task(todo.task_id)?;
        check_time_ranges(todo, &task).map_err(|violation| {
            self.logger.warn(
                LOG_TARGET,
                format_args!(
                    "event={operation} module=todo_service status=error error_code={} todo_id={} task_id={}",
                    violation.code(),
                    todo.id,
                    task.id
                ),
            );
            TodoServiceError::Validation(violation)
        })
    }

    fn resolve_parent_task(&self, task_id: TaskId) -> Result<Task, TodoServiceError> {
        match self.repo.get_task(task_id) {
            Ok(Some(task)) => Ok(task),
            Ok(None) => Err(TodoServiceError::ParentTaskUnavailable {
                task_id,
                source: RepoError::not_found(RecordKind::Task, task_id),
            }),
            Err(source) => Err(TodoServiceError::ParentTaskUnavailable { task_id, source }),
        }
    }
}

fn stage_error(stage: DetailsStage, source: TodoServiceError) -> TodoServiceError {
    TodoServiceError::Stage {
        stage,
        source: Box::new(source),
    }
}

/// Checks a todo's planned and actual spans against the task's planned window.
///
/// Order: planned start, planned end, planned ordering, then the same three
/// for the actual span. Stops at the first violation.
pub fn check_time_ranges(todo: &Todo, task: &Task) -> Result<(), TimeRangeViolation> {
    check_span(SpanKind::Planned, &todo.planned_time, &task.planned_time)?;
    check_span(SpanKind::Actual, &todo.actual_time, &task.planned_time)
}

fn check_span(
    kind: SpanKind,
    span: &TimeSpan,
    window: &TimeSpan,
) -> Result<(), TimeRangeViolation> {
    if let Some(bounds) = window.bounds() {
        if let Some(instant) = span.start {
            if window.contains(instant) == Some(false) {
                return Err(TimeRangeViolation::StartOutsideTask {
                    span: kind,
                    instant,
                    window: bounds,
                });
            }
        }
        if let Some(instant) = span.end {
            if window.contains(instant) == Some(false) {
                return Err(TimeRangeViolation::EndOutsideTask {
                    span: kind,
                    instant,
                    window: bounds,
                });
            }
        }
    }

    if let Some((start, end)) = span.bounds() {
        if end < start {
            return Err(TimeRangeViolation::EndBeforeStart {
                span: kind,
                start,
                end,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::check_time_ranges;
    use crate::model::span::TimeSpan;
    use crate::model::task::Task;
    use crate::model::todo::{SpanKind, TimeRangeViolation, Todo};
    use uuid::Uuid;

    const HOUR: i64 = 3_600_000;

    fn task_with_window(window: TimeSpan) -> Task {
        Task::new(Uuid::new_v4(), "write report").planned(window)
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let task = task_with_window(TimeSpan::between(9 * HOUR, 17 * HOUR));
        let at_start = Todo::new(task.id).planned(TimeSpan::new(Some(9 * HOUR), None));
        let at_end = Todo::new(task.id).planned(TimeSpan::new(Some(17 * HOUR), None));
        let before = Todo::new(task.id).planned(TimeSpan::new(Some(9 * HOUR - 1_000), None));

        assert_eq!(check_time_ranges(&at_start, &task), Ok(()));
        assert_eq!(check_time_ranges(&at_end, &task), Ok(()));
        assert!(matches!(
            check_time_ranges(&before, &task),
            Err(TimeRangeViolation::StartOutsideTask {
                span: SpanKind::Planned,
                ..
            })
        ));
    }

    #[test]
    fn inverted_span_is_rejected_even_without_task_window() {
        let task = task_with_window(TimeSpan::UNSET);
        let todo = Todo::new(task.id).planned(TimeSpan::between(12 * HOUR, 11 * HOUR));

        assert_eq!(
            check_time_ranges(&todo, &task),
            Err(TimeRangeViolation::EndBeforeStart {
                span: SpanKind::Planned,
                start: 12 * HOUR,
                end: 11 * HOUR,
            })
        );
    }

    #[test]
    fn partial_task_window_skips_containment() {
        let task = task_with_window(TimeSpan::new(Some(9 * HOUR), None));
        let todo = Todo::new(task.id).planned(TimeSpan::new(Some(HOUR), None));
        assert_eq!(check_time_ranges(&todo, &task), Ok(()));
    }

    #[test]
    fn actual_span_is_checked_against_planned_window() {
        let task = task_with_window(TimeSpan::between(9 * HOUR, 17 * HOUR));
        let mut todo = Todo::new(task.id).planned(TimeSpan::between(10 * HOUR, 11 * HOUR));
        todo.actual_time = TimeSpan::new(Some(10 * HOUR), Some(18 * HOUR));

        let violation = check_time_ranges(&todo, &task).unwrap_err();
        assert_eq!(violation.code(), "actual_end_outside_task");
    }

    #[test]
    fn containment_is_reported_before_ordering() {
        let task = task_with_window(TimeSpan::between(9 * HOUR, 17 * HOUR));
        let todo = Todo::new(task.id).planned(TimeSpan::between(18 * HOUR, 10 * HOUR));

        let violation = check_time_ranges(&todo, &task).unwrap_err();
        assert_eq!(violation.code(), "planned_start_outside_task");
    }
}
