//! Task use-case service.
//!
//! # Responsibility
//! - Provide task CRUD entry points and the existence check used by todos.
//! - Cascade task deletion to its todos atomically.
//!
//! # Invariants
//! - Deleting a task removes its todos first, in the same transaction.
//! - Child tasks (`parent_task_id`) are not touched by a parent's deletion.
//! - Windows, parents and prerequisites are stored without validation.

use crate::logging::CoreLogger;
use crate::model::event::EventId;
use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::TaskRepository;
use crate::repo::todo_repo::TodoRepository;
use crate::repo::{RecordKind, RepoError, RepoResult, Transactional};
use crate::service::CascadeStage;
use std::error::Error;
use std::fmt::{Display, Formatter};

const LOG_TARGET: &str = "task_service";

/// Errors from task service operations.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// A cascade step failed; the whole cascade was rolled back.
    Cascade {
        task_id: TaskId,
        stage: CascadeStage,
        source: RepoError,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Cascade {
                task_id,
                stage,
                source,
            } => write!(f, "{stage} (task {task_id}): {source}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Cascade { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            Self::TaskNotFound(_) => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                record: RecordKind::Task,
                id,
            } => Self::TaskNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Task service facade over repository implementations.
pub struct TaskService<R>
where
    R: TaskRepository + TodoRepository + Transactional,
{
    repo: R,
    logger: CoreLogger,
}

impl<R> TaskService<R>
where
    R: TaskRepository + TodoRepository + Transactional,
{
    /// Creates a service that logs through the process-wide logger.
    pub fn new(repo: R) -> Self {
        Self::with_logger(repo, CoreLogger::global())
    }

    /// Creates a service that logs through `logger`.
    pub fn with_logger(repo: R, logger: CoreLogger) -> Self {
        Self { repo, logger }
    }

    pub fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        let task_id = self.repo.create_task(task)?;
        self.logger.info(
            LOG_TARGET,
            format_args!(
                "event=task_create module=task_service status=ok task_id={task_id} event_id={}",
                task.event_id
            ),
        );
        Ok(task_id)
    }

    pub fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks()
    }

    pub fn list_tasks_for_event(&self, event_id: EventId) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks_for_event(event_id)
    }

    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id)
    }

    /// Writes an existing task (full replacement).
    pub fn update_task(&self, task: &Task) -> Result<(), TaskServiceError> {
        self.repo.update_task(task)?;
        self.logger.info(
            LOG_TARGET,
            format_args!(
                "event=task_update module=task_service status=ok task_id={}",
                task.id
            ),
        );
        Ok(())
    }

    /// Returns whether a task with `id` exists.
    pub fn task_exists(&self, id: TaskId) -> RepoResult<bool> {
        self.repo.task_exists(id)
    }

    /// Deletes a task after deleting its todos, atomically.
    ///
    /// # Errors
    /// - `Cascade` naming the stage that failed.
    /// - `TaskNotFound` when no task has `id`.
    ///
    /// On any error nothing is deleted.
    pub fn delete_task(&self, id: TaskId) -> Result<(), TaskServiceError> {
        let result = self.repo.atomically(|| -> Result<usize, TaskServiceError> {
            let removed_todos = self
                .repo
                .delete_todos_by_task(id)
                .map_err(cascade_error(id, CascadeStage::DeleteTodos))?;
            self.repo
                .delete_task(id)
                .map_err(cascade_error(id, CascadeStage::DeleteTask))?;
            Ok(removed_todos)
        });

        match result {
            Ok(removed_todos) => {
                self.logger.info(
                    LOG_TARGET,
                    format_args!(
                        "event=task_delete module=task_service status=ok task_id={id} removed_todos={removed_todos}"
                    ),
                );
                Ok(())
            }
            Err(err) => {
                self.logger.error(
                    LOG_TARGET,
                    format_args!(
                        "event=task_delete module=task_service status=error task_id={id} error={err}"
                    ),
                );
                Err(err)
            }
        }
    }
}

fn cascade_error(
    task_id: TaskId,
    stage: CascadeStage,
) -> impl FnOnce(RepoError) -> TaskServiceError {
    move |source| match source {
        RepoError::NotFound {
            record: RecordKind::Task,
            ..
        } => TaskServiceError::TaskNotFound(task_id),
        source => TaskServiceError::Cascade {
            task_id,
            stage,
            source,
        },
    }
}
