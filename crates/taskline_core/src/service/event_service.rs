//! Event use-case service.
//!
//! # Responsibility
//! - Provide event CRUD entry points.
//! - Cascade event deletion to its tasks and their todos atomically.
//!
//! # Invariants
//! - Deletion order is todos, tasks, event; all in one transaction.
//! - Todos of other events that merely override this event keep existing and
//!   fall back to their task's event.

use crate::logging::CoreLogger;
use crate::model::event::{Event, EventId};
use crate::repo::event_repo::EventRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::todo_repo::TodoRepository;
use crate::repo::{RecordKind, RepoError, RepoResult, Transactional};
use crate::service::CascadeStage;
use std::error::Error;
use std::fmt::{Display, Formatter};

const LOG_TARGET: &str = "event_service";

/// Errors from event service operations.
#[derive(Debug)]
pub enum EventServiceError {
    /// Target event does not exist.
    EventNotFound(EventId),
    /// A cascade step failed; the whole cascade was rolled back.
    Cascade {
        event_id: EventId,
        stage: CascadeStage,
        source: RepoError,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for EventServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::Cascade {
                event_id,
                stage,
                source,
            } => write!(f, "{stage} (event {event_id}): {source}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EventServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Cascade { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            Self::EventNotFound(_) => None,
        }
    }
}

impl From<RepoError> for EventServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                record: RecordKind::Event,
                id,
            } => Self::EventNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Counts of rows removed by a successful event deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventDeletion {
    pub removed_tasks: usize,
    pub removed_todos: usize,
}

/// Event service facade over repository implementations.
pub struct EventService<R>
where
    R: EventRepository + TaskRepository + TodoRepository + Transactional,
{
    repo: R,
    logger: CoreLogger,
}

impl<R> EventService<R>
where
    R: EventRepository + TaskRepository + TodoRepository + Transactional,
{
    pub fn new(repo: R) -> Self {
        Self::with_logger(repo, CoreLogger::global())
    }

    pub fn with_logger(repo: R, logger: CoreLogger) -> Self {
        Self { repo, logger }
    }

    pub fn create_event(&self, event: &Event) -> RepoResult<EventId> {
        let event_id = self.repo.create_event(event)?;
        self.logger.info(
            LOG_TARGET,
            format_args!("event=event_create module=event_service status=ok event_id={event_id}"),
        );
        Ok(event_id)
    }

    pub fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        self.repo.get_event(id)
    }

    pub fn list_events(&self) -> RepoResult<Vec<Event>> {
        self.repo.list_events()
    }

    /// Writes an existing event (full replacement).
    pub fn update_event(&self, event: &Event) -> Result<(), EventServiceError> {
        self.repo.update_event(event)?;
        self.logger.info(
            LOG_TARGET,
            format_args!(
                "event=event_update module=event_service status=ok event_id={}",
                event.id
            ),
        );
        Ok(())
    }

    /// Deletes an event with its tasks and their todos, atomically.
    ///
    /// # Errors
    /// - `Cascade` naming the stage that failed.
    /// - `EventNotFound` when no event has `id`.
    ///
    /// On any error nothing is deleted.
    pub fn delete_event(&self, id: EventId) -> Result<EventDeletion, EventServiceError> {
        let result = self.repo.atomically(|| -> Result<EventDeletion, EventServiceError> {
            let removed_todos = self
                .repo
                .delete_todos_by_event(id)
                .map_err(cascade_error(id, CascadeStage::DeleteTodos))?;
            let removed_tasks = self
                .repo
                .delete_tasks_by_event(id)
                .map_err(cascade_error(id, CascadeStage::DeleteTasks))?;
            self.repo
                .delete_event(id)
                .map_err(cascade_error(id, CascadeStage::DeleteEvent))?;
            Ok(EventDeletion {
                removed_tasks,
                removed_todos,
            })
        });

        match &result {
            Ok(deletion) => self.logger.info(
                LOG_TARGET,
                format_args!(
                    "event=event_delete module=event_service status=ok event_id={id} removed_tasks={} removed_todos={}",
                    deletion.removed_tasks, deletion.removed_todos
                ),
            ),
            Err(err) => self.logger.error(
                LOG_TARGET,
                format_args!(
                    "event=event_delete module=event_service status=error event_id={id} error={err}"
                ),
            ),
        }
        result
    }
}

fn cascade_error(
    event_id: EventId,
    stage: CascadeStage,
) -> impl FnOnce(RepoError) -> EventServiceError {
    move |source| match source {
        RepoError::NotFound {
            record: RecordKind::Event,
            ..
        } => EventServiceError::EventNotFound(event_id),
        source => EventServiceError::Cascade {
            event_id,
            stage,
            source,
        },
    }
}
