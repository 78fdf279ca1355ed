//! Todo repository contract and SQLite implementation.

use crate::model::event::EventId;
use crate::model::span::TimeSpan;
use crate::model::task::TaskId;
use crate::model::todo::{Todo, TodoId};
use crate::repo::{
    parse_optional_uuid, parse_status, parse_uuid, RecordKind, RepoError, RepoResult,
    SqlitePlannerRepository,
};
use rusqlite::{params, Row};

const TODO_SELECT_SQL: &str = "SELECT
    uuid,
    task_uuid,
    event_uuid,
    planned_start,
    planned_end,
    actual_start,
    actual_end,
    status,
    completed_at
FROM todos";

/// Repository interface for todo CRUD and cascade helpers.
///
/// Writes are not validated here; time-range rules live in `TodoService`.
pub trait TodoRepository {
    fn create_todo(&self, todo: &Todo) -> RepoResult<TodoId>;
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>>;
    fn list_todos(&self) -> RepoResult<Vec<Todo>>;
    fn list_todos_for_task(&self, task_id: TaskId) -> RepoResult<Vec<Todo>>;
    fn update_todo(&self, todo: &Todo) -> RepoResult<()>;
    fn delete_todo(&self, id: TodoId) -> RepoResult<()>;
    /// Deletes every todo owned by `task_id`; returns the number removed.
    fn delete_todos_by_task(&self, task_id: TaskId) -> RepoResult<usize>;
    /// Deletes every todo owned by any task of `event_id`; returns the number removed.
    fn delete_todos_by_event(&self, event_id: EventId) -> RepoResult<usize>;
}

impl TodoRepository for SqlitePlannerRepository<'_> {
    fn create_todo(&self, todo: &Todo) -> RepoResult<TodoId> {
        self.conn().execute(
            "INSERT INTO todos (
                uuid,
                task_uuid,
                event_uuid,
                planned_start,
                planned_end,
                actual_start,
                actual_end,
                status,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                todo.id.to_string(),
                todo.task_id.to_string(),
                todo.event_id.map(|id| id.to_string()),
                todo.planned_time.start,
                todo.planned_time.end,
                todo.actual_time.start,
                todo.actual_time.end,
                todo.status.as_str(),
                todo.completed_at,
            ],
        )?;
        Ok(todo.id)
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{TODO_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }
        Ok(None)
    }

    fn list_todos(&self) -> RepoResult<Vec<Todo>> {
        let mut stmt = self.conn().prepare(&format!(
            "{TODO_SELECT_SQL} ORDER BY planned_start IS NULL, planned_start ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }
        Ok(todos)
    }

    fn list_todos_for_task(&self, task_id: TaskId) -> RepoResult<Vec<Todo>> {
        let mut stmt = self.conn().prepare(&format!(
            "{TODO_SELECT_SQL}
             WHERE task_uuid = ?1
             ORDER BY planned_start IS NULL, planned_start ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([task_id.to_string()])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }
        Ok(todos)
    }

    fn update_todo(&self, todo: &Todo) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE todos
             SET
                task_uuid = ?1,
                event_uuid = ?2,
                planned_start = ?3,
                planned_end = ?4,
                actual_start = ?5,
                actual_end = ?6,
                status = ?7,
                completed_at = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?9;",
            params![
                todo.task_id.to_string(),
                todo.event_id.map(|id| id.to_string()),
                todo.planned_time.start,
                todo.planned_time.end,
                todo.actual_time.start,
                todo.actual_time.end,
                todo.status.as_str(),
                todo.completed_at,
                todo.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Todo, todo.id));
        }
        Ok(())
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM todos WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Todo, id));
        }
        Ok(())
    }

    fn delete_todos_by_task(&self, task_id: TaskId) -> RepoResult<usize> {
        let removed = self.conn().execute(
            "DELETE FROM todos WHERE task_uuid = ?1;",
            [task_id.to_string()],
        )?;
        Ok(removed)
    }

    fn delete_todos_by_event(&self, event_id: EventId) -> RepoResult<usize> {
        let removed = self.conn().execute(
            "DELETE FROM todos
             WHERE task_uuid IN (
                SELECT uuid FROM tasks WHERE event_uuid = ?1
             );",
            [event_id.to_string()],
        )?;
        Ok(removed)
    }
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let uuid_text: String = row.get("uuid")?;
    let task_text: String = row.get("task_uuid")?;
    let status_text: String = row.get("status")?;

    Ok(Todo {
        id: parse_uuid(&uuid_text, "todos.uuid")?,
        task_id: parse_uuid(&task_text, "todos.task_uuid")?,
        event_id: parse_optional_uuid(row.get("event_uuid")?, "todos.event_uuid")?,
        planned_time: TimeSpan::new(row.get("planned_start")?, row.get("planned_end")?),
        actual_time: TimeSpan::new(row.get("actual_start")?, row.get("actual_end")?),
        status: parse_status(&status_text, "todos.status")?,
        completed_at: row.get("completed_at")?,
    })
}
