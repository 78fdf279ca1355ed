//! Task repository contract and SQLite implementation.
//!
//! # Invariants
//! - `pre_task_ids` is persisted as a JSON array, preserving caller order.
//! - `delete_tasks_by_event` only removes task rows; callers delete the
//!   tasks' todos first.

use crate::model::event::EventId;
use crate::model::span::TimeSpan;
use crate::model::task::{Task, TaskId};
use crate::repo::{
    parse_optional_uuid, parse_status, parse_uuid, RecordKind, RepoError, RepoResult,
    SqlitePlannerRepository,
};
use rusqlite::{params, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    event_uuid,
    parent_task_uuid,
    pre_task_uuids,
    description,
    allowed_start,
    allowed_end,
    planned_start,
    planned_end,
    status,
    created_at
FROM tasks";

/// Repository interface for task CRUD and cascade helpers.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn list_tasks_for_event(&self, event_id: EventId) -> RepoResult<Vec<Task>>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Deletes every task owned by `event_id`; returns the number removed.
    fn delete_tasks_by_event(&self, event_id: EventId) -> RepoResult<usize>;
    fn task_exists(&self, id: TaskId) -> RepoResult<bool>;
}

impl TaskRepository for SqlitePlannerRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        self.conn().execute(
            "INSERT INTO tasks (
                uuid,
                event_uuid,
                parent_task_uuid,
                pre_task_uuids,
                description,
                allowed_start,
                allowed_end,
                planned_start,
                planned_end,
                status,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                task.id.to_string(),
                task.event_id.to_string(),
                task.parent_task_id.map(|id| id.to_string()),
                encode_pre_task_ids(&task.pre_task_ids)?,
                task.description.as_str(),
                task.allowed_time.start,
                task.allowed_time.end,
                task.planned_time.start,
                task.planned_time.end,
                task.status.as_str(),
                task.created_at,
            ],
        )?;
        Ok(task.id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn list_tasks_for_event(&self, event_id: EventId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn().prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE event_uuid = ?1
             ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([event_id.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE tasks
             SET
                event_uuid = ?1,
                parent_task_uuid = ?2,
                pre_task_uuids = ?3,
                description = ?4,
                allowed_start = ?5,
                allowed_end = ?6,
                planned_start = ?7,
                planned_end = ?8,
                status = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?10;",
            params![
                task.event_id.to_string(),
                task.parent_task_id.map(|id| id.to_string()),
                encode_pre_task_ids(&task.pre_task_ids)?,
                task.description.as_str(),
                task.allowed_time.start,
                task.allowed_time.end,
                task.planned_time.start,
                task.planned_time.end,
                task.status.as_str(),
                task.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Task, task.id));
        }
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Task, id));
        }
        Ok(())
    }

    fn delete_tasks_by_event(&self, event_id: EventId) -> RepoResult<usize> {
        let removed = self.conn().execute(
            "DELETE FROM tasks WHERE event_uuid = ?1;",
            [event_id.to_string()],
        )?;
        Ok(removed)
    }

    fn task_exists(&self, id: TaskId) -> RepoResult<bool> {
        let exists: i64 = self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn encode_pre_task_ids(ids: &[TaskId]) -> RepoResult<String> {
    serde_json::to_string(ids)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode pre_task_uuids: {err}")))
}

fn decode_pre_task_ids(value: &str) -> RepoResult<Vec<TaskId>> {
    serde_json::from_str(value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid pre_task_uuids value `{value}` in tasks.pre_task_uuids"
        ))
    })
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let event_text: String = row.get("event_uuid")?;
    let pre_task_text: String = row.get("pre_task_uuids")?;
    let status_text: String = row.get("status")?;

    Ok(Task {
        id: parse_uuid(&uuid_text, "tasks.uuid")?,
        event_id: parse_uuid(&event_text, "tasks.event_uuid")?,
        parent_task_id: parse_optional_uuid(
            row.get("parent_task_uuid")?,
            "tasks.parent_task_uuid",
        )?,
        pre_task_ids: decode_pre_task_ids(&pre_task_text)?,
        description: row.get("description")?,
        allowed_time: TimeSpan::new(row.get("allowed_start")?, row.get("allowed_end")?),
        planned_time: TimeSpan::new(row.get("planned_start")?, row.get("planned_end")?),
        status: parse_status(&status_text, "tasks.status")?,
        created_at: row.get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_pre_task_ids, encode_pre_task_ids};
    use uuid::Uuid;

    #[test]
    fn pre_task_ids_keep_caller_order() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let encoded = encode_pre_task_ids(&ids).unwrap();
        assert_eq!(decode_pre_task_ids(&encoded).unwrap(), ids);
        assert_eq!(encode_pre_task_ids(&[]).unwrap(), "[]");
    }

    #[test]
    fn malformed_pre_task_ids_are_rejected() {
        assert!(decode_pre_task_ids("[\"not-a-uuid\"]").is_err());
        assert!(decode_pre_task_ids("{").is_err());
    }
}
