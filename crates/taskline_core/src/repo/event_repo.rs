//! Event repository contract and SQLite implementation.

use crate::model::event::{Event, EventId};
use crate::repo::{
    bool_to_int, parse_uuid, RecordKind, RepoError, RepoResult, SqlitePlannerRepository,
};
use rusqlite::{params, Row};

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    location,
    priority,
    category,
    is_template
FROM events";

/// Repository interface for event CRUD operations.
pub trait EventRepository {
    fn create_event(&self, event: &Event) -> RepoResult<EventId>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    fn list_events(&self) -> RepoResult<Vec<Event>>;
    fn update_event(&self, event: &Event) -> RepoResult<()>;
    fn delete_event(&self, id: EventId) -> RepoResult<()>;
}

impl EventRepository for SqlitePlannerRepository<'_> {
    fn create_event(&self, event: &Event) -> RepoResult<EventId> {
        self.conn().execute(
            "INSERT INTO events (
                uuid,
                title,
                description,
                location,
                priority,
                category,
                is_template
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                event.id.to_string(),
                event.title.as_str(),
                event.description.as_str(),
                event.location.as_str(),
                event.priority,
                event.category.as_str(),
                bool_to_int(event.is_template),
            ],
        )?;
        Ok(event.id)
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }
        Ok(None)
    }

    fn list_events(&self) -> RepoResult<Vec<Event>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{EVENT_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        Ok(events)
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE events
             SET
                title = ?1,
                description = ?2,
                location = ?3,
                priority = ?4,
                category = ?5,
                is_template = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?7;",
            params![
                event.title.as_str(),
                event.description.as_str(),
                event.location.as_str(),
                event.priority,
                event.category.as_str(),
                bool_to_int(event.is_template),
                event.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Event, event.id));
        }
        Ok(())
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM events WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Event, id));
        }
        Ok(())
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let uuid_text: String = row.get("uuid")?;
    let is_template = match row.get::<_, i64>("is_template")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_template value `{other}` in events.is_template"
            )));
        }
    };

    Ok(Event {
        id: parse_uuid(&uuid_text, "events.uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        location: row.get("location")?,
        priority: row.get("priority")?,
        category: row.get("category")?,
        is_template,
    })
}
