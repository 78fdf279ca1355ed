//! Sign repository contract and SQLite implementation.

use crate::model::sign::{Sign, SignId};
use crate::repo::{
    ensure_connection_ready, parse_uuid, RecordKind, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

/// Repository interface for sign CRUD operations.
pub trait SignRepository {
    fn create_sign(&self, sign: &Sign) -> RepoResult<SignId>;
    fn get_sign(&self, id: SignId) -> RepoResult<Option<Sign>>;
    fn list_signs(&self) -> RepoResult<Vec<Sign>>;
    fn update_sign(&self, sign: &Sign) -> RepoResult<()>;
    fn delete_sign(&self, id: SignId) -> RepoResult<()>;
}

/// SQLite-backed sign repository.
pub struct SqliteSignRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSignRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["signs"])?;
        Ok(Self { conn })
    }
}

impl SignRepository for SqliteSignRepository<'_> {
    fn create_sign(&self, sign: &Sign) -> RepoResult<SignId> {
        self.conn.execute(
            "INSERT INTO signs (uuid, signifier, signified) VALUES (?1, ?2, ?3);",
            params![
                sign.id.to_string(),
                sign.signifier.as_str(),
                sign.signified.as_str()
            ],
        )?;
        Ok(sign.id)
    }

    fn get_sign(&self, id: SignId) -> RepoResult<Option<Sign>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, signifier, signified
             FROM signs
             WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_sign_row(row)?));
        }
        Ok(None)
    }

    fn list_signs(&self) -> RepoResult<Vec<Sign>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, signifier, signified
             FROM signs
             ORDER BY signifier ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut signs = Vec::new();
        while let Some(row) = rows.next()? {
            signs.push(parse_sign_row(row)?);
        }
        Ok(signs)
    }

    fn update_sign(&self, sign: &Sign) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE signs
             SET
                signifier = ?1,
                signified = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?3;",
            params![
                sign.signifier.as_str(),
                sign.signified.as_str(),
                sign.id.to_string()
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Sign, sign.id));
        }
        Ok(())
    }

    fn delete_sign(&self, id: SignId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM signs WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Sign, id));
        }
        Ok(())
    }
}

fn parse_sign_row(row: &Row<'_>) -> RepoResult<Sign> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Sign {
        id: parse_uuid(&uuid_text, "signs.uuid")?,
        signifier: row.get("signifier")?,
        signified: row.get("signified")?,
    })
}
