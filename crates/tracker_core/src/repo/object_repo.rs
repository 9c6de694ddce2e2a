//! Tracked object repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `objects` storage.
//! - Persist single-row order key updates produced by reorders.
//!
//! # Invariants
//! - Write paths call `TrackedObject::validate()` before SQL mutations.
//! - Listing is deterministic: unkeyed last, then `sort_order ASC, uuid ASC`.
//! - Deleting an object cascades to its property entries.

use crate::model::object::{ObjectId, TrackedObject};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const OBJECT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    color_hex,
    icon_name,
    sort_order,
    created_at
FROM objects";

const OBJECT_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "description",
    "color_hex",
    "icon_name",
    "sort_order",
    "created_at",
    "updated_at",
];

/// Repository interface for tracked objects.
pub trait ObjectRepository {
    /// Inserts one object.
    fn create_object(&self, object: &TrackedObject) -> RepoResult<ObjectId>;
    /// Updates presentation fields and order key of one object.
    fn update_object(&self, object: &TrackedObject) -> RepoResult<()>;
    /// Loads one object by id.
    fn get_object(&self, id: ObjectId) -> RepoResult<Option<TrackedObject>>;
    /// Lists all objects in order-key order.
    fn list_objects(&self) -> RepoResult<Vec<TrackedObject>>;
    /// Writes a new order key for one object.
    fn update_sort_order(&self, id: ObjectId, sort_order: &str) -> RepoResult<()>;
    /// Deletes one object and its property entries.
    fn delete_object(&self, id: ObjectId) -> RepoResult<()>;
}

/// SQLite-backed object repository.
pub struct SqliteObjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteObjectRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "objects", OBJECT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ObjectRepository for SqliteObjectRepository<'_> {
    fn create_object(&self, object: &TrackedObject) -> RepoResult<ObjectId> {
        object.validate()?;

        self.conn.execute(
            "INSERT INTO objects (
                uuid,
                name,
                description,
                color_hex,
                icon_name,
                sort_order,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                object.uuid.to_string(),
                object.name.as_str(),
                object.description.as_deref(),
                object.color_hex.as_deref(),
                object.icon_name.as_deref(),
                object.sort_order.as_deref(),
                object.created_at,
            ],
        )?;

        Ok(object.uuid)
    }

    fn update_object(&self, object: &TrackedObject) -> RepoResult<()> {
        object.validate()?;

        let changed = self.conn.execute(
            "UPDATE objects
             SET
                name = ?1,
                description = ?2,
                color_hex = ?3,
                icon_name = ?4,
                sort_order = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                object.name.as_str(),
                object.description.as_deref(),
                object.color_hex.as_deref(),
                object.icon_name.as_deref(),
                object.sort_order.as_deref(),
                object.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ObjectNotFound(object.uuid));
        }
        Ok(())
    }

    fn get_object(&self, id: ObjectId) -> RepoResult<Option<TrackedObject>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{OBJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_object_row(row)?));
        }
        Ok(None)
    }

    fn list_objects(&self) -> RepoResult<Vec<TrackedObject>> {
        let mut stmt = self.conn.prepare(&format!(
            "{OBJECT_SELECT_SQL}
             ORDER BY sort_order IS NULL ASC, sort_order ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut objects = Vec::new();
        while let Some(row) = rows.next()? {
            objects.push(parse_object_row(row)?);
        }
        Ok(objects)
    }

    fn update_sort_order(&self, id: ObjectId, sort_order: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE objects
             SET sort_order = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), sort_order],
        )?;
        if changed == 0 {
            return Err(RepoError::ObjectNotFound(id));
        }
        Ok(())
    }

    fn delete_object(&self, id: ObjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM objects WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ObjectNotFound(id));
        }
        Ok(())
    }
}

fn parse_object_row(row: &Row<'_>) -> RepoResult<TrackedObject> {
    let uuid_text: String = row.get("uuid")?;
    let object = TrackedObject {
        uuid: parse_uuid(&uuid_text, "objects.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        color_hex: row.get("color_hex")?,
        icon_name: row.get("icon_name")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
    };
    object
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("object {uuid_text}: {err}")))?;
    Ok(object)
}
