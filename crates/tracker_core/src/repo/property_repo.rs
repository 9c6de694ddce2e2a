//! Property entry repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist append-only property value entries.
//! - Keep one order key per `(object, name)` across all of its entries.
//!
//! # Invariants
//! - Exactly one `value_*` column is populated, matching `type`, or none.
//! - Entry listing is `sort_order ASC, recorded_at DESC, rowid DESC`, so the
//!   first entry seen for each name is its latest value.

use crate::model::object::ObjectId;
use crate::model::property::{Property, PropertyId, PropertyType, PropertyValue};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

const PROPERTY_SELECT_SQL: &str = "SELECT
    uuid,
    object_uuid,
    name,
    type,
    value_text,
    value_integer,
    value_date,
    value_boolean,
    sort_order,
    recorded_at,
    user_timestamp
FROM properties";

const PROPERTY_COLUMNS: &[&str] = &[
    "uuid",
    "object_uuid",
    "name",
    "type",
    "value_text",
    "value_integer",
    "value_date",
    "value_boolean",
    "sort_order",
    "recorded_at",
    "user_timestamp",
];

/// Repository interface for property entries.
pub trait PropertyRepository {
    /// Returns whether the owning object exists.
    fn object_exists(&self, object_uuid: ObjectId) -> RepoResult<bool>;
    /// Inserts one entry.
    fn create_entry(&self, property: &Property) -> RepoResult<PropertyId>;
    /// Loads one entry by id.
    fn get_entry(&self, id: PropertyId) -> RepoResult<Option<Property>>;
    /// Lists every entry of one object, latest value first within each name.
    fn list_entries(&self, object_uuid: ObjectId) -> RepoResult<Vec<Property>>;
    /// Lists entries of one name, newest user timestamp first.
    fn list_history(&self, object_uuid: ObjectId, name: &str) -> RepoResult<Vec<Property>>;
    /// Writes a new order key to every entry of one name.
    fn update_sort_order(
        &self,
        object_uuid: ObjectId,
        name: &str,
        sort_order: &str,
    ) -> RepoResult<()>;
    /// Deletes every entry of one name.
    fn delete_property(&self, object_uuid: ObjectId, name: &str) -> RepoResult<()>;
}

/// SQLite-backed property repository.
pub struct SqlitePropertyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePropertyRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "properties", PROPERTY_COLUMNS)?;
        Ok(Self { conn })
    }

    fn query_entries(&self, sql: &str, params: &[&dyn ToSql]) -> RepoResult<Vec<Property>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_property_row(row)?);
        }
        Ok(entries)
    }
}

impl PropertyRepository for SqlitePropertyRepository<'_> {
    fn object_exists(&self, object_uuid: ObjectId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM objects WHERE uuid = ?1);",
            [object_uuid.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn create_entry(&self, property: &Property) -> RepoResult<PropertyId> {
        property.validate()?;

        let columns = ValueColumns::from_value(property.value.as_ref());
        self.conn.execute(
            "INSERT INTO properties (
                uuid,
                object_uuid,
                name,
                type,
                value_text,
                value_integer,
                value_date,
                value_boolean,
                sort_order,
                recorded_at,
                user_timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                property.uuid.to_string(),
                property.object_uuid.to_string(),
                property.name.as_str(),
                property.kind.as_str(),
                columns.text,
                columns.integer,
                columns.date,
                columns.boolean,
                property.sort_order.as_deref(),
                property.recorded_at,
                property.user_timestamp,
            ],
        )?;

        Ok(property.uuid)
    }

    fn get_entry(&self, id: PropertyId) -> RepoResult<Option<Property>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROPERTY_SELECT_SQL} WHERE uuid = ?1;"))?;
        stmt.query_row([id.to_string()], |row| Ok(parse_property_row(row)))
            .optional()?
            .transpose()
    }

    fn list_entries(&self, object_uuid: ObjectId) -> RepoResult<Vec<Property>> {
        self.query_entries(
            &format!(
                "{PROPERTY_SELECT_SQL}
                 WHERE object_uuid = ?1
                 ORDER BY sort_order IS NULL ASC, sort_order ASC, recorded_at DESC, rowid DESC;"
            ),
            &[&object_uuid.to_string()],
        )
    }

    fn list_history(&self, object_uuid: ObjectId, name: &str) -> RepoResult<Vec<Property>> {
        self.query_entries(
            &format!(
                "{PROPERTY_SELECT_SQL}
                 WHERE object_uuid = ?1
                   AND name = ?2
                 ORDER BY user_timestamp DESC, recorded_at DESC, rowid DESC;"
            ),
            &[&object_uuid.to_string(), &name],
        )
    }

    fn update_sort_order(
        &self,
        object_uuid: ObjectId,
        name: &str,
        sort_order: &str,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE properties
             SET sort_order = ?3
             WHERE object_uuid = ?1
               AND name = ?2;",
            params![object_uuid.to_string(), name, sort_order],
        )?;
        if changed == 0 {
            return Err(RepoError::PropertyNotFound {
                object_uuid,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn delete_property(&self, object_uuid: ObjectId, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM properties
             WHERE object_uuid = ?1
               AND name = ?2;",
            params![object_uuid.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::PropertyNotFound {
                object_uuid,
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
struct ValueColumns<'a> {
    text: Option<&'a str>,
    integer: Option<i64>,
    date: Option<i64>,
    boolean: Option<i64>,
}

impl<'a> ValueColumns<'a> {
    fn from_value(value: Option<&'a PropertyValue>) -> Self {
        match value {
            None => Self::default(),
            Some(PropertyValue::Text(text)) => Self {
                text: Some(text.as_str()),
                ..Self::default()
            },
            Some(PropertyValue::Integer(number)) => Self {
                integer: Some(*number),
                ..Self::default()
            },
            Some(PropertyValue::Date(epoch_ms)) => Self {
                date: Some(*epoch_ms),
                ..Self::default()
            },
            Some(PropertyValue::Boolean(flag)) => Self {
                boolean: Some(i64::from(*flag)),
                ..Self::default()
            },
        }
    }
}

fn parse_property_row(row: &Row<'_>) -> RepoResult<Property> {
    let uuid_text: String = row.get("uuid")?;
    let object_uuid_text: String = row.get("object_uuid")?;

    let type_text: String = row.get("type")?;
    let kind = PropertyType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid property type `{type_text}` in properties.type"))
    })?;

    let value = match kind {
        PropertyType::String | PropertyType::Description => row
            .get::<_, Option<String>>("value_text")?
            .map(PropertyValue::Text),
        PropertyType::Integer => row
            .get::<_, Option<i64>>("value_integer")?
            .map(PropertyValue::Integer),
        PropertyType::Date => row
            .get::<_, Option<i64>>("value_date")?
            .map(PropertyValue::Date),
        PropertyType::Boolean => match row.get::<_, Option<i64>>("value_boolean")? {
            None => None,
            Some(0) => Some(PropertyValue::Boolean(false)),
            Some(1) => Some(PropertyValue::Boolean(true)),
            Some(other) => {
                return Err(RepoError::InvalidData(format!(
                    "invalid value_boolean `{other}` in properties.value_boolean"
                )));
            }
        },
    };

    let property = Property {
        uuid: parse_uuid(&uuid_text, "properties.uuid")?,
        object_uuid: parse_uuid(&object_uuid_text, "properties.object_uuid")?,
        name: row.get("name")?,
        kind,
        value,
        sort_order: row.get("sort_order")?,
        recorded_at: row.get("recorded_at")?,
        user_timestamp: row.get("user_timestamp")?,
    };
    property
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("property {uuid_text}: {err}")))?;
    Ok(property)
}
