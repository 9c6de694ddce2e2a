//! Typed property entries attached to tracked objects.
//!
//! # Responsibility
//! - Define property types and their value payloads.
//! - Model value history: every edit is a new entry for the same name.
//!
//! # Invariants
//! - `value` variant always matches `kind` (`Text` for string/description).
//! - Entries sharing `(object_uuid, name)` share one `sort_order` key.
//! - Deserialized entries are validated; invalid payloads are rejected.

use crate::model::object::{now_epoch_ms, ObjectId};
use crate::ordering::Orderable;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one property entry.
pub type PropertyId = Uuid;

/// Value type chosen when a property is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// Short plain text.
    String,
    /// Whole number.
    Integer,
    /// Calendar date as epoch milliseconds.
    Date,
    /// Long-form text.
    Description,
    /// Yes/no toggle.
    Boolean,
}

impl PropertyType {
    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Date => "date",
            Self::Description => "description",
            Self::Boolean => "boolean",
        }
    }

    /// Parses the storage/wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "date" => Some(Self::Date),
            "description" => Some(Self::Description),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    /// Whether `value` is a legal payload for this type.
    pub fn accepts(self, value: &PropertyValue) -> bool {
        matches!(
            (self, value),
            (Self::String | Self::Description, PropertyValue::Text(_))
                | (Self::Integer, PropertyValue::Integer(_))
                | (Self::Date, PropertyValue::Date(_))
                | (Self::Boolean, PropertyValue::Boolean(_))
        )
    }
}

/// Property value payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    /// Unix epoch milliseconds.
    Date(i64),
    Boolean(bool),
}

/// Validation failures for `Property`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValidationError {
    /// The nil UUID cannot identify an entry or its owner.
    NilUuid,
    /// Name is empty after trimming.
    BlankName,
    /// Value variant does not match the property type.
    ValueTypeMismatch { kind: PropertyType },
}

impl Display for PropertyValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "property uuid must not be nil"),
            Self::BlankName => write!(f, "property name must not be blank"),
            Self::ValueTypeMismatch { kind } => {
                write!(f, "property value does not match type `{}`", kind.as_str())
            }
        }
    }
}

impl Error for PropertyValidationError {}

/// One recorded value of a named property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PropertyWire")]
pub struct Property {
    pub uuid: PropertyId,
    pub object_uuid: ObjectId,
    pub name: String,
    /// Serialized as `type` to match the storage column.
    #[serde(rename = "type")]
    pub kind: PropertyType,
    pub value: Option<PropertyValue>,
    /// Fractional order key shared by all entries of this name.
    pub sort_order: Option<String>,
    /// System time the entry was recorded, epoch ms.
    pub recorded_at: i64,
    /// User-chosen time the value applies to, epoch ms.
    pub user_timestamp: i64,
}

#[derive(Deserialize)]
struct PropertyWire {
    uuid: PropertyId,
    object_uuid: ObjectId,
    name: String,
    #[serde(rename = "type")]
    kind: PropertyType,
    value: Option<PropertyValue>,
    sort_order: Option<String>,
    recorded_at: i64,
    user_timestamp: i64,
}

impl TryFrom<PropertyWire> for Property {
    type Error = PropertyValidationError;

    fn try_from(wire: PropertyWire) -> Result<Self, Self::Error> {
        let property = Self {
            uuid: wire.uuid,
            object_uuid: wire.object_uuid,
            name: wire.name,
            kind: wire.kind,
            value: wire.value,
            sort_order: wire.sort_order,
            recorded_at: wire.recorded_at,
            user_timestamp: wire.user_timestamp,
        };
        property.validate()?;
        Ok(property)
    }
}

impl Property {
    /// Creates an unpositioned entry stamped with the current time.
    pub fn new(object_uuid: ObjectId, name: impl Into<String>, kind: PropertyType) -> Self {
        let now = now_epoch_ms();
        Self {
            uuid: Uuid::new_v4(),
            object_uuid,
            name: name.into(),
            kind,
            value: None,
            sort_order: None,
            recorded_at: now,
            user_timestamp: now,
        }
    }

    /// Creates the next history entry for this property.
    ///
    /// Name, type and order key carry over; the value is cleared.
    pub fn next_entry(&self, user_timestamp: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            object_uuid: self.object_uuid,
            name: self.name.clone(),
            kind: self.kind,
            value: None,
            sort_order: self.sort_order.clone(),
            recorded_at: now_epoch_ms(),
            user_timestamp,
        }
    }

    /// Checks entry invariants before persistence.
    pub fn validate(&self) -> Result<(), PropertyValidationError> {
        if self.uuid.is_nil() || self.object_uuid.is_nil() {
            return Err(PropertyValidationError::NilUuid);
        }
        if self.name.trim().is_empty() {
            return Err(PropertyValidationError::BlankName);
        }
        if let Some(value) = &self.value {
            if !self.kind.accepts(value) {
                return Err(PropertyValidationError::ValueTypeMismatch { kind: self.kind });
            }
        }
        Ok(())
    }

    /// Value rendered for list rows; `None` when there is nothing to show.
    pub fn display_value(&self) -> Option<String> {
        match self.value.as_ref()? {
            PropertyValue::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            PropertyValue::Integer(number) => Some(number.to_string()),
            PropertyValue::Date(epoch_ms) => Some(epoch_ms.to_string()),
            PropertyValue::Boolean(flag) => Some(if *flag { "Yes" } else { "No" }.to_string()),
        }
    }
}

impl Orderable for Property {
    fn order(&self) -> Option<&str> {
        self.sort_order.as_deref()
    }

    fn set_order(&mut self, order: String) {
        self.sort_order = Some(order);
    }
}

#[cfg(test)]
mod tests {
    use super::{Property, PropertyType, PropertyValidationError, PropertyValue};
    use uuid::Uuid;

    #[test]
    fn type_names_round_trip() {
        for kind in [
            PropertyType::String,
            PropertyType::Integer,
            PropertyType::Date,
            PropertyType::Description,
            PropertyType::Boolean,
        ] {
            assert_eq!(PropertyType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(PropertyType::parse("double"), None);
    }

    #[test]
    fn description_accepts_text_values() {
        let mut property = Property::new(Uuid::new_v4(), "Notes", PropertyType::Description);
        property.value = Some(PropertyValue::Text("long form".to_string()));
        assert_eq!(property.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_mismatched_value() {
        let mut property = Property::new(Uuid::new_v4(), "Count", PropertyType::Integer);
        property.value = Some(PropertyValue::Boolean(true));
        assert_eq!(
            property.validate(),
            Err(PropertyValidationError::ValueTypeMismatch {
                kind: PropertyType::Integer
            })
        );
    }

    #[test]
    fn display_value_hides_blank_text() {
        let mut property = Property::new(Uuid::new_v4(), "Label", PropertyType::String);
        property.value = Some(PropertyValue::Text("   ".to_string()));
        assert_eq!(property.display_value(), None);

        property.kind = PropertyType::Boolean;
        property.value = Some(PropertyValue::Boolean(false));
        assert_eq!(property.display_value().as_deref(), Some("No"));
    }

    #[test]
    fn next_entry_keeps_name_type_and_key() {
        let mut property = Property::new(Uuid::new_v4(), "Weight", PropertyType::Integer);
        property.sort_order = Some("a0".to_string());
        property.value = Some(PropertyValue::Integer(70));

        let entry = property.next_entry(1_700_000_000_000);
        assert_ne!(entry.uuid, property.uuid);
        assert_eq!(entry.name, "Weight");
        assert_eq!(entry.kind, PropertyType::Integer);
        assert_eq!(entry.sort_order.as_deref(), Some("a0"));
        assert_eq!(entry.value, None);
        assert_eq!(entry.user_timestamp, 1_700_000_000_000);
    }
}
