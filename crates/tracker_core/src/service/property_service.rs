//! Property use-case service.
//!
//! # Responsibility
//! - Add typed properties at the end of an object's property list.
//! - Record new values as history entries.
//! - Reorder properties with a single order-key rewrite per move.
//!
//! # Invariants
//! - Property names are unique per object after trim.
//! - The visible list shows the latest entry per name, in key order.
//! - A reorder rewrites the key of every entry of the moved name.

use crate::model::object::{now_epoch_ms, ObjectId};
use crate::model::property::{Property, PropertyType, PropertyValidationError, PropertyValue};
use crate::ordering::{apply_reorder, next_key, Orderable};
use crate::repo::property_repo::PropertyRepository;
use crate::repo::RepoError;
use crate::service::{arrange_in_order, ArrangeError};
use log::info;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from property service operations.
#[derive(Debug)]
pub enum PropertyServiceError {
    /// Property name is blank after trim.
    InvalidName,
    /// Owning object does not exist.
    ObjectNotFound(ObjectId),
    /// No property with this name on the object.
    PropertyNotFound { object_uuid: ObjectId, name: String },
    /// Another property already uses this name.
    DuplicatePropertyName(String),
    /// Value does not fit the property.
    Validation(PropertyValidationError),
    /// Reorder request does not cover every property.
    ReorderMismatch { expected: usize, actual: usize },
    /// Reorder request names one property twice.
    DuplicateReorderName(String),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for PropertyServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "property name must not be blank"),
            Self::ObjectNotFound(id) => write!(f, "object not found: {id}"),
            Self::PropertyNotFound { object_uuid, name } => {
                write!(f, "property `{name}` not found on object {object_uuid}")
            }
            Self::DuplicatePropertyName(name) => {
                write!(f, "property name already in use: `{name}`")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::ReorderMismatch { expected, actual } => write!(
                f,
                "reorder must list all {expected} properties, got {actual}"
            ),
            Self::DuplicateReorderName(name) => {
                write!(f, "reorder lists property twice: `{name}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PropertyServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PropertyServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ObjectNotFound(id) => Self::ObjectNotFound(id),
            RepoError::PropertyNotFound { object_uuid, name } => {
                Self::PropertyNotFound { object_uuid, name }
            }
            RepoError::PropertyValidation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<PropertyValidationError> for PropertyServiceError {
    fn from(value: PropertyValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Request model for adding a property to an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProperty {
    pub name: String,
    pub kind: PropertyType,
    pub value: Option<PropertyValue>,
    /// Defaults to now when `None`.
    pub user_timestamp: Option<i64>,
}

/// Property service facade.
pub struct PropertyService<R: PropertyRepository> {
    repo: R,
}

impl<R: PropertyRepository> PropertyService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a property after every existing property of the object.
    pub fn add_property(
        &self,
        object_uuid: ObjectId,
        request: NewProperty,
    ) -> Result<Property, PropertyServiceError> {
        let name = normalize_name(&request.name)?;
        let siblings = self.latest_entries(object_uuid)?;
        if siblings.iter().any(|sibling| sibling.name == name) {
            return Err(PropertyServiceError::DuplicatePropertyName(name));
        }

        let mut property = Property::new(object_uuid, name, request.kind);
        property.value = normalize_value(request.value);
        if let Some(user_timestamp) = request.user_timestamp {
            property.user_timestamp = user_timestamp;
        }
        property.set_order(next_key(&siblings));
        property.validate()?;

        self.repo.create_entry(&property)?;
        info!(
            "event=property_create module=service status=ok object_uuid={} property_uuid={} type={}",
            object_uuid,
            property.uuid,
            property.kind.as_str()
        );
        Ok(property)
    }

    /// Records a new value for an existing property.
    ///
    /// The previous entries stay as history.
    pub fn record_value(
        &self,
        object_uuid: ObjectId,
        name: &str,
        value: Option<PropertyValue>,
        user_timestamp: Option<i64>,
    ) -> Result<Property, PropertyServiceError> {
        let name = normalize_name(name)?;
        let latest = self
            .latest_entries(object_uuid)?
            .into_iter()
            .find(|entry| entry.name == name)
            .ok_or(PropertyServiceError::PropertyNotFound { object_uuid, name })?;

        let mut entry = latest.next_entry(user_timestamp.unwrap_or_else(now_epoch_ms));
        entry.value = normalize_value(value);
        entry.validate()?;

        self.repo.create_entry(&entry)?;
        info!(
            "event=property_record module=service status=ok object_uuid={} property_uuid={}",
            object_uuid, entry.uuid
        );
        Ok(entry)
    }

    /// Lists the latest entry of each property in display order.
    pub fn list_properties(
        &self,
        object_uuid: ObjectId,
    ) -> Result<Vec<Property>, PropertyServiceError> {
        self.latest_entries(object_uuid)
    }

    /// Lists every recorded value of one property, newest first.
    pub fn property_history(
        &self,
        object_uuid: ObjectId,
        name: &str,
    ) -> Result<Vec<Property>, PropertyServiceError> {
        let name = normalize_name(name)?;
        self.ensure_object_exists(object_uuid)?;
        let history = self.repo.list_history(object_uuid, &name)?;
        if history.is_empty() {
            return Err(PropertyServiceError::PropertyNotFound { object_uuid, name });
        }
        Ok(history)
    }

    /// Applies a drag-and-drop reorder of an object's properties.
    ///
    /// `ordered_names` is the full list after the gesture. Returns the name
    /// whose key was rewritten, if any.
    pub fn reorder_properties(
        &self,
        object_uuid: ObjectId,
        ordered_names: &[String],
    ) -> Result<Option<String>, PropertyServiceError> {
        let latest = self.latest_entries(object_uuid)?;
        let mut arranged = arrange_in_order(latest, ordered_names, |entry| entry.name.clone())
            .map_err(|err| match err {
                ArrangeError::LengthMismatch { expected, actual } => {
                    PropertyServiceError::ReorderMismatch { expected, actual }
                }
                ArrangeError::Unknown(name) => {
                    PropertyServiceError::PropertyNotFound { object_uuid, name }
                }
                ArrangeError::Duplicate(name) => PropertyServiceError::DuplicateReorderName(name),
            })?;

        let Some(index) = apply_reorder(&mut arranged) else {
            return Ok(None);
        };
        let moved = &arranged[index];
        if let Some(key) = moved.order() {
            self.repo.update_sort_order(object_uuid, &moved.name, key)?;
        }

        info!(
            "event=property_reorder module=service status=ok object_uuid={} property_uuid={} position={} count={}",
            object_uuid,
            moved.uuid,
            index,
            arranged.len()
        );
        Ok(Some(moved.name.clone()))
    }

    /// Deletes a property and its whole history.
    pub fn delete_property(
        &self,
        object_uuid: ObjectId,
        name: &str,
    ) -> Result<(), PropertyServiceError> {
        let name = normalize_name(name)?;
        self.ensure_object_exists(object_uuid)?;
        self.repo.delete_property(object_uuid, &name)?;
        info!("event=property_delete module=service status=ok object_uuid={object_uuid}");
        Ok(())
    }

    fn latest_entries(&self, object_uuid: ObjectId) -> Result<Vec<Property>, PropertyServiceError> {
        self.ensure_object_exists(object_uuid)?;
        let entries = self.repo.list_entries(object_uuid)?;
        Ok(latest_per_name(entries))
    }

    fn ensure_object_exists(&self, object_uuid: ObjectId) -> Result<(), PropertyServiceError> {
        if !self.repo.object_exists(object_uuid)? {
            return Err(PropertyServiceError::ObjectNotFound(object_uuid));
        }
        Ok(())
    }
}

/// Keeps the first entry seen per name; input must list latest first.
fn latest_per_name(entries: Vec<Property>) -> Vec<Property> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.name.clone()))
        .collect()
}

fn normalize_name(value: &str) -> Result<String, PropertyServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PropertyServiceError::InvalidName);
    }
    Ok(trimmed.to_string())
}

/// Blank text is stored as "no value".
fn normalize_value(value: Option<PropertyValue>) -> Option<PropertyValue> {
    match value {
        Some(PropertyValue::Text(text)) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| PropertyValue::Text(trimmed.to_string()))
        }
        other => other,
    }
}
