//! Tracked object use-case service.
//!
//! # Responsibility
//! - Create objects at the end of the user's list.
//! - Apply drag-and-drop reorders by rewriting one order key.
//! - Provide edit, lookup, listing and delete entry points.
//!
//! # Invariants
//! - New objects always receive `next_key` of the current list.
//! - Edits never touch `sort_order`.
//! - Logs carry ids and counts only, never user-entered text.

use crate::model::object::{ObjectId, TrackedObject};
use crate::ordering::{apply_reorder, next_key, Orderable};
use crate::repo::object_repo::ObjectRepository;
use crate::repo::RepoError;
use crate::service::{arrange_in_order, ArrangeError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from object service operations.
#[derive(Debug)]
pub enum ObjectServiceError {
    /// Name is blank after trim.
    InvalidName,
    /// Target object does not exist.
    ObjectNotFound(ObjectId),
    /// Reorder request does not cover every stored object.
    ReorderMismatch { expected: usize, actual: usize },
    /// Reorder request names one object twice.
    DuplicateReorderId(ObjectId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for ObjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "object name must not be blank"),
            Self::ObjectNotFound(id) => write!(f, "object not found: {id}"),
            Self::ReorderMismatch { expected, actual } => write!(
                f,
                "reorder must list all {expected} objects, got {actual}"
            ),
            Self::DuplicateReorderId(id) => write!(f, "reorder lists object twice: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ObjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ObjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ObjectNotFound(id) => Self::ObjectNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ArrangeError<ObjectId>> for ObjectServiceError {
    fn from(value: ArrangeError<ObjectId>) -> Self {
        match value {
            ArrangeError::LengthMismatch { expected, actual } => {
                Self::ReorderMismatch { expected, actual }
            }
            ArrangeError::Unknown(id) => Self::ObjectNotFound(id),
            ArrangeError::Duplicate(id) => Self::DuplicateReorderId(id),
        }
    }
}

/// Request model for creating an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewObject {
    pub name: String,
    pub description: Option<String>,
    pub color_hex: Option<String>,
    pub icon_name: Option<String>,
}

/// Replacement values for an object's editable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPatch {
    pub uuid: ObjectId,
    pub name: String,
    pub description: Option<String>,
    pub color_hex: Option<String>,
    pub icon_name: Option<String>,
}

/// Object service facade.
pub struct ObjectService<R: ObjectRepository> {
    repo: R,
}

impl<R: ObjectRepository> ObjectService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an object positioned after every existing object.
    pub fn create_object(&self, request: NewObject) -> Result<TrackedObject, ObjectServiceError> {
        let name = normalize_name(&request.name)?;
        let existing = self.repo.list_objects()?;

        let mut object = TrackedObject::new(name);
        object.description = normalize_optional(request.description);
        object.color_hex = request.color_hex;
        object.icon_name = request.icon_name;
        object.set_order(next_key(&existing));

        self.repo.create_object(&object)?;
        info!(
            "event=object_create module=service status=ok object_uuid={} sibling_count={}",
            object.uuid,
            existing.len()
        );
        Ok(object)
    }

    /// Replaces name, description, colour and icon of one object.
    pub fn update_object(&self, patch: ObjectPatch) -> Result<TrackedObject, ObjectServiceError> {
        let name = normalize_name(&patch.name)?;
        let mut object = self
            .repo
            .get_object(patch.uuid)?
            .ok_or(ObjectServiceError::ObjectNotFound(patch.uuid))?;

        object.name = name;
        object.description = normalize_optional(patch.description);
        object.color_hex = patch.color_hex;
        object.icon_name = patch.icon_name;

        self.repo.update_object(&object)?;
        info!(
            "event=object_update module=service status=ok object_uuid={}",
            object.uuid
        );
        Ok(object)
    }

    /// Gets one object by id.
    pub fn get_object(&self, id: ObjectId) -> Result<Option<TrackedObject>, ObjectServiceError> {
        self.repo.get_object(id).map_err(Into::into)
    }

    /// Lists objects in display order.
    pub fn list_objects(&self) -> Result<Vec<TrackedObject>, ObjectServiceError> {
        self.repo.list_objects().map_err(Into::into)
    }

    /// Applies a drag-and-drop reorder.
    ///
    /// `ordered_ids` is the full list after the gesture. Only the moved
    /// object's key is persisted; its id is returned. `Ok(None)` means the
    /// order was already consistent or could not be read as a single move.
    pub fn reorder_objects(
        &self,
        ordered_ids: &[ObjectId],
    ) -> Result<Option<ObjectId>, ObjectServiceError> {
        let objects = self.repo.list_objects()?;
        let mut arranged = arrange_in_order(objects, ordered_ids, |object| object.uuid)?;

        let Some(index) = apply_reorder(&mut arranged) else {
            return Ok(None);
        };
        let moved = &arranged[index];
        if let Some(key) = moved.order() {
            self.repo.update_sort_order(moved.uuid, key)?;
        }

        info!(
            "event=object_reorder module=service status=ok object_uuid={} position={} count={}",
            moved.uuid,
            index,
            arranged.len()
        );
        Ok(Some(moved.uuid))
    }

    /// Deletes one object together with its properties.
    pub fn delete_object(&self, id: ObjectId) -> Result<(), ObjectServiceError> {
        self.repo.delete_object(id)?;
        info!("event=object_delete module=service status=ok object_uuid={id}");
        Ok(())
    }
}

fn normalize_name(value: &str) -> Result<String, ObjectServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ObjectServiceError::InvalidName);
    }
    Ok(trimmed.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
