//! Tracked object domain model.
//!
//! # Responsibility
//! - Define the user-created object that owns typed properties.
//! - Validate presentation metadata (name, colour, icon) before persistence.
//!
//! # Invariants
//! - `uuid` is stable and never nil.
//! - `name` is never blank.
//! - `color_hex` is six hex digits when set.
//! - `sort_order` is an order key from `crate::ordering`; objects in one
//!   store form a single ordered list.

use crate::ordering::Orderable;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for tracked objects.
pub type ObjectId = Uuid;

/// Icon shown when an object has no explicit icon.
pub const DEFAULT_ICON_NAME: &str = "cube.fill";

/// Preset colours offered when creating an object.
pub const COLOR_PALETTE: [&str; 11] = [
    "F94144", "F3722C", "F9C74F", "90BE6D", "43AA8B", "577590", "4D96FF", "6C63FF", "B5179E",
    "FF6B6B", "FFD166",
];

static COLOR_HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{6}$").expect("valid color hex regex"));

/// Validation failures for `TrackedObject`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectValidationError {
    /// The nil UUID cannot identify an object.
    NilUuid,
    /// Name is empty after trimming.
    BlankName,
    /// Colour is not six hex digits.
    InvalidColorHex(String),
}

impl Display for ObjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "object uuid must not be nil"),
            Self::BlankName => write!(f, "object name must not be blank"),
            Self::InvalidColorHex(value) => {
                write!(f, "object color `{value}` must be six hex digits")
            }
        }
    }
}

impl Error for ObjectValidationError {}

/// User-created object whose properties are tracked over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedObject {
    pub uuid: ObjectId,
    pub name: String,
    pub description: Option<String>,
    /// Uppercase or lowercase `RRGGBB`, without `#`.
    pub color_hex: Option<String>,
    pub icon_name: Option<String>,
    /// Fractional order key; `None` until positioned.
    pub sort_order: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl TrackedObject {
    /// Creates an unpositioned object with a generated ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            description: None,
            color_hex: None,
            icon_name: None,
            sort_order: None,
            created_at: now_epoch_ms(),
        }
    }

    /// Creates an object with a caller-provided ID.
    ///
    /// # Errors
    /// - `ObjectValidationError::NilUuid` for `Uuid::nil()`.
    pub fn with_id(uuid: ObjectId, name: impl Into<String>) -> Result<Self, ObjectValidationError> {
        if uuid.is_nil() {
            return Err(ObjectValidationError::NilUuid);
        }
        let mut object = Self::new(name);
        object.uuid = uuid;
        Ok(object)
    }

    /// Checks object invariants before persistence.
    pub fn validate(&self) -> Result<(), ObjectValidationError> {
        if self.uuid.is_nil() {
            return Err(ObjectValidationError::NilUuid);
        }
        if self.name.trim().is_empty() {
            return Err(ObjectValidationError::BlankName);
        }
        if let Some(color) = self.color_hex.as_deref() {
            if !COLOR_HEX_RE.is_match(color) {
                return Err(ObjectValidationError::InvalidColorHex(color.to_string()));
            }
        }
        Ok(())
    }

    /// Icon to render, falling back to `DEFAULT_ICON_NAME`.
    pub fn display_icon_name(&self) -> &str {
        self.icon_name.as_deref().unwrap_or(DEFAULT_ICON_NAME)
    }

    /// Colour as `(r, g, b)` bytes, when set and well-formed.
    pub fn display_rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color_hex.as_deref()?;
        if !COLOR_HEX_RE.is_match(hex) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some((
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        ))
    }
}

impl Orderable for TrackedObject {
    fn order(&self) -> Option<&str> {
        self.sort_order.as_deref()
    }

    fn set_order(&mut self, order: String) {
        self.sort_order = Some(order);
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
