//! Core domain logic for the object tracker.
//!
//! Objects are user-ordered; each carries typed properties whose values are
//! kept as history. Ordering uses fractional keys so a move rewrites one row.

pub mod db;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LogTarget};
pub use model::object::{
    ObjectId, ObjectValidationError, TrackedObject, COLOR_PALETTE, DEFAULT_ICON_NAME,
};
pub use model::property::{
    Property, PropertyId, PropertyType, PropertyValidationError, PropertyValue,
};
pub use ordering::{apply_reorder, generate_key_between, next_key, Orderable, DEFAULT_START_KEY};
pub use repo::object_repo::{ObjectRepository, SqliteObjectRepository};
pub use repo::property_repo::{PropertyRepository, SqlitePropertyRepository};
pub use repo::{RepoError, RepoResult};
pub use service::object_service::{NewObject, ObjectPatch, ObjectService, ObjectServiceError};
pub use service::property_service::{NewProperty, PropertyService, PropertyServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
