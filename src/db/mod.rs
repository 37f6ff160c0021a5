pub mod repository;
pub mod sqlite;
pub mod store;

pub use repository::*;
pub use sqlite::*;
pub use store::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Uniqueness violated: {0}")]
    UniqueViolation(String),

    #[error("Invalid {entity_type} record: {reason}")]
    InvalidRecord { entity_type: String, reason: String },
}

impl DatabaseError {
    /// Classify a write error: SQLite constraint failures get their own variants.
    pub(crate) fn from_write(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = msg.clone().unwrap_or_else(|| code.to_string());
                if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
                    DatabaseError::UniqueViolation(detail)
                } else {
                    DatabaseError::ConstraintViolation(detail)
                }
            }
            _ => DatabaseError::Sqlite(err),
        }
    }
}
