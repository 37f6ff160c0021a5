use chrono::NaiveDate;
use thiserror::Error;

use super::validation::ValidationErrors;
use crate::db::DatabaseError;
use crate::models::{AppointmentStatus, TimeSlot};

/// Failures of scheduling operations.
#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Slot {time} on {date} is already taken for professional {professional_id}")]
    SlotConflict {
        professional_id: i64,
        date: NaiveDate,
        time: TimeSlot,
    },

    #[error("Cannot {action} appointment {id}: it is {from}")]
    InvalidTransition {
        id: i64,
        from: AppointmentStatus,
        action: &'static str,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

impl SchedulingError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }
}
