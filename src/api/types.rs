//! Shared types for the API layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core_state::CoreState;
use crate::models::Appointment;
use crate::scheduling::{AppointmentSubmission, StatusCounts};

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// `?date=YYYY-MM-DD` for the slot listing.
#[derive(Debug, Default, Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
}

/// Partial appointment edit. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppointmentPatch {
    pub client_id: Option<i64>,
    pub professional_id: Option<i64>,
    pub service_id: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

impl AppointmentPatch {
    /// Merge over `current`, producing a full submission for the validator.
    pub fn merge_over(self, current: &Appointment) -> AppointmentSubmission {
        AppointmentSubmission {
            client_id: self.client_id.or(Some(current.client_id)),
            professional_id: self.professional_id.or(Some(current.professional_id)),
            service_id: self.service_id.or(Some(current.service_id)),
            date: self.date.or_else(|| Some(current.date.to_string())),
            time: self.time.or_else(|| Some(current.time.to_string())),
            notes: self.notes.or_else(|| current.notes.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub counts: StatusCounts,
    pub appointments: Vec<Appointment>,
}
