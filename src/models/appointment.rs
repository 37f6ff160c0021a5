use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;
use super::slot::TimeSlot;

/// A booking of one client with one professional for one service.
///
/// `client_name`, `professional_name` and `service_name` are snapshots taken
/// when the appointment was created or last updated. Identity always goes
/// through the `*_id` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub professional_id: i64,
    pub professional_name: String,
    pub service_id: i64,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Appointment {
    /// True when this appointment holds a slot of `professional_id` on `date`.
    pub fn occupies(&self, professional_id: i64, date: NaiveDate) -> bool {
        self.professional_id == professional_id
            && self.date == date
            && self.status.occupies_slot()
    }
}
