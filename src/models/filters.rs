use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::appointment::Appointment;
use super::enums::AppointmentStatus;

/// Listing/report filter. Every criterion is optional; date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub professional_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

impl AppointmentFilter {
    pub fn matches(&self, appt: &Appointment) -> bool {
        self.start_date.map_or(true, |d| appt.date >= d)
            && self.end_date.map_or(true, |d| appt.date <= d)
            && self.status.map_or(true, |s| appt.status == s)
            && self.professional_id.map_or(true, |p| appt.professional_id == p)
            && self.date.map_or(true, |d| appt.date == d)
    }
}
