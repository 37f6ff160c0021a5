//! Summary and report aggregation over the current store snapshot.
//!
//! Read only. Everything is recomputed on each call.

use chrono::NaiveDate;
use serde::Serialize;

use super::validation::ValidationErrors;
use crate::db::{DatabaseError, EntityStore};
use crate::models::{
    Appointment, AppointmentFilter, AppointmentStatus, Client, Professional, Service,
};

/// Appointment counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub scheduled: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn tally<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> Self {
        let mut counts = Self::default();
        for appt in appointments {
            counts.total += 1;
            match appt.status {
                AppointmentStatus::Scheduled => counts.scheduled += 1,
                AppointmentStatus::Completed => counts.completed += 1,
                AppointmentStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }
}

/// Point-in-time counts for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_appointments: usize,
    pub scheduled: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total_clients: usize,
    pub total_professionals: usize,
    pub total_services: usize,
    /// Scheduled appointments dated `today`.
    pub scheduled_today: usize,
    /// Scheduled appointments dated `today` or later.
    pub upcoming: usize,
}

pub fn summarize<S: EntityStore>(store: &S, today: NaiveDate) -> Result<Summary, DatabaseError> {
    let appointments = store.list::<Appointment>()?;
    let counts = StatusCounts::tally(&appointments);
    let scheduled = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Scheduled);

    Ok(Summary {
        total_appointments: counts.total,
        scheduled: counts.scheduled,
        completed: counts.completed,
        cancelled: counts.cancelled,
        total_clients: store.list::<Client>()?.len(),
        total_professionals: store.list::<Professional>()?.len(),
        total_services: store.list::<Service>()?.len(),
        scheduled_today: scheduled.clone().filter(|a| a.date == today).count(),
        upcoming: scheduled.filter(|a| a.date >= today).count(),
    })
}

/// A period whose end precedes its start is rejected.
pub fn validate_filter(filter: &AppointmentFilter) -> Result<(), ValidationErrors> {
    match (filter.start_date, filter.end_date) {
        (Some(start), Some(end)) if end < start => Err(ValidationErrors::single(
            "end_date",
            "End date must not be earlier than start date",
        )),
        _ => Ok(()),
    }
}

/// Matching appointments ordered by date, then time, then id.
pub fn filter_appointments<S: EntityStore>(
    store: &S,
    filter: &AppointmentFilter,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut matching: Vec<Appointment> = store
        .list::<Appointment>()?
        .into_iter()
        .filter(|a| filter.matches(a))
        .collect();
    matching.sort_by(|a, b| (a.date, a.time, a.id).cmp(&(b.date, b.time, b.id)));
    Ok(matching)
}
