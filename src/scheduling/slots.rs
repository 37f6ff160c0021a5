//! Slot calculator: free time labels for a professional on a day.
//!
//! Pure read + compute over the entity store: candidate slots from the
//! working-hours policy minus the times held by non-cancelled appointments.
//! Past dates are not special here; rejecting them is the validator's job.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::hours::HoursPolicy;
use crate::db::{DatabaseError, EntityStore};
use crate::models::{Appointment, TimeSlot};

#[derive(Debug, Clone)]
pub struct SlotCalculator<P> {
    policy: P,
}

impl<P: HoursPolicy> SlotCalculator<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Every bookable label for the day, booked or not.
    pub fn candidate_slots(&self, professional_id: i64, date: NaiveDate) -> Vec<TimeSlot> {
        self.policy.hours_for(professional_id, date).candidate_slots()
    }

    /// Times held by non-cancelled appointments, optionally ignoring one appointment.
    pub fn booked_slots<S: EntityStore>(
        &self,
        store: &S,
        professional_id: i64,
        date: NaiveDate,
        exclude_appointment_id: Option<i64>,
    ) -> Result<BTreeSet<TimeSlot>, DatabaseError> {
        let booked = store
            .list::<Appointment>()?
            .into_iter()
            .filter(|a| a.occupies(professional_id, date))
            .filter(|a| Some(a.id) != exclude_appointment_id)
            .map(|a| a.time)
            .collect();
        Ok(booked)
    }

    /// Ordered free labels. Empty means no availability, not an error.
    pub fn free_slots<S: EntityStore>(
        &self,
        store: &S,
        professional_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, DatabaseError> {
        self.compute_free(store, professional_id, date, None)
    }

    /// Free labels as seen by `appointment_id` itself: its own slot counts as free.
    pub fn free_slots_excluding<S: EntityStore>(
        &self,
        store: &S,
        professional_id: i64,
        date: NaiveDate,
        appointment_id: i64,
    ) -> Result<Vec<TimeSlot>, DatabaseError> {
        self.compute_free(store, professional_id, date, Some(appointment_id))
    }

    fn compute_free<S: EntityStore>(
        &self,
        store: &S,
        professional_id: i64,
        date: NaiveDate,
        exclude_appointment_id: Option<i64>,
    ) -> Result<Vec<TimeSlot>, DatabaseError> {
        let booked = self.booked_slots(store, professional_id, date, exclude_appointment_id)?;
        let free: Vec<TimeSlot> = self
            .candidate_slots(professional_id, date)
            .into_iter()
            .filter(|slot| !booked.contains(slot))
            .collect();

        tracing::debug!(
            professional_id,
            %date,
            booked = booked.len(),
            free = free.len(),
            "Computed free slots"
        );
        Ok(free)
    }
}
