//! Working-hours policy: the daily window and slot granularity that define
//! which time labels are bookable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::TimeSlot;

/// Daily bookable window `[open, close)` split into fixed increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingHours {
    pub open: TimeSlot,
    pub close: TimeSlot,
    pub granularity_minutes: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            open: TimeSlot::new(9, 0).expect("09:00 is a valid time"),
            close: TimeSlot::new(18, 0).expect("18:00 is a valid time"),
            granularity_minutes: 30,
        }
    }
}

impl WorkingHours {
    pub fn new(open: TimeSlot, close: TimeSlot, granularity_minutes: u32) -> Result<Self, String> {
        let hours = Self {
            open,
            close,
            granularity_minutes,
        };
        hours.validate()?;
        Ok(hours)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.open >= self.close {
            return Err(format!(
                "opening time {} must be before closing time {}",
                self.open, self.close
            ));
        }
        let window = self.window_minutes();
        if self.granularity_minutes == 0 || self.granularity_minutes > window {
            return Err(format!(
                "slot length must be between 1 and {window} minutes, got {}",
                self.granularity_minutes
            ));
        }
        Ok(())
    }

    fn window_minutes(&self) -> u32 {
        self.close.minutes_of_day().saturating_sub(self.open.minutes_of_day())
    }

    /// Every slot start in the window, ascending. A slot is included when it
    /// starts before closing time.
    pub fn candidate_slots(&self) -> Vec<TimeSlot> {
        let step = self.granularity_minutes.max(1) as usize;
        (self.open.minutes_of_day()..self.close.minutes_of_day())
            .step_by(step)
            .filter_map(TimeSlot::from_minutes)
            .collect()
    }

    /// Whether `slot` is one of `candidate_slots()`.
    pub fn contains(&self, slot: TimeSlot) -> bool {
        slot >= self.open && slot < self.close && self.is_aligned(slot)
    }

    /// Alignment is measured from opening time, not from the top of the hour.
    pub fn is_aligned(&self, slot: TimeSlot) -> bool {
        let granularity = self.granularity_minutes.max(1);
        slot.minutes_of_day()
            .checked_sub(self.open.minutes_of_day())
            .is_some_and(|offset| offset % granularity == 0)
    }
}

/// Resolves the working hours that apply to a professional on a given day.
pub trait HoursPolicy {
    fn hours_for(&self, professional_id: i64, date: NaiveDate) -> WorkingHours;
}

/// One calendar for everyone.
impl HoursPolicy for WorkingHours {
    fn hours_for(&self, _professional_id: i64, _date: NaiveDate) -> WorkingHours {
        *self
    }
}

impl<P: HoursPolicy + ?Sized> HoursPolicy for &P {
    fn hours_for(&self, professional_id: i64, date: NaiveDate) -> WorkingHours {
        (**self).hours_for(professional_id, date)
    }
}
