//! Appointment validator: shape and format checks on a submission before it
//! reaches the lifecycle manager.
//!
//! All-or-nothing: every field is checked and every problem reported, keyed
//! by field name. Existence of the referenced records is not checked here.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::hours::HoursPolicy;
use crate::models::TimeSlot;

/// Field-keyed, human-readable validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single failing field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Raw appointment form as submitted by a client UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentSubmission {
    pub client_id: Option<i64>,
    pub professional_id: Option<i64>,
    pub service_id: Option<i64>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// `HH:MM`
    pub time: Option<String>,
    pub notes: Option<String>,
}

/// A submission that passed validation. Only `validate_appointment` builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAppointment {
    client_id: i64,
    professional_id: i64,
    service_id: i64,
    date: NaiveDate,
    time: TimeSlot,
    notes: Option<String>,
}

impl ValidatedAppointment {
    pub fn client_id(&self) -> i64 {
        self.client_id
    }

    pub fn professional_id(&self) -> i64 {
        self.professional_id
    }

    pub fn service_id(&self) -> i64 {
        self.service_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> TimeSlot {
        self.time
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Validate every field of `submission`.
///
/// `today` is the current local date; dates before it are rejected. The time
/// must be a well-formed `HH:MM` label and, once the professional and date are
/// known, one of the slots the policy defines for them.
pub fn validate_appointment<P: HoursPolicy>(
    submission: &AppointmentSubmission,
    policy: &P,
    today: NaiveDate,
    notes_max_chars: usize,
) -> Result<ValidatedAppointment, ValidationErrors> {
    let client_id = required_id("Client", submission.client_id);
    let professional_id = required_id("Professional", submission.professional_id);
    let service_id = required_id("Service", submission.service_id);
    let date = parse_date(&submission.date, today);

    // The slot can only be checked against the hours once professional and date are known
    let time = parse_time(&submission.time).and_then(|slot| match (&professional_id, &date) {
        (Ok(pid), Ok(day)) => {
            let hours = policy.hours_for(*pid, *day);
            if hours.contains(slot) {
                Ok(slot)
            } else {
                Err(format!(
                    "Time must be a {}-minute slot between {} and {}",
                    hours.granularity_minutes, hours.open, hours.close
                ))
            }
        }
        _ => Ok(slot),
    });

    let notes = match non_blank(&submission.notes) {
        Some(text) if text.chars().count() > notes_max_chars => {
            Err(format!("Notes must be at most {notes_max_chars} characters"))
        }
        other => Ok(other.map(str::to_string)),
    };

    match (client_id, professional_id, service_id, date, time, notes) {
        (
            Ok(client_id),
            Ok(professional_id),
            Ok(service_id),
            Ok(date),
            Ok(time),
            Ok(notes),
        ) => Ok(ValidatedAppointment {
            client_id,
            professional_id,
            service_id,
            date,
            time,
            notes,
        }),
        // At least one field failed, so at least one message is recorded
        (client_id, professional_id, service_id, date, time, notes) => {
            let mut errors = ValidationErrors::new();
            record(&mut errors, "client_id", client_id);
            record(&mut errors, "professional_id", professional_id);
            record(&mut errors, "service_id", service_id);
            record(&mut errors, "date", date);
            record(&mut errors, "time", time);
            record(&mut errors, "notes", notes);
            tracing::debug!(%errors, "Appointment submission rejected");
            Err(errors)
        }
    }
}

fn record<T>(errors: &mut ValidationErrors, field: &str, result: Result<T, String>) {
    if let Err(message) = result {
        errors.add(field, message);
    }
}

fn required_id(label: &str, value: Option<i64>) -> Result<i64, String> {
    match value {
        Some(id) if id > 0 => Ok(id),
        Some(_) => Err(format!("{label} must be a positive identifier")),
        None => Err(format!("{label} is required")),
    }
}

fn parse_date(value: &Option<String>, today: NaiveDate) -> Result<NaiveDate, String> {
    let raw = non_blank(value).ok_or("Date is required")?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) if date < today => Err("Date cannot be in the past".into()),
        Ok(date) => Ok(date),
        Err(_) => Err("Invalid date. Use the YYYY-MM-DD format".into()),
    }
}

fn parse_time(value: &Option<String>) -> Result<TimeSlot, String> {
    let raw = non_blank(value).ok_or("Time is required")?;
    raw.parse::<TimeSlot>()
        .map_err(|_| "Invalid time. Use the HH:MM format".to_string())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::WorkingHours;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    fn valid() -> AppointmentSubmission {
        AppointmentSubmission {
            client_id: Some(1),
            professional_id: Some(2),
            service_id: Some(3),
            date: Some("2025-10-10".into()),
            time: Some("09:30".into()),
            notes: Some("Primeira visita".into()),
        }
    }

    fn check(sub: &AppointmentSubmission) -> Result<ValidatedAppointment, ValidationErrors> {
        validate_appointment(sub, &WorkingHours::default(), today(), 500)
    }

    #[test]
    fn accepts_complete_submission() {
        let ok = check(&valid()).unwrap();
        assert_eq!(ok.client_id(), 1);
        assert_eq!(ok.professional_id(), 2);
        assert_eq!(ok.service_id(), 3);
        assert_eq!(ok.date(), NaiveDate::from_ymd_opt(2025, 10, 10).unwrap());
        assert_eq!(ok.time().to_string(), "09:30");
        assert_eq!(ok.notes(), Some("Primeira visita"));
    }

    #[test]
    fn empty_submission_reports_every_required_field() {
        let errors = check(&AppointmentSubmission::default()).unwrap_err();
        for field in ["client_id", "professional_id", "service_id", "date", "time"] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
        assert!(errors.get("notes").is_none());
    }

    #[test]
    fn non_positive_ids_rejected() {
        let sub = AppointmentSubmission {
            client_id: Some(0),
            service_id: Some(-4),
            ..valid()
        };
        let errors = check(&sub).unwrap_err();
        assert_eq!(
            errors.get("client_id").unwrap(),
            ["Client must be a positive identifier"]
        );
        assert!(errors.get("service_id").is_some());
        assert!(errors.get("professional_id").is_none());
    }

    #[test]
    fn today_is_allowed_yesterday_is_not() {
        let sub = AppointmentSubmission {
            date: Some("2025-10-01".into()),
            ..valid()
        };
        assert!(check(&sub).is_ok());

        let sub = AppointmentSubmission {
            date: Some("2025-09-30".into()),
            ..valid()
        };
        let errors = check(&sub).unwrap_err();
        assert_eq!(errors.get("date").unwrap(), ["Date cannot be in the past"]);
    }

    #[test]
    fn unparseable_date_rejected() {
        for bad in ["10/10/2025", "2025-13-01", "tomorrow"] {
            let sub = AppointmentSubmission {
                date: Some(bad.into()),
                ..valid()
            };
            assert!(check(&sub).unwrap_err().get("date").is_some(), "accepted {bad}");
        }
    }

    #[test]
    fn malformed_time_rejected() {
        for bad in ["9:30", "0930", "09:30:00", "25:00"] {
            let sub = AppointmentSubmission {
                time: Some(bad.into()),
                ..valid()
            };
            let errors = check(&sub).unwrap_err();
            assert_eq!(
                errors.get("time").unwrap(),
                ["Invalid time. Use the HH:MM format"],
                "for {bad}"
            );
        }
    }

    #[test]
    fn off_grid_or_out_of_hours_time_rejected() {
        for bad in ["09:15", "08:30", "18:00", "21:00"] {
            let sub = AppointmentSubmission {
                time: Some(bad.into()),
                ..valid()
            };
            let errors = check(&sub).unwrap_err();
            assert!(
                errors.get("time").unwrap()[0].contains("30-minute slot"),
                "for {bad}"
            );
        }
    }

    #[test]
    fn notes_length_is_bounded_in_characters() {
        let sub = AppointmentSubmission {
            notes: Some("é".repeat(500)),
            ..valid()
        };
        assert!(check(&sub).is_ok());

        let sub = AppointmentSubmission {
            notes: Some("a".repeat(501)),
            ..valid()
        };
        assert!(check(&sub).unwrap_err().get("notes").is_some());
    }

    #[test]
    fn blank_notes_become_none() {
        let sub = AppointmentSubmission {
            notes: Some("   ".into()),
            ..valid()
        };
        assert_eq!(check(&sub).unwrap().notes(), None);
    }

    #[test]
    fn multiple_failures_are_all_reported() {
        let sub = AppointmentSubmission {
            client_id: None,
            date: Some("2020-01-01".into()),
            time: Some("noon".into()),
            ..valid()
        };
        let errors = check(&sub).unwrap_err();
        assert_eq!(errors.fields().len(), 3);
        let rendered = errors.to_string();
        assert!(rendered.contains("client_id: Client is required"));
        assert!(rendered.contains("date: Date cannot be in the past"));
    }

    #[test]
    fn any_single_failure_names_exactly_its_field() {
        let cases = [
            ("client_id", AppointmentSubmission { client_id: Some(0), ..valid() }),
            ("professional_id", AppointmentSubmission { professional_id: None, ..valid() }),
            ("service_id", AppointmentSubmission { service_id: Some(-4), ..valid() }),
            ("date", AppointmentSubmission { date: Some("10/10/2025".into()), ..valid() }),
            ("time", AppointmentSubmission { time: Some("09:10".into()), ..valid() }),
            ("notes", AppointmentSubmission { notes: Some("a".repeat(501)), ..valid() }),
        ];
        for (field, sub) in cases {
            let errors = check(&sub).unwrap_err();
            assert!(!errors.is_empty(), "{field}: rejected without a message");
            let keys: Vec<&str> = errors.fields().keys().map(String::as_str).collect();
            assert_eq!(keys, vec![field], "{field}");
        }
    }

    #[test]
    fn errors_serialize_as_field_map() {
        let errors = ValidationErrors::single("time", "Time is required");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["time"][0], "Time is required");
    }
}
