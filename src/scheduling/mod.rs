//! Scheduling core.
//!
//! - `hours`: working-hours policy (bookable window and slot granularity)
//! - `slots`: free-slot calculation per professional and day
//! - `validation`: shape checks on raw appointment submissions
//! - `lifecycle`: create, update, cancel, complete, delete
//! - `notify`: fire-and-forget appointment events
//! - `summary`: dashboard counts and report filtering

pub mod error;
pub mod hours;
pub mod lifecycle;
pub mod notify;
pub mod slots;
pub mod summary;
pub mod validation;

pub use error::SchedulingError;
pub use hours::{HoursPolicy, WorkingHours};
pub use lifecycle::AppointmentLifecycle;
pub use notify::{
    spawn_event_logger, AppointmentEvent, ChannelNotifier, EventKind, NoopNotifier, Notifier,
};
pub use slots::SlotCalculator;
pub use summary::{filter_appointments, summarize, validate_filter, StatusCounts, Summary};
pub use validation::{
    validate_appointment, AppointmentSubmission, ValidatedAppointment, ValidationErrors,
};
