//! API endpoint handlers, grouped by resource.

pub mod appointments;
pub mod catalog;
pub mod health;
pub mod reports;
pub mod slots;
