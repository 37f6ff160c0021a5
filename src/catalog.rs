//! Catalog administration: professionals, clients and services.
//!
//! Plain CRUD over the entity store with per-field validation. Deleting a
//! catalog record does not touch appointments; they keep their cached names.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::db::{DatabaseError, Entity, EntityStore};
use crate::models::{Client, Professional, Service};
use crate::scheduling::ValidationErrors;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
/// `(11) 98765-4321`, space after the area code optional.
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\d{2}\)\s?\d{4,5}-\d{4}$").unwrap());
/// CPF, `123.456.789-00`.
static NATIONAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}\.\d{3}\.\d{3}-\d{2}$").unwrap());

const MIN_NAME_CHARS: usize = 3;
const SERVICE_MIN_MINUTES: i64 = 5;
const SERVICE_MAX_MINUTES: i64 = 480;
const SERVICE_MIN_PRICE: f64 = 0.01;
const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

/// Form data for one catalog entity type.
pub trait CatalogInput {
    type Record: Entity;

    /// Build the record to store, or report every invalid field.
    fn build(
        &self,
        id: i64,
        active: bool,
        today: NaiveDate,
    ) -> Result<Self::Record, ValidationErrors>;

    /// Requested `active` flag; `None` keeps the current one on update.
    fn active(&self) -> Option<bool>;

    fn is_active(record: &Self::Record) -> bool;
}

pub fn list<E: Entity, S: EntityStore>(store: &S) -> Result<Vec<E>, CatalogError> {
    Ok(store.list::<E>()?)
}

pub fn get<E: Entity, S: EntityStore>(store: &S, id: i64) -> Result<E, CatalogError> {
    store.get::<E>(id)?.ok_or(CatalogError::NotFound {
        entity: E::ENTITY_TYPE,
        id,
    })
}

/// New records are always active.
pub fn create<I: CatalogInput, S: EntityStore>(
    store: &S,
    input: &I,
    today: NaiveDate,
) -> Result<I::Record, CatalogError> {
    let record = input.build(0, true, today)?;
    let saved = store.put(&record)?;
    tracing::info!(
        entity = <I::Record as Entity>::ENTITY_TYPE,
        id = saved.id(),
        "Catalog record created"
    );
    Ok(saved)
}

pub fn update<I: CatalogInput, S: EntityStore>(
    store: &S,
    id: i64,
    input: &I,
    today: NaiveDate,
) -> Result<I::Record, CatalogError> {
    store.atomically(|store| {
        let existing: I::Record = get(store, id)?;
        let active = input.active().unwrap_or_else(|| I::is_active(&existing));
        let record = input.build(id, active, today)?;
        let saved = store.put(&record)?;
        tracing::info!(
            entity = <I::Record as Entity>::ENTITY_TYPE,
            id,
            "Catalog record updated"
        );
        Ok(saved)
    })
}

pub fn delete<E: Entity, S: EntityStore>(store: &S, id: i64) -> Result<(), CatalogError> {
    store.atomically(|store| {
        get::<E, S>(store, id)?;
        store.remove_where::<E, _>(|record| record.id() == id)?;
        tracing::info!(entity = E::ENTITY_TYPE, id, "Catalog record deleted");
        Ok(())
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfessionalInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
    pub active: Option<bool>,
}

impl CatalogInput for ProfessionalInput {
    type Record = Professional;

    fn build(
        &self,
        id: i64,
        active: bool,
        _today: NaiveDate,
    ) -> Result<Professional, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "name", "Name", &self.name);
        check_email(&mut errors, &self.email);
        check_name(&mut errors, "specialty", "Specialty", &self.specialty);
        check_phone(&mut errors, &self.phone);

        errors.into_result(Professional {
            id,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            specialty: self.specialty.trim().to_string(),
            active,
        })
    }

    fn active(&self) -> Option<bool> {
        self.active
    }

    fn is_active(record: &Professional) -> bool {
        record.active
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub national_id: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    pub active: Option<bool>,
}

impl CatalogInput for ClientInput {
    type Record = Client;

    fn build(&self, id: i64, active: bool, today: NaiveDate) -> Result<Client, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "name", "Name", &self.name);
        check_email(&mut errors, &self.email);
        check_phone(&mut errors, &self.phone);

        let national_id = self.national_id.trim();
        if national_id.is_empty() {
            errors.add("national_id", "CPF is required");
        } else if !NATIONAL_ID.is_match(national_id) {
            errors.add("national_id", "Invalid CPF. Use the format 123.456.789-00");
        }

        let birth_date = match self.birth_date.trim() {
            "" => {
                errors.add("birth_date", "Birth date is required");
                None
            }
            raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) if date > today => {
                    errors.add("birth_date", "Birth date cannot be in the future");
                    None
                }
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("birth_date", "Invalid date. Use the YYYY-MM-DD format");
                    None
                }
            },
        };

        match birth_date {
            Some(birth_date) if errors.is_empty() => Ok(Client {
                id,
                name: self.name.trim().to_string(),
                email: self.email.trim().to_string(),
                phone: self.phone.trim().to_string(),
                national_id: national_id.to_string(),
                birth_date,
                active,
            }),
            _ => Err(errors),
        }
    }

    fn active(&self) -> Option<bool> {
        self.active
    }

    fn is_active(record: &Client) -> bool {
        record.active
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceInput {
    pub name: String,
    pub duration_minutes: Option<i64>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

impl CatalogInput for ServiceInput {
    type Record = Service;

    fn build(
        &self,
        id: i64,
        active: bool,
        _today: NaiveDate,
    ) -> Result<Service, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "name", "Name", &self.name);

        let duration = match self.duration_minutes {
            None => {
                errors.add("duration_minutes", "Duration is required");
                None
            }
            Some(m) if m < SERVICE_MIN_MINUTES => {
                errors.add(
                    "duration_minutes",
                    format!("Minimum duration is {SERVICE_MIN_MINUTES} minutes"),
                );
                None
            }
            Some(m) if m > SERVICE_MAX_MINUTES => {
                errors.add(
                    "duration_minutes",
                    format!("Maximum duration is {SERVICE_MAX_MINUTES} minutes"),
                );
                None
            }
            Some(m) => u32::try_from(m).ok(),
        };

        match self.price {
            None => errors.add("price", "Price is required"),
            Some(p) if !p.is_finite() || p < SERVICE_MIN_PRICE => {
                errors.add("price", format!("Minimum price is {SERVICE_MIN_PRICE:.2}"))
            }
            Some(_) => (),
        }

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if description
            .as_ref()
            .is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS)
        {
            errors.add(
                "description",
                format!("Description must be at most {DESCRIPTION_MAX_CHARS} characters"),
            );
        }

        match (duration, self.price) {
            (Some(duration_minutes), Some(price)) if errors.is_empty() => Ok(Service {
                id,
                name: self.name.trim().to_string(),
                duration_minutes,
                price,
                description,
                active,
            }),
            _ => Err(errors),
        }
    }

    fn active(&self) -> Option<bool> {
        self.active
    }

    fn is_active(record: &Service) -> bool {
        record.active
    }
}

fn check_name(errors: &mut ValidationErrors, field: &str, label: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, format!("{label} is required"));
    } else if value.chars().count() < MIN_NAME_CHARS {
        errors.add(
            field,
            format!("{label} must be at least {MIN_NAME_CHARS} characters"),
        );
    }
}

fn check_email(errors: &mut ValidationErrors, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.add("email", "Email is required");
    } else if !EMAIL.is_match(value) {
        errors.add("email", "Invalid email address");
    }
}

fn check_phone(errors: &mut ValidationErrors, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.add("phone", "Phone is required");
    } else if !PHONE.is_match(value) {
        errors.add("phone", "Invalid phone. Use the format (11) 98765-4321");
    }
}
