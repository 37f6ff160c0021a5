use std::str::FromStr;

use rusqlite::types::Value;
use rusqlite::Row;

use super::{conversion_error, date_value, datetime_value, opt_text, read_date, read_datetime, Entity};
use crate::models::{Appointment, AppointmentStatus, TimeSlot};

impl Entity for Appointment {
    const ENTITY_TYPE: &'static str = "Appointment";
    const TABLE: &'static str = "appointments";
    const COLUMNS: &'static [&'static str] = &[
        "client_id",
        "client_name",
        "professional_id",
        "professional_name",
        "service_id",
        "service_name",
        "date",
        "time",
        "status",
        "notes",
        "created_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let time: String = row.get(8)?;
        let status: String = row.get(9)?;
        Ok(Appointment {
            id: row.get(0)?,
            client_id: row.get(1)?,
            client_name: row.get(2)?,
            professional_id: row.get(3)?,
            professional_name: row.get(4)?,
            service_id: row.get(5)?,
            service_name: row.get(6)?,
            date: read_date(row, 7)?,
            time: TimeSlot::from_str(&time).map_err(|e| conversion_error(8, e))?,
            status: AppointmentStatus::from_str(&status).map_err(|e| conversion_error(9, e))?,
            notes: row.get(10)?,
            created_at: read_datetime(row, 11)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.client_id),
            Value::Text(self.client_name.clone()),
            Value::Integer(self.professional_id),
            Value::Text(self.professional_name.clone()),
            Value::Integer(self.service_id),
            Value::Text(self.service_name.clone()),
            date_value(&self.date),
            Value::Text(self.time.to_string()),
            Value::Text(self.status.as_str().to_string()),
            opt_text(&self.notes),
            datetime_value(&self.created_at),
        ]
    }
}
