use rusqlite::types::Value;
use rusqlite::Row;

use super::{date_value, read_date, Entity};
use crate::models::Client;

impl Entity for Client {
    const ENTITY_TYPE: &'static str = "Client";
    const TABLE: &'static str = "clients";
    const COLUMNS: &'static [&'static str] =
        &["name", "email", "phone", "national_id", "birth_date", "active"];

    fn id(&self) -> i64 {
        self.id
    }

    fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Client {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            national_id: row.get(4)?,
            birth_date: read_date(row, 5)?,
            active: row.get(6)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.email.clone()),
            Value::Text(self.phone.clone()),
            Value::Text(self.national_id.clone()),
            date_value(&self.birth_date),
            Value::from(self.active),
        ]
    }
}
