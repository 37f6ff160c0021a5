use rusqlite::types::Value;
use rusqlite::Row;

use super::{opt_text, Entity};
use crate::models::Service;

impl Entity for Service {
    const ENTITY_TYPE: &'static str = "Service";
    const TABLE: &'static str = "services";
    const COLUMNS: &'static [&'static str] =
        &["name", "duration_minutes", "price", "description", "active"];

    fn id(&self) -> i64 {
        self.id
    }

    fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Service {
            id: row.get(0)?,
            name: row.get(1)?,
            duration_minutes: row.get(2)?,
            price: row.get(3)?,
            description: row.get(4)?,
            active: row.get(5)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Integer(i64::from(self.duration_minutes)),
            Value::Real(self.price),
            opt_text(&self.description),
            Value::from(self.active),
        ]
    }
}
