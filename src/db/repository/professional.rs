use rusqlite::types::Value;
use rusqlite::Row;

use super::Entity;
use crate::models::Professional;

impl Entity for Professional {
    const ENTITY_TYPE: &'static str = "Professional";
    const TABLE: &'static str = "professionals";
    const COLUMNS: &'static [&'static str] = &["name", "email", "phone", "specialty", "active"];

    fn id(&self) -> i64 {
        self.id
    }

    fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Professional {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            specialty: row.get(4)?,
            active: row.get(5)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.email.clone()),
            Value::Text(self.phone.clone()),
            Value::Text(self.specialty.clone()),
            Value::from(self.active),
        ]
    }
}
