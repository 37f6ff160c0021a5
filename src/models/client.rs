use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// CPF, formatted `123.456.789-00`.
    pub national_id: String,
    pub birth_date: NaiveDate,
    pub active: bool,
}
