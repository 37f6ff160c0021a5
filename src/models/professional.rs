use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professional {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
    pub active: bool,
}
