use serde::{Deserialize, Serialize};

/// A registered user as returned by `/api/register` and `/api/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub phone: String,
}
