use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Contact details for a candidate, read from the `applicants` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ApplicantContact {
    pub id: String,
    pub name: String,
    pub email: String,
}
