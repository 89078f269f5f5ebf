use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: uuid::Uuid,
    pub email: String,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: time::OffsetDateTime,
}

/// Identity returned by the external provider after a successful code exchange.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub provider: String,
    pub uid: String,
    pub email: String,
    pub display_name: String,
}
