use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub invite_pending: bool,
}
