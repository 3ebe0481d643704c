use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::users;

/// The slice of the platform user record the coin economy owns or reads.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub coin_balance: i32,
}
