use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::coin_spends;

/// Existence of a row is the unlock predicate for (user_id, chapter_id).
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = coin_spends)]
pub struct CoinSpendEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub chapter_id: Uuid,
    pub novel_id: Uuid,
    pub amount: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coin_spends)]
pub struct InsertCoinSpendEntity {
    pub user_id: Uuid,
    pub chapter_id: Uuid,
    pub novel_id: Uuid,
    pub amount: i32,
}
