use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::coin_packs;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = coin_packs)]
pub struct CoinPackEntity {
    pub id: Uuid,
    pub name: String,
    pub price: i32,
    pub coins: i32,
    pub bonus_coins: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CoinPackEntity {
    /// `None` when `coins + bonus_coins` does not fit in an `i32`.
    pub fn total_coins(&self) -> Option<i32> {
        self.coins.checked_add(self.bonus_coins)
    }
}

/// Insert-or-update payload keyed by `name`.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = coin_packs)]
pub struct UpsertCoinPackEntity {
    pub name: String,
    pub price: i32,
    pub coins: i32,
    pub bonus_coins: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub sort_order: i32,
}
