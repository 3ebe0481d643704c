use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::coin_packs},
};
use domain::{
    entities::coin_packs::{CoinPackEntity, UpsertCoinPackEntity},
    repositories::coin_packs::CoinPackRepository,
};

pub struct CoinPackPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CoinPackPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CoinPackRepository for CoinPackPostgres {
    async fn list_active(&self) -> Result<Vec<CoinPackEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = coin_packs::table
            .filter(coin_packs::is_active.eq(true))
            .order((coin_packs::sort_order.asc(), coin_packs::price.asc()))
            .select(CoinPackEntity::as_select())
            .load::<CoinPackEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_by_id(&self, coin_pack_id: Uuid) -> Result<Option<CoinPackEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = coin_packs::table
            .filter(coin_packs::id.eq(coin_pack_id))
            .select(CoinPackEntity::as_select())
            .first::<CoinPackEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn upsert_by_name(&self, pack: UpsertCoinPackEntity) -> Result<CoinPackEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(coin_packs::table)
            .values(&pack)
            .on_conflict(coin_packs::name)
            .do_update()
            .set((&pack, coin_packs::updated_at.eq(Utc::now())))
            .returning(CoinPackEntity::as_returning())
            .get_result::<CoinPackEntity>(&mut conn)?;

        Ok(result)
    }
}
