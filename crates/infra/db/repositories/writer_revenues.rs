use anyhow::Result;
use async_trait::async_trait;
use diesel::{dsl::sum, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::writer_revenues},
};
use domain::{
    entities::writer_revenues::WriterRevenueEntity,
    repositories::writer_revenues::WriterRevenueRepository,
    value_objects::writer_revenues::WriterRevenueTotals,
};

pub struct WriterRevenuePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl WriterRevenuePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl WriterRevenueRepository for WriterRevenuePostgres {
    async fn totals(&self, writer_id: Uuid) -> Result<WriterRevenueTotals> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let (coins, amount) = writer_revenues::table
            .filter(writer_revenues::writer_id.eq(writer_id))
            .select((
                sum(writer_revenues::coins_earned),
                sum(writer_revenues::amount_minor),
            ))
            .first::<(Option<i64>, Option<i64>)>(&mut conn)?;

        Ok(WriterRevenueTotals {
            total_coins_earned: coins.unwrap_or(0),
            total_amount_minor: amount.unwrap_or(0),
        })
    }

    async fn recent(&self, writer_id: Uuid, limit: i64) -> Result<Vec<WriterRevenueEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = writer_revenues::table
            .filter(writer_revenues::writer_id.eq(writer_id))
            .order(writer_revenues::created_at.desc())
            .limit(limit)
            .select(WriterRevenueEntity::as_select())
            .load::<WriterRevenueEntity>(&mut conn)?;

        Ok(results)
    }
}
