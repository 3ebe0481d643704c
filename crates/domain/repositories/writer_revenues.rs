use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::writer_revenues::WriterRevenueEntity,
    value_objects::writer_revenues::WriterRevenueTotals,
};

#[async_trait]
#[automock]
pub trait WriterRevenueRepository {
    async fn totals(&self, writer_id: Uuid) -> Result<WriterRevenueTotals>;

    async fn recent(&self, writer_id: Uuid, limit: i64) -> Result<Vec<WriterRevenueEntity>>;
}
