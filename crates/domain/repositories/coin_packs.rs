use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::coin_packs::{CoinPackEntity, UpsertCoinPackEntity};

#[async_trait]
#[automock]
pub trait CoinPackRepository {
    /// Active packs in ascending `sort_order`.
    async fn list_active(&self) -> Result<Vec<CoinPackEntity>>;

    async fn find_by_id(&self, coin_pack_id: Uuid) -> Result<Option<CoinPackEntity>>;

    /// Inserts a pack or updates the one with the same name in place.
    async fn upsert_by_name(&self, pack: UpsertCoinPackEntity) -> Result<CoinPackEntity>;
}
