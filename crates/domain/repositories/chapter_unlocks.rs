use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::coin_spends::CoinSpendEntity,
    value_objects::chapter_unlocks::{UnlockCommand, UnlockOutcome},
};

#[async_trait]
#[automock]
pub trait ChapterUnlockRepository {
    async fn find_spend(&self, user_id: Uuid, chapter_id: Uuid) -> Result<Option<CoinSpendEntity>>;

    /// Spend row, debit with its SPEND entry, and writer revenue, all or none.
    async fn unlock(&self, command: UnlockCommand) -> Result<UnlockOutcome>;
}
