use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::chapter_unlocks::ChapterPricing;

#[async_trait]
#[automock]
pub trait ChapterCatalogRepository {
    async fn find_chapter_pricing(&self, chapter_id: Uuid) -> Result<Option<ChapterPricing>>;
}
