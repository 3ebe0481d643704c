use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{chapters, novels},
    },
};
use domain::{
    repositories::chapter_catalog::ChapterCatalogRepository,
    value_objects::chapter_unlocks::ChapterPricing,
};

/// Read-only view over the content store.
pub struct ChapterCatalogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ChapterCatalogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ChapterCatalogRepository for ChapterCatalogPostgres {
    async fn find_chapter_pricing(&self, chapter_id: Uuid) -> Result<Option<ChapterPricing>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = chapters::table
            .inner_join(novels::table)
            .filter(chapters::id.eq(chapter_id))
            .select((
                chapters::id,
                novels::id,
                novels::author_id,
                chapters::title,
                chapters::coin_price,
                chapters::is_published,
                novels::is_published,
            ))
            .first::<(Uuid, Uuid, Uuid, String, Option<i32>, bool, bool)>(&mut conn)
            .optional()?;

        Ok(row.map(
            |(chapter_id, novel_id, author_id, title, coin_price, chapter_published, novel_published)| {
                ChapterPricing {
                    chapter_id,
                    novel_id,
                    author_id,
                    title,
                    coin_price,
                    chapter_published,
                    novel_published,
                }
            },
        ))
    }
}
