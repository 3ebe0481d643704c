use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{chapters, novels};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = novels)]
pub struct NovelEntity {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = chapters)]
pub struct ChapterEntity {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub title: String,
    pub coin_price: Option<i32>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}
