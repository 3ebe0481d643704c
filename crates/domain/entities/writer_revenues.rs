use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::writer_revenues;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = writer_revenues)]
pub struct WriterRevenueEntity {
    pub id: Uuid,
    pub writer_id: Uuid,
    pub coin_spend_id: Uuid,
    pub coins_earned: i32,
    pub amount_minor: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = writer_revenues)]
pub struct InsertWriterRevenueEntity {
    pub writer_id: Uuid,
    pub coin_spend_id: Uuid,
    pub coins_earned: i32,
    pub amount_minor: i32,
}
