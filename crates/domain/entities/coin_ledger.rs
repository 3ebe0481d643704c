use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::coin_ledger;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = coin_ledger)]
pub struct LedgerEntryEntity {
    pub id: Uuid,
    pub seq: i64,
    pub user_id: Uuid,
    pub type_: String,
    pub amount: i32,
    pub balance_before: i32,
    pub balance_after: i32,
    pub ref_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coin_ledger)]
pub struct InsertLedgerEntryEntity {
    pub user_id: Uuid,
    pub type_: String,
    pub amount: i32,
    pub balance_before: i32,
    pub balance_after: i32,
    pub ref_id: Option<Uuid>,
    pub note: Option<String>,
}
