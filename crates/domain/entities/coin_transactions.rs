use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::coin_transactions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = coin_transactions)]
pub struct CoinTransactionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub coin_pack_id: Uuid,
    pub coins_granted: i32,
    pub paid_amount: i32,
    pub payment_gateway: String,
    pub gateway_tx_id: String,
    pub gateway_payload: serde_json::Value,
    pub payment_method: String,
    pub status: String,
    pub failure_code: Option<String>,
    pub failure_message: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coin_transactions)]
pub struct InsertCoinTransactionEntity {
    pub user_id: Uuid,
    pub coin_pack_id: Uuid,
    pub coins_granted: i32,
    pub paid_amount: i32,
    pub payment_gateway: String,
    pub gateway_tx_id: String,
    pub gateway_payload: serde_json::Value,
    pub payment_method: String,
    pub status: String,
}
