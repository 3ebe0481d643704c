use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::writer_revenues::WriterRevenueEntity;

pub const RECENT_EARNINGS_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterRevenueTotals {
    pub total_coins_earned: i64,
    pub total_amount_minor: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WriterEarningItemDto {
    pub id: Uuid,
    pub coin_spend_id: Uuid,
    pub coins_earned: i32,
    pub amount_minor: i32,
    pub created_at: DateTime<Utc>,
}

impl From<WriterRevenueEntity> for WriterEarningItemDto {
    fn from(value: WriterRevenueEntity) -> Self {
        Self {
            id: value.id,
            coin_spend_id: value.coin_spend_id,
            coins_earned: value.coins_earned,
            amount_minor: value.amount_minor,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WriterEarningsDto {
    pub total_coins_earned: i64,
    pub total_amount_minor: i64,
    pub recent_earnings: Vec<WriterEarningItemDto>,
}
