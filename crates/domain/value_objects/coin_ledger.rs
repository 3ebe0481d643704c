use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::coin_ledger::{InsertLedgerEntryEntity, LedgerEntryEntity};
use crate::domain::value_objects::enums::ledger_types::LedgerType;

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 50;

#[derive(Debug, Error)]
pub enum CoinLedgerError {
    #[error("insufficient coins: balance {balance}, required {required}")]
    InsufficientFunds { balance: i32, required: i32 },
    #[error("user {0} not found")]
    UserNotFound(Uuid),
    #[error("coin amount must be positive, got {0}")]
    InvalidAmount(i32),
    #[error("coin balance would overflow")]
    BalanceOverflow,
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// One balance mutation request. `amount` is always a positive magnitude;
/// the direction comes from calling `credit_entry` or `debit_entry`.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceChange {
    pub user_id: Uuid,
    pub ledger_type: LedgerType,
    pub amount: i32,
    pub ref_id: Option<Uuid>,
    pub note: Option<String>,
}

impl BalanceChange {
    pub fn new(user_id: Uuid, ledger_type: LedgerType, amount: i32) -> Self {
        Self {
            user_id,
            ledger_type,
            amount,
            ref_id: None,
            note: None,
        }
    }

    pub fn with_ref(mut self, ref_id: Uuid) -> Self {
        self.ref_id = Some(ref_id);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Builds the ledger row for crediting `amount` on top of `balance_before`.
    pub fn credit_entry(&self, balance_before: i32) -> Result<InsertLedgerEntryEntity, CoinLedgerError> {
        let amount = self.checked_amount()?;
        let balance_after = balance_before
            .checked_add(amount)
            .ok_or(CoinLedgerError::BalanceOverflow)?;
        Ok(self.entry(amount, balance_before, balance_after))
    }

    /// Builds the ledger row for debiting `amount`. Never lets the balance go negative.
    pub fn debit_entry(&self, balance_before: i32) -> Result<InsertLedgerEntryEntity, CoinLedgerError> {
        let amount = self.checked_amount()?;
        if balance_before < amount {
            return Err(CoinLedgerError::InsufficientFunds {
                balance: balance_before,
                required: amount,
            });
        }
        Ok(self.entry(-amount, balance_before, balance_before - amount))
    }

    fn checked_amount(&self) -> Result<i32, CoinLedgerError> {
        if self.amount <= 0 {
            return Err(CoinLedgerError::InvalidAmount(self.amount));
        }
        Ok(self.amount)
    }

    fn entry(&self, signed_amount: i32, balance_before: i32, balance_after: i32) -> InsertLedgerEntryEntity {
        InsertLedgerEntryEntity {
            user_id: self.user_id,
            type_: self.ledger_type.to_string(),
            amount: signed_amount,
            balance_before,
            balance_after,
            ref_id: self.ref_id,
            note: self.note.clone(),
        }
    }
}

/// Lifetime PURCHASE credits and SPEND debits, both as positive sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    pub total_purchased: i64,
    pub total_spent: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CoinBalanceDto {
    pub balance: i32,
    pub total_purchased: i64,
    pub total_spent: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoinHistoryItemDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub type_: String,
    pub amount: i32,
    pub balance_after: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl CoinBalanceDto {
    pub fn new(balance: i32, totals: LedgerTotals) -> Self {
        Self {
            balance,
            total_purchased: totals.total_purchased,
            total_spent: totals.total_spent,
        }
    }
}

impl From<LedgerEntryEntity> for CoinHistoryItemDto {
    fn from(value: LedgerEntryEntity) -> Self {
        let description = match value.note.as_deref() {
            Some(note) if !note.trim().is_empty() => note.to_string(),
            _ => default_description(&value.type_, value.amount),
        };

        Self {
            id: value.id,
            type_: value.type_,
            amount: value.amount,
            balance_after: value.balance_after,
            description,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoinHistoryDto {
    pub history: Vec<CoinHistoryItemDto>,
}

/// Result of comparing the stored balance against a replay of the ledger.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct BalanceAuditDto {
    pub user_id: Uuid,
    pub stored_balance: i32,
    pub ledger_balance: i64,
    pub consistent: bool,
}

impl BalanceAuditDto {
    pub fn new(user_id: Uuid, stored_balance: i32, ledger_balance: i64) -> Self {
        Self {
            user_id,
            stored_balance,
            ledger_balance,
            consistent: i64::from(stored_balance) == ledger_balance,
        }
    }
}

/// Manual balance change requested by an administrator. A positive amount
/// credits, a negative one debits its magnitude.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustBalanceModel {
    pub user_id: Uuid,
    pub amount: i32,
    #[serde(rename = "type")]
    pub ledger_type: LedgerType,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdjustBalanceDto {
    pub user_id: Uuid,
    pub ledger_entry_id: Uuid,
    #[serde(rename = "type")]
    pub type_: String,
    pub amount: i32,
    pub balance_before: i32,
    pub new_balance: i32,
}

impl From<LedgerEntryEntity> for AdjustBalanceDto {
    fn from(value: LedgerEntryEntity) -> Self {
        Self {
            user_id: value.user_id,
            ledger_entry_id: value.id,
            type_: value.type_,
            amount: value.amount,
            balance_before: value.balance_before,
            new_balance: value.balance_after,
        }
    }
}

pub fn default_description(type_: &str, amount: i32) -> String {
    match LedgerType::from_str(type_) {
        Some(LedgerType::Purchase) => format!("Purchased {} coins", amount),
        Some(LedgerType::Spend) => format!("Spent {} coins to unlock a chapter", amount.abs()),
        Some(LedgerType::Refund) => format!("Refunded {} coins", amount),
        Some(LedgerType::Bonus) => format!("Received {} bonus coins", amount),
        Some(LedgerType::AdminAdjust) => {
            let sign = if amount > 0 { "+" } else { "" };
            format!("Balance adjusted {}{} coins", sign, amount)
        }
        None => format!("{} coins", amount),
    }
}

/// Clamps caller-supplied paging to the allowed window.
pub fn history_window(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}
