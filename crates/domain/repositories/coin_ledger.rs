use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::coin_ledger::LedgerEntryEntity,
    value_objects::coin_ledger::{BalanceChange, CoinLedgerError, LedgerTotals},
};

/// The only sanctioned path to a user's coin balance. `credit` and `debit`
/// each lock the balance, write it, and append exactly one ledger entry in a
/// single transaction.
#[async_trait]
#[automock]
pub trait CoinLedgerRepository {
    async fn credit(&self, change: BalanceChange) -> Result<LedgerEntryEntity, CoinLedgerError>;

    async fn debit(&self, change: BalanceChange) -> Result<LedgerEntryEntity, CoinLedgerError>;

    async fn get_balance(&self, user_id: Uuid) -> Result<Option<i32>>;

    async fn totals(&self, user_id: Uuid) -> Result<LedgerTotals>;

    /// Newest first.
    async fn list_history(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LedgerEntryEntity>>;

    async fn sum_amounts(&self, user_id: Uuid) -> Result<i64>;
}
