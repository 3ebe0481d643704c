use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::coin_transactions::{CoinTransactionEntity, InsertCoinTransactionEntity},
    value_objects::coin_transactions::{Settlement, SettlementOutcome},
};

#[async_trait]
#[automock]
pub trait CoinTransactionRepository {
    async fn create_pending(
        &self,
        transaction: InsertCoinTransactionEntity,
    ) -> Result<CoinTransactionEntity>;

    /// Moves a PENDING transaction to its terminal state in one unit. A
    /// completion credits the purchase in the same transaction.
    async fn settle(&self, gateway_tx_id: &str, settlement: Settlement)
    -> Result<SettlementOutcome>;
}
