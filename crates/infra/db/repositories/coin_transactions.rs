use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use diesel::{PgConnection, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::{
        postgres::{
            postgres_connection::PgPoolSquad,
            schema::{coin_packs, coin_transactions},
        },
        repositories::coin_ledger::credit_in_transaction,
    },
};
use domain::{
    entities::coin_transactions::{CoinTransactionEntity, InsertCoinTransactionEntity},
    repositories::coin_transactions::CoinTransactionRepository,
    value_objects::{
        coin_ledger::{BalanceChange, CoinLedgerError},
        coin_transactions::{Settlement, SettlementOutcome},
        enums::{coin_transaction_statuses::CoinTransactionStatus, ledger_types::LedgerType},
    },
};

pub struct CoinTransactionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CoinTransactionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn purchase_note(conn: &mut PgConnection, transaction: &CoinTransactionEntity) -> Result<String, CoinLedgerError> {
    let pack_name = coin_packs::table
        .filter(coin_packs::id.eq(transaction.coin_pack_id))
        .select(coin_packs::name)
        .first::<String>(conn)
        .optional()?;

    Ok(match pack_name {
        Some(name) => format!("Purchased {} pack", name),
        None => format!("Purchased {} coins", transaction.coins_granted),
    })
}

fn settle_locked(
    conn: &mut PgConnection,
    gateway_tx_id: &str,
    settlement: Settlement,
) -> Result<SettlementOutcome, CoinLedgerError> {
    let Some(transaction) = coin_transactions::table
        .filter(coin_transactions::gateway_tx_id.eq(gateway_tx_id))
        .select(CoinTransactionEntity::as_select())
        .for_update()
        .first::<CoinTransactionEntity>(conn)
        .optional()?
    else {
        return Ok(SettlementOutcome::NotFound);
    };

    let status = CoinTransactionStatus::from_str(&transaction.status).ok_or_else(|| {
        anyhow!(
            "coin transaction {} has unknown status {}",
            transaction.id,
            transaction.status
        )
    })?;
    if status.is_terminal() {
        return Ok(SettlementOutcome::AlreadySettled(status));
    }

    let now = Utc::now();
    let target = coin_transactions::table.filter(coin_transactions::id.eq(transaction.id));

    match settlement {
        Settlement::Complete => {
            let note = purchase_note(conn, &transaction)?;
            let change = BalanceChange::new(
                transaction.user_id,
                LedgerType::Purchase,
                transaction.coins_granted,
            )
            .with_ref(transaction.id)
            .with_note(note);
            let entry = credit_in_transaction(conn, &change)?;

            update(target)
                .set((
                    coin_transactions::status.eq(CoinTransactionStatus::Completed.to_string()),
                    coin_transactions::completed_at.eq(Some(now)),
                    coin_transactions::updated_at.eq(now),
                ))
                .execute(conn)?;

            Ok(SettlementOutcome::Completed {
                transaction_id: transaction.id,
                user_id: transaction.user_id,
                coins_granted: transaction.coins_granted,
                new_balance: entry.balance_after,
            })
        }
        Settlement::Fail {
            failure_code,
            failure_message,
        } => {
            update(target)
                .set((
                    coin_transactions::status.eq(CoinTransactionStatus::Failed.to_string()),
                    coin_transactions::failure_code.eq(failure_code),
                    coin_transactions::failure_message.eq(failure_message),
                    coin_transactions::updated_at.eq(now),
                ))
                .execute(conn)?;

            Ok(SettlementOutcome::Failed {
                transaction_id: transaction.id,
            })
        }
        Settlement::Expire => {
            update(target)
                .set((
                    coin_transactions::status.eq(CoinTransactionStatus::Expired.to_string()),
                    coin_transactions::expired_at.eq(Some(now)),
                    coin_transactions::updated_at.eq(now),
                ))
                .execute(conn)?;

            Ok(SettlementOutcome::Expired {
                transaction_id: transaction.id,
            })
        }
    }
}

#[async_trait]
impl CoinTransactionRepository for CoinTransactionPostgres {
    async fn create_pending(
        &self,
        transaction: InsertCoinTransactionEntity,
    ) -> Result<CoinTransactionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(coin_transactions::table)
            .values(&transaction)
            .returning(CoinTransactionEntity::as_returning())
            .get_result::<CoinTransactionEntity>(&mut conn)?;

        Ok(result)
    }

    async fn settle(&self, gateway_tx_id: &str, settlement: Settlement) -> Result<SettlementOutcome> {
        let mut pooled = Arc::clone(&self.db_pool).get()?;
        let conn: &mut PgConnection = &mut pooled;

        let outcome = conn.transaction::<SettlementOutcome, CoinLedgerError, _>(|tx| {
            settle_locked(tx, gateway_tx_id, settlement)
        })?;

        Ok(outcome)
    }
}
