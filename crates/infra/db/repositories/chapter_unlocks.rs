use anyhow::Result;
use async_trait::async_trait;
use diesel::{PgConnection, insert_into, prelude::*};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::{
        postgres::{
            postgres_connection::PgPoolSquad,
            schema::{coin_spends, writer_revenues},
        },
        repositories::coin_ledger::debit_in_transaction,
    },
};
use domain::{
    entities::{
        coin_spends::{CoinSpendEntity, InsertCoinSpendEntity},
        writer_revenues::InsertWriterRevenueEntity,
    },
    repositories::chapter_unlocks::ChapterUnlockRepository,
    value_objects::{
        chapter_unlocks::{UnlockCommand, UnlockOutcome},
        coin_ledger::{BalanceChange, CoinLedgerError},
        enums::ledger_types::LedgerType,
    },
};

/// Reasons to roll the unlock transaction back. Two of them are ordinary
/// outcomes once the rollback is done.
#[derive(Debug, Error)]
enum UnlockAbort {
    #[error("chapter already unlocked")]
    AlreadyUnlocked,
    #[error(transparent)]
    Ledger(#[from] CoinLedgerError),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

pub struct ChapterUnlockPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ChapterUnlockPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn unlock_in_transaction(
    conn: &mut PgConnection,
    command: &UnlockCommand,
) -> Result<UnlockOutcome, UnlockAbort> {
    // The (user_id, chapter_id) unique index decides the race; the loser
    // inserts nothing and waits for the winner to commit first.
    let spend_id = insert_into(coin_spends::table)
        .values(&InsertCoinSpendEntity {
            user_id: command.user_id,
            chapter_id: command.chapter_id,
            novel_id: command.novel_id,
            amount: command.price,
        })
        .on_conflict((coin_spends::user_id, coin_spends::chapter_id))
        .do_nothing()
        .returning(coin_spends::id)
        .get_result::<Uuid>(conn)
        .optional()?
        .ok_or(UnlockAbort::AlreadyUnlocked)?;

    let change = BalanceChange::new(command.user_id, LedgerType::Spend, command.price)
        .with_ref(spend_id)
        .with_note(command.ledger_note());
    let entry = debit_in_transaction(conn, &change)?;

    insert_into(writer_revenues::table)
        .values(&InsertWriterRevenueEntity {
            writer_id: command.writer_id,
            coin_spend_id: spend_id,
            coins_earned: command.writer_share.coins_earned,
            amount_minor: command.writer_share.amount_minor,
        })
        .execute(conn)?;

    Ok(UnlockOutcome::Unlocked {
        spend_id,
        new_balance: entry.balance_after,
    })
}

#[async_trait]
impl ChapterUnlockRepository for ChapterUnlockPostgres {
    async fn find_spend(&self, user_id: Uuid, chapter_id: Uuid) -> Result<Option<CoinSpendEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = coin_spends::table
            .filter(coin_spends::user_id.eq(user_id))
            .filter(coin_spends::chapter_id.eq(chapter_id))
            .select(CoinSpendEntity::as_select())
            .first::<CoinSpendEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn unlock(&self, command: UnlockCommand) -> Result<UnlockOutcome> {
        let mut pooled = Arc::clone(&self.db_pool).get()?;
        let conn: &mut PgConnection = &mut pooled;

        let result = conn.transaction::<UnlockOutcome, UnlockAbort, _>(|tx| {
            unlock_in_transaction(tx, &command)
        });

        match result {
            Ok(outcome) => Ok(outcome),
            Err(UnlockAbort::AlreadyUnlocked) => Ok(UnlockOutcome::AlreadyUnlocked),
            Err(UnlockAbort::Ledger(CoinLedgerError::InsufficientFunds { balance, required })) => {
                Ok(UnlockOutcome::InsufficientFunds { balance, required })
            }
            Err(UnlockAbort::Ledger(err)) => Err(err.into()),
            Err(UnlockAbort::Database(err)) => Err(err.into()),
        }
    }
}
