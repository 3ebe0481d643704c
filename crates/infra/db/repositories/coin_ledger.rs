use anyhow::Result;
use async_trait::async_trait;
use diesel::{PgConnection, dsl::sum, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{coin_ledger, users},
    },
};
use domain::{
    entities::coin_ledger::{InsertLedgerEntryEntity, LedgerEntryEntity},
    repositories::coin_ledger::CoinLedgerRepository,
    value_objects::{
        coin_ledger::{BalanceChange, CoinLedgerError, LedgerTotals},
        enums::ledger_types::LedgerType,
    },
};

/// Locks the user row for the rest of the enclosing transaction and returns
/// the balance as of that lock.
fn lock_balance(conn: &mut PgConnection, user_id: Uuid) -> Result<i32, CoinLedgerError> {
    users::table
        .filter(users::id.eq(user_id))
        .select(users::coin_balance)
        .for_update()
        .first::<i32>(conn)
        .optional()?
        .ok_or(CoinLedgerError::UserNotFound(user_id))
}

fn write_entry(
    conn: &mut PgConnection,
    entry: InsertLedgerEntryEntity,
) -> Result<LedgerEntryEntity, CoinLedgerError> {
    update(users::table.filter(users::id.eq(entry.user_id)))
        .set(users::coin_balance.eq(entry.balance_after))
        .execute(conn)?;

    let written = insert_into(coin_ledger::table)
        .values(&entry)
        .returning(LedgerEntryEntity::as_returning())
        .get_result::<LedgerEntryEntity>(conn)?;

    Ok(written)
}

/// Credit primitive. Must run inside a transaction owned by the caller.
pub(crate) fn credit_in_transaction(
    conn: &mut PgConnection,
    change: &BalanceChange,
) -> Result<LedgerEntryEntity, CoinLedgerError> {
    let balance_before = lock_balance(conn, change.user_id)?;
    let entry = change.credit_entry(balance_before)?;
    write_entry(conn, entry)
}

/// Debit primitive. Re-reads the balance under the row lock, so a value the
/// caller read earlier is never trusted.
pub(crate) fn debit_in_transaction(
    conn: &mut PgConnection,
    change: &BalanceChange,
) -> Result<LedgerEntryEntity, CoinLedgerError> {
    let balance_before = lock_balance(conn, change.user_id)?;
    let entry = change.debit_entry(balance_before)?;
    write_entry(conn, entry)
}

pub struct CoinLedgerPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CoinLedgerPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }

    fn sum_by_type(&self, user_id: Uuid, ledger_type: LedgerType) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = coin_ledger::table
            .filter(coin_ledger::user_id.eq(user_id))
            .filter(coin_ledger::type_.eq(ledger_type.as_str()))
            .select(sum(coin_ledger::amount))
            .first::<Option<i64>>(&mut conn)?;

        Ok(total.unwrap_or(0))
    }
}

#[async_trait]
impl CoinLedgerRepository for CoinLedgerPostgres {
    async fn credit(&self, change: BalanceChange) -> Result<LedgerEntryEntity, CoinLedgerError> {
        let mut pooled = Arc::clone(&self.db_pool)
            .get()
            .map_err(anyhow::Error::from)?;
        let conn: &mut PgConnection = &mut pooled;

        conn.transaction::<LedgerEntryEntity, CoinLedgerError, _>(|tx| {
            credit_in_transaction(tx, &change)
        })
    }

    async fn debit(&self, change: BalanceChange) -> Result<LedgerEntryEntity, CoinLedgerError> {
        let mut pooled = Arc::clone(&self.db_pool)
            .get()
            .map_err(anyhow::Error::from)?;
        let conn: &mut PgConnection = &mut pooled;

        conn.transaction::<LedgerEntryEntity, CoinLedgerError, _>(|tx| {
            debit_in_transaction(tx, &change)
        })
    }

    async fn get_balance(&self, user_id: Uuid) -> Result<Option<i32>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let balance = users::table
            .filter(users::id.eq(user_id))
            .select(users::coin_balance)
            .first::<i32>(&mut conn)
            .optional()?;

        Ok(balance)
    }

    async fn totals(&self, user_id: Uuid) -> Result<LedgerTotals> {
        let total_purchased = self.sum_by_type(user_id, LedgerType::Purchase)?;
        let total_spent = self.sum_by_type(user_id, LedgerType::Spend)?.abs();

        Ok(LedgerTotals {
            total_purchased,
            total_spent,
        })
    }

    async fn list_history(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LedgerEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = coin_ledger::table
            .filter(coin_ledger::user_id.eq(user_id))
            .order(coin_ledger::seq.desc())
            .limit(limit)
            .offset(offset)
            .select(LedgerEntryEntity::as_select())
            .load::<LedgerEntryEntity>(&mut conn)?;

        Ok(results)
    }

    async fn sum_amounts(&self, user_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = coin_ledger::table
            .filter(coin_ledger::user_id.eq(user_id))
            .select(sum(coin_ledger::amount))
            .first::<Option<i64>>(&mut conn)?;

        Ok(total.unwrap_or(0))
    }
}

