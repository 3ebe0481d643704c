#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use backend::usecases::{
    chapter_unlock::ChapterUnlockUseCase, checkout::CheckoutUseCase, checkout::PaymentGateway,
    coin_wallet::CoinWalletUseCase, payment_webhook::PaymentWebhookUseCase,
};
use chrono::Utc;
use crates::{
    domain::{
        entities::{
            coin_ledger::LedgerEntryEntity,
            coin_packs::{CoinPackEntity, UpsertCoinPackEntity},
            coin_spends::CoinSpendEntity,
            coin_transactions::{CoinTransactionEntity, InsertCoinTransactionEntity},
            writer_revenues::WriterRevenueEntity,
        },
        repositories::{
            chapter_catalog::ChapterCatalogRepository, chapter_unlocks::ChapterUnlockRepository,
            coin_ledger::CoinLedgerRepository, coin_packs::CoinPackRepository,
            coin_transactions::CoinTransactionRepository, users::UserRepository,
            writer_revenues::WriterRevenueRepository,
        },
        value_objects::{
            chapter_unlocks::{ChapterPricing, UnlockCommand, UnlockOutcome},
            checkout::{ChargeRequest, GatewayCharge},
            coin_ledger::{BalanceChange, CoinLedgerError, LedgerTotals},
            coin_transactions::{Settlement, SettlementOutcome},
            enums::{
                coin_transaction_statuses::CoinTransactionStatus, ledger_types::LedgerType,
                user_roles::UserRole,
            },
            revenue_share::RevenueShare,
            writer_revenues::WriterRevenueTotals,
        },
    },
    payments::omise_webhook::WebhookVerifier,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const WRITER_REVENUE_PERCENT: i32 = 70;
pub const COIN_AVERAGE_RATE_MINOR: i32 = 90;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, (UserRole, i32)>,
    ledger: Vec<LedgerEntryEntity>,
    next_seq: i64,
    packs: Vec<CoinPackEntity>,
    transactions: HashMap<String, CoinTransactionEntity>,
    spends: Vec<CoinSpendEntity>,
    revenues: Vec<WriterRevenueEntity>,
    chapters: HashMap<Uuid, ChapterPricing>,
}

impl State {
    /// Mirrors the locked read-modify-write of the Postgres ledger.
    fn apply(&mut self, change: &BalanceChange, credit: bool) -> Result<LedgerEntryEntity, CoinLedgerError> {
        let (_, balance) = self
            .users
            .get(&change.user_id)
            .copied()
            .ok_or(CoinLedgerError::UserNotFound(change.user_id))?;

        let insert = if credit {
            change.credit_entry(balance)?
        } else {
            change.debit_entry(balance)?
        };

        self.next_seq += 1;
        let entry = LedgerEntryEntity {
            id: Uuid::new_v4(),
            seq: self.next_seq,
            user_id: insert.user_id,
            type_: insert.type_,
            amount: insert.amount,
            balance_before: insert.balance_before,
            balance_after: insert.balance_after,
            ref_id: insert.ref_id,
            note: insert.note,
            created_at: Utc::now(),
        };

        if let Some((_, balance)) = self.users.get_mut(&change.user_id) {
            *balance = entry.balance_after;
        }
        self.ledger.push(entry.clone());
        Ok(entry)
    }
}

/// One store behind every repository trait, with the same uniqueness rules as
/// the database: one transaction per charge id and one spend per
/// (user, chapter).
#[derive(Default)]
pub struct InMemoryCoinStore {
    state: Mutex<State>,
    calls: AtomicUsize,
}

impl InMemoryCoinStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of repository calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn add_user(&self, role: UserRole, balance: i32) -> Uuid {
        let user_id = Uuid::new_v4();
        let mut state = self.state.lock().unwrap();
        state.users.insert(user_id, (role, 0));
        if balance > 0 {
            let seed = BalanceChange::new(user_id, LedgerType::Bonus, balance);
            state.apply(&seed, true).unwrap();
        }
        user_id
    }

    pub fn add_pack(&self, name: &str, price: i32, coins: i32, bonus_coins: i32) -> Uuid {
        let now = Utc::now();
        let pack = CoinPackEntity {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price,
            coins,
            bonus_coins,
            is_active: true,
            is_featured: false,
            sort_order: 1,
            created_at: now,
            updated_at: now,
        };
        let id = pack.id;
        self.state.lock().unwrap().packs.push(pack);
        id
    }

    pub fn add_chapter(&self, author_id: Uuid, title: &str, coin_price: Option<i32>) -> Uuid {
        let chapter = ChapterPricing {
            chapter_id: Uuid::new_v4(),
            novel_id: Uuid::new_v4(),
            author_id,
            title: title.to_string(),
            coin_price,
            chapter_published: true,
            novel_published: true,
        };
        let id = chapter.chapter_id;
        self.state.lock().unwrap().chapters.insert(id, chapter);
        id
    }

    pub fn balance_of(&self, user_id: Uuid) -> i32 {
        self.state.lock().unwrap().users[&user_id].1
    }

    pub fn ledger_sum(&self, user_id: Uuid) -> i64 {
        self.state
            .lock()
            .unwrap()
            .ledger
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| i64::from(entry.amount))
            .sum()
    }

    pub fn ledger_entries(&self, user_id: Uuid) -> Vec<LedgerEntryEntity> {
        self.state
            .lock()
            .unwrap()
            .ledger
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn transaction(&self, charge_id: &str) -> Option<CoinTransactionEntity> {
        self.state.lock().unwrap().transactions.get(charge_id).cloned()
    }

    pub fn spend_count(&self, user_id: Uuid, chapter_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .spends
            .iter()
            .filter(|spend| spend.user_id == user_id && spend.chapter_id == chapter_id)
            .count()
    }

    pub fn revenues_for(&self, writer_id: Uuid) -> Vec<WriterRevenueEntity> {
        self.state
            .lock()
            .unwrap()
            .revenues
            .iter()
            .filter(|revenue| revenue.writer_id == writer_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CoinLedgerRepository for InMemoryCoinStore {
    async fn credit(&self, change: BalanceChange) -> Result<LedgerEntryEntity, CoinLedgerError> {
        self.lock().apply(&change, true)
    }

    async fn debit(&self, change: BalanceChange) -> Result<LedgerEntryEntity, CoinLedgerError> {
        self.lock().apply(&change, false)
    }

    async fn get_balance(&self, user_id: Uuid) -> Result<Option<i32>> {
        Ok(self.lock().users.get(&user_id).map(|(_, balance)| *balance))
    }

    async fn totals(&self, user_id: Uuid) -> Result<LedgerTotals> {
        let state = self.lock();
        let sum = |ledger_type: LedgerType| -> i64 {
            state
                .ledger
                .iter()
                .filter(|entry| entry.user_id == user_id && entry.type_ == ledger_type.as_str())
                .map(|entry| i64::from(entry.amount).abs())
                .sum()
        };
        Ok(LedgerTotals {
            total_purchased: sum(LedgerType::Purchase),
            total_spent: sum(LedgerType::Spend),
        })
    }

    async fn list_history(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<LedgerEntryEntity>> {
        let mut entries: Vec<_> = self
            .lock()
            .ledger
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(entries
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn sum_amounts(&self, user_id: Uuid) -> Result<i64> {
        Ok(self
            .lock()
            .ledger
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| i64::from(entry.amount))
            .sum())
    }
}

#[async_trait]
impl CoinPackRepository for InMemoryCoinStore {
    async fn list_active(&self) -> Result<Vec<CoinPackEntity>> {
        let mut packs: Vec<_> = self
            .lock()
            .packs
            .iter()
            .filter(|pack| pack.is_active)
            .cloned()
            .collect();
        packs.sort_by_key(|pack| (pack.sort_order, pack.price));
        Ok(packs)
    }

    async fn find_by_id(&self, coin_pack_id: Uuid) -> Result<Option<CoinPackEntity>> {
        Ok(self
            .lock()
            .packs
            .iter()
            .find(|pack| pack.id == coin_pack_id)
            .cloned())
    }

    async fn upsert_by_name(&self, pack: UpsertCoinPackEntity) -> Result<CoinPackEntity> {
        let mut state = self.lock();
        let now = Utc::now();
        if let Some(existing) = state.packs.iter_mut().find(|existing| existing.name == pack.name) {
            existing.price = pack.price;
            existing.coins = pack.coins;
            existing.bonus_coins = pack.bonus_coins;
            existing.is_active = pack.is_active;
            existing.is_featured = pack.is_featured;
            existing.sort_order = pack.sort_order;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let created = CoinPackEntity {
            id: Uuid::new_v4(),
            name: pack.name,
            price: pack.price,
            coins: pack.coins,
            bonus_coins: pack.bonus_coins,
            is_active: pack.is_active,
            is_featured: pack.is_featured,
            sort_order: pack.sort_order,
            created_at: now,
            updated_at: now,
        };
        state.packs.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl CoinTransactionRepository for InMemoryCoinStore {
    async fn create_pending(&self, transaction: InsertCoinTransactionEntity) -> Result<CoinTransactionEntity> {
        let mut state = self.lock();
        if state.transactions.contains_key(&transaction.gateway_tx_id) {
            return Err(anyhow!("duplicate gateway_tx_id {}", transaction.gateway_tx_id));
        }

        let now = Utc::now();
        let row = CoinTransactionEntity {
            id: Uuid::new_v4(),
            user_id: transaction.user_id,
            coin_pack_id: transaction.coin_pack_id,
            coins_granted: transaction.coins_granted,
            paid_amount: transaction.paid_amount,
            payment_gateway: transaction.payment_gateway,
            gateway_tx_id: transaction.gateway_tx_id,
            gateway_payload: transaction.gateway_payload,
            payment_method: transaction.payment_method,
            status: transaction.status,
            failure_code: None,
            failure_message: None,
            completed_at: None,
            expired_at: None,
            created_at: now,
            updated_at: now,
        };
        state.transactions.insert(row.gateway_tx_id.clone(), row.clone());
        Ok(row)
    }

    async fn settle(&self, gateway_tx_id: &str, settlement: Settlement) -> Result<SettlementOutcome> {
        let mut state = self.lock();
        let Some(tx) = state.transactions.get(gateway_tx_id).cloned() else {
            return Ok(SettlementOutcome::NotFound);
        };

        let status = CoinTransactionStatus::from_str(&tx.status)
            .ok_or_else(|| anyhow!("unknown status {}", tx.status))?;
        if status.is_terminal() {
            return Ok(SettlementOutcome::AlreadySettled(status));
        }

        let now = Utc::now();
        let outcome = match &settlement {
            Settlement::Complete => {
                let change = BalanceChange::new(tx.user_id, LedgerType::Purchase, tx.coins_granted)
                    .with_ref(tx.id)
                    .with_note(format!("Purchased {} coins", tx.coins_granted));
                let entry = state.apply(&change, true).map_err(anyhow::Error::new)?;
                SettlementOutcome::Completed {
                    transaction_id: tx.id,
                    user_id: tx.user_id,
                    coins_granted: tx.coins_granted,
                    new_balance: entry.balance_after,
                }
            }
            Settlement::Fail { .. } => SettlementOutcome::Failed { transaction_id: tx.id },
            Settlement::Expire => SettlementOutcome::Expired { transaction_id: tx.id },
        };

        if let Some(row) = state.transactions.get_mut(gateway_tx_id) {
            row.status = settlement.target_status().to_string();
            row.updated_at = now;
            match settlement {
                Settlement::Complete => row.completed_at = Some(now),
                Settlement::Fail {
                    failure_code,
                    failure_message,
                } => {
                    row.failure_code = failure_code;
                    row.failure_message = failure_message;
                }
                Settlement::Expire => row.expired_at = Some(now),
            }
        }

        Ok(outcome)
    }
}

#[async_trait]
impl ChapterCatalogRepository for InMemoryCoinStore {
    async fn find_chapter_pricing(&self, chapter_id: Uuid) -> Result<Option<ChapterPricing>> {
        Ok(self.lock().chapters.get(&chapter_id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryCoinStore {
    async fn find_role(&self, user_id: Uuid) -> Result<Option<UserRole>> {
        Ok(self.lock().users.get(&user_id).map(|(role, _)| *role))
    }
}

#[async_trait]
impl ChapterUnlockRepository for InMemoryCoinStore {
    async fn find_spend(&self, user_id: Uuid, chapter_id: Uuid) -> Result<Option<CoinSpendEntity>> {
        Ok(self
            .lock()
            .spends
            .iter()
            .find(|spend| spend.user_id == user_id && spend.chapter_id == chapter_id)
            .cloned())
    }

    async fn unlock(&self, command: UnlockCommand) -> Result<UnlockOutcome> {
        let mut state = self.lock();
        if state
            .spends
            .iter()
            .any(|spend| spend.user_id == command.user_id && spend.chapter_id == command.chapter_id)
        {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }

        let spend_id = Uuid::new_v4();
        let change = BalanceChange::new(command.user_id, LedgerType::Spend, command.price)
            .with_ref(spend_id)
            .with_note(command.ledger_note());
        let entry = match state.apply(&change, false) {
            Ok(entry) => entry,
            Err(CoinLedgerError::InsufficientFunds { balance, required }) => {
                return Ok(UnlockOutcome::InsufficientFunds { balance, required });
            }
            Err(err) => return Err(anyhow::Error::new(err)),
        };

        let now = Utc::now();
        state.spends.push(CoinSpendEntity {
            id: spend_id,
            user_id: command.user_id,
            chapter_id: command.chapter_id,
            novel_id: command.novel_id,
            amount: command.price,
            created_at: now,
        });
        state.revenues.push(WriterRevenueEntity {
            id: Uuid::new_v4(),
            writer_id: command.writer_id,
            coin_spend_id: spend_id,
            coins_earned: command.writer_share.coins_earned,
            amount_minor: command.writer_share.amount_minor,
            created_at: now,
        });

        Ok(UnlockOutcome::Unlocked {
            spend_id,
            new_balance: entry.balance_after,
        })
    }
}

#[async_trait]
impl WriterRevenueRepository for InMemoryCoinStore {
    async fn totals(&self, writer_id: Uuid) -> Result<WriterRevenueTotals> {
        let state = self.lock();
        let rows = state.revenues.iter().filter(|revenue| revenue.writer_id == writer_id);
        Ok(rows.fold(WriterRevenueTotals::default(), |mut totals, revenue| {
            totals.total_coins_earned += i64::from(revenue.coins_earned);
            totals.total_amount_minor += i64::from(revenue.amount_minor);
            totals
        }))
    }

    async fn recent(&self, writer_id: Uuid, limit: i64) -> Result<Vec<WriterRevenueEntity>> {
        let mut rows: Vec<_> = self
            .lock()
            .revenues
            .iter()
            .filter(|revenue| revenue.writer_id == writer_id)
            .cloned()
            .collect();
        rows.reverse();
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

/// Gateway double that issues sequential charge ids.
#[derive(Default)]
pub struct FakeGateway {
    issued: AtomicUsize,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn gateway_name(&self) -> &'static str {
        "omise"
    }

    async fn create_charge_artifact(&self, request: ChargeRequest) -> Result<GatewayCharge> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let charge_id = format!("chrg_test_{n}");
        Ok(GatewayCharge {
            qr_code_url: Some(format!("https://api.omise.co/charges/{charge_id}/qr")),
            authorize_uri: None,
            expires_at: None,
            raw: serde_json::json!({
                "id": charge_id,
                "amount": request.amount_minor,
                "currency": request.currency,
                "status": "pending",
            }),
            charge_id,
        })
    }
}

pub type Store = InMemoryCoinStore;

pub fn wallet(store: &Arc<Store>) -> CoinWalletUseCase<Store, Store> {
    CoinWalletUseCase::new(Arc::clone(store), Arc::clone(store), "THB".to_string())
}

pub fn checkout(store: &Arc<Store>) -> CheckoutUseCase<Store, Store, FakeGateway> {
    CheckoutUseCase::new(
        Arc::clone(store),
        Arc::clone(store),
        Arc::new(FakeGateway::default()),
        "THB".to_string(),
        "https://novels.example/coins".to_string(),
    )
}

pub fn webhooks(store: &Arc<Store>) -> PaymentWebhookUseCase<Store> {
    PaymentWebhookUseCase::new(
        Arc::clone(store),
        WebhookVerifier::new(Some(WEBHOOK_SECRET.to_string())),
    )
}

pub fn unlocks(store: &Arc<Store>) -> ChapterUnlockUseCase<Store, Store, Store, Store> {
    ChapterUnlockUseCase::new(
        Arc::clone(store),
        Arc::clone(store),
        Arc::clone(store),
        Arc::clone(store),
        RevenueShare::new(WRITER_REVENUE_PERCENT, COIN_AVERAGE_RATE_MINOR).unwrap(),
    )
}

pub fn sign(payload: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// A `charge.complete` delivery for `charge_id`, created now.
pub fn charge_complete(charge_id: &str, status: &str) -> Vec<u8> {
    charge_complete_at(charge_id, status, Utc::now())
}

pub fn charge_complete_at(charge_id: &str, status: &str, created_at: chrono::DateTime<Utc>) -> Vec<u8> {
    let mut data = serde_json::json!({
        "object": "charge",
        "id": charge_id,
        "status": status,
    });
    if status == "failed" {
        data["failure_code"] = serde_json::json!("insufficient_fund");
        data["failure_message"] = serde_json::json!("insufficient funds in the account");
    }

    serde_json::to_vec(&serde_json::json!({
        "object": "event",
        "key": "charge.complete",
        "created_at": created_at.to_rfc3339(),
        "data": data,
    }))
    .unwrap()
}
