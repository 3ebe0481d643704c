use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    repositories::{
        coin_ledger::CoinLedgerRepository, coin_packs::CoinPackRepository, users::UserRepository,
    },
    value_objects::{
        coin_ledger::{
            AdjustBalanceDto, AdjustBalanceModel, BalanceAuditDto, BalanceChange, CoinLedgerError,
        },
        coin_packs::{CoinPackDto, CoinPacksDto, UpsertCoinPackModel, default_catalog},
        enums::user_roles::UserRole,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::axum_http::error_responses::ApiError;

#[derive(Debug, Error)]
pub enum AdminCoinError {
    #[error("administrator role required")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid adjustment: {0}")]
    InvalidAdjustment(String),
    #[error("invalid coin pack: {0}")]
    InvalidCoinPack(String),
    #[error("insufficient coins: balance {balance}, required {required}")]
    InsufficientFunds { balance: i32, required: i32 },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError for AdminCoinError {
    fn status_code(&self) -> StatusCode {
        match self {
            AdminCoinError::Forbidden => StatusCode::FORBIDDEN,
            AdminCoinError::UserNotFound => StatusCode::NOT_FOUND,
            AdminCoinError::InvalidAdjustment(_) | AdminCoinError::InvalidCoinPack(_) => {
                StatusCode::BAD_REQUEST
            }
            AdminCoinError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            AdminCoinError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AdminCoinError::Forbidden => "FORBIDDEN",
            AdminCoinError::UserNotFound => "USER_NOT_FOUND",
            AdminCoinError::InvalidAdjustment(_) => "INVALID_ADJUSTMENT",
            AdminCoinError::InvalidCoinPack(_) => "INVALID_COIN_PACK",
            AdminCoinError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            AdminCoinError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<CoinLedgerError> for AdminCoinError {
    fn from(value: CoinLedgerError) -> Self {
        match value {
            CoinLedgerError::InsufficientFunds { balance, required } => {
                AdminCoinError::InsufficientFunds { balance, required }
            }
            CoinLedgerError::UserNotFound(_) => AdminCoinError::UserNotFound,
            CoinLedgerError::InvalidAmount(_) | CoinLedgerError::BalanceOverflow => {
                AdminCoinError::InvalidAdjustment(value.to_string())
            }
            CoinLedgerError::Database(_) | CoinLedgerError::Internal(_) => {
                AdminCoinError::Internal(anyhow::Error::new(value))
            }
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AdminCoinError>;

/// Operator tooling. Every call re-reads the caller's role from storage
/// instead of trusting the token claim.
pub struct AdminCoinUseCase<Usr, L, P>
where
    Usr: UserRepository + Send + Sync + 'static,
    L: CoinLedgerRepository + Send + Sync + 'static,
    P: CoinPackRepository + Send + Sync + 'static,
{
    user_repo: Arc<Usr>,
    ledger_repo: Arc<L>,
    pack_repo: Arc<P>,
    currency: String,
}

impl<Usr, L, P> AdminCoinUseCase<Usr, L, P>
where
    Usr: UserRepository + Send + Sync + 'static,
    L: CoinLedgerRepository + Send + Sync + 'static,
    P: CoinPackRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<Usr>, ledger_repo: Arc<L>, pack_repo: Arc<P>, currency: String) -> Self {
        Self {
            user_repo,
            ledger_repo,
            pack_repo,
            currency,
        }
    }

    async fn ensure_admin(&self, admin_id: Uuid) -> UseCaseResult<()> {
        let role = self.user_repo.find_role(admin_id).await.map_err(|err| {
            error!(%admin_id, db_error = ?err, "admin_coins: failed to load caller role");
            AdminCoinError::Internal(err)
        })?;

        if role != Some(UserRole::Admin) {
            warn!(%admin_id, role = ?role, "admin_coins: caller is not an administrator");
            return Err(AdminCoinError::Forbidden);
        }
        Ok(())
    }

    pub async fn adjust_balance(
        &self,
        admin_id: Uuid,
        model: AdjustBalanceModel,
    ) -> UseCaseResult<AdjustBalanceDto> {
        self.ensure_admin(admin_id).await?;

        if !model.ledger_type.is_manual() {
            return Err(AdminCoinError::InvalidAdjustment(format!(
                "{} entries cannot be posted manually",
                model.ledger_type
            )));
        }
        if model.amount == 0 {
            return Err(AdminCoinError::InvalidAdjustment(
                "amount must not be zero".to_string(),
            ));
        }
        let magnitude = model
            .amount
            .checked_abs()
            .ok_or_else(|| AdminCoinError::InvalidAdjustment("amount out of range".to_string()))?;

        let mut change = BalanceChange::new(model.user_id, model.ledger_type, magnitude);
        if let Some(note) = model.note.as_deref().map(str::trim).filter(|note| !note.is_empty()) {
            change = change.with_note(note);
        }

        let entry = if model.amount > 0 {
            self.ledger_repo.credit(change).await?
        } else {
            self.ledger_repo.debit(change).await?
        };

        info!(
            %admin_id,
            user_id = %model.user_id,
            ledger_type = %model.ledger_type,
            amount = entry.amount,
            new_balance = entry.balance_after,
            "admin_coins: balance adjusted"
        );

        Ok(AdjustBalanceDto::from(entry))
    }

    pub async fn upsert_coin_pack(
        &self,
        admin_id: Uuid,
        model: UpsertCoinPackModel,
    ) -> UseCaseResult<CoinPackDto> {
        self.ensure_admin(admin_id).await?;
        model.validate().map_err(AdminCoinError::InvalidCoinPack)?;

        let pack = self
            .pack_repo
            .upsert_by_name(model.to_entity())
            .await
            .map_err(|err| {
                error!(%admin_id, name = %model.name, db_error = ?err, "admin_coins: coin pack upsert failed");
                AdminCoinError::Internal(err)
            })?;
        info!(%admin_id, coin_pack_id = %pack.id, name = %pack.name, "admin_coins: coin pack saved");

        Ok(CoinPackDto::from_entity(pack, &self.currency))
    }

    /// Re-running updates the default packs in place.
    pub async fn seed_default_catalog(&self, admin_id: Uuid) -> UseCaseResult<CoinPacksDto> {
        self.ensure_admin(admin_id).await?;

        let mut packs = Vec::new();
        for model in default_catalog() {
            let pack = self
                .pack_repo
                .upsert_by_name(model.to_entity())
                .await
                .map_err(|err| {
                    error!(%admin_id, name = %model.name, db_error = ?err, "admin_coins: catalog seed failed");
                    AdminCoinError::Internal(err)
                })?;
            packs.push(CoinPackDto::from_entity(pack, &self.currency));
        }
        info!(%admin_id, count = packs.len(), "admin_coins: default catalog seeded");

        Ok(CoinPacksDto { packs })
    }

    pub async fn audit_balance(&self, admin_id: Uuid, user_id: Uuid) -> UseCaseResult<BalanceAuditDto> {
        self.ensure_admin(admin_id).await?;

        let stored_balance = self
            .ledger_repo
            .get_balance(user_id)
            .await
            .map_err(AdminCoinError::Internal)?
            .ok_or(AdminCoinError::UserNotFound)?;
        let ledger_balance = self
            .ledger_repo
            .sum_amounts(user_id)
            .await
            .map_err(AdminCoinError::Internal)?;

        let audit = BalanceAuditDto::new(user_id, stored_balance, ledger_balance);
        if !audit.consistent {
            error!(
                %user_id,
                stored_balance,
                ledger_balance,
                "admin_coins: stored balance diverges from ledger"
            );
        }

        Ok(audit)
    }
}
