use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    repositories::{coin_ledger::CoinLedgerRepository, coin_packs::CoinPackRepository},
    value_objects::{
        coin_ledger::{CoinBalanceDto, CoinHistoryDto, CoinHistoryItemDto, history_window},
        coin_packs::{CoinPackDto, CoinPacksDto},
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::axum_http::error_responses::ApiError;

#[derive(Debug, Error)]
pub enum CoinWalletError {
    #[error("user not found")]
    UserNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError for CoinWalletError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoinWalletError::UserNotFound => StatusCode::NOT_FOUND,
            CoinWalletError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CoinWalletError::UserNotFound => "USER_NOT_FOUND",
            CoinWalletError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CoinWalletError>;

/// Read side of the coin economy: the catalog, a user's balance, and history.
pub struct CoinWalletUseCase<L, P>
where
    L: CoinLedgerRepository + Send + Sync + 'static,
    P: CoinPackRepository + Send + Sync + 'static,
{
    ledger_repo: Arc<L>,
    pack_repo: Arc<P>,
    currency: String,
}

impl<L, P> CoinWalletUseCase<L, P>
where
    L: CoinLedgerRepository + Send + Sync + 'static,
    P: CoinPackRepository + Send + Sync + 'static,
{
    pub fn new(ledger_repo: Arc<L>, pack_repo: Arc<P>, currency: String) -> Self {
        Self {
            ledger_repo,
            pack_repo,
            currency,
        }
    }

    pub async fn list_packs(&self) -> UseCaseResult<CoinPacksDto> {
        let packs = self.pack_repo.list_active().await.map_err(|err| {
            error!(db_error = ?err, "coin_wallet: failed to list active coin packs");
            CoinWalletError::Internal(err)
        })?;

        Ok(CoinPacksDto {
            packs: packs
                .into_iter()
                .map(|pack| CoinPackDto::from_entity(pack, &self.currency))
                .collect(),
        })
    }

    pub async fn get_balance(&self, user_id: Uuid) -> UseCaseResult<CoinBalanceDto> {
        let balance = self
            .ledger_repo
            .get_balance(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "coin_wallet: failed to load balance");
                CoinWalletError::Internal(err)
            })?
            .ok_or(CoinWalletError::UserNotFound)?;

        let totals = self.ledger_repo.totals(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "coin_wallet: failed to load ledger totals");
            CoinWalletError::Internal(err)
        })?;

        Ok(CoinBalanceDto::new(balance, totals))
    }

    pub async fn get_history(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> UseCaseResult<CoinHistoryDto> {
        let (limit, offset) = history_window(limit, offset);

        let entries = self
            .ledger_repo
            .list_history(user_id, limit, offset)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "coin_wallet: failed to load history");
                CoinWalletError::Internal(err)
            })?;
        info!(%user_id, limit, offset, count = entries.len(), "coin_wallet: history loaded");

        Ok(CoinHistoryDto {
            history: entries.into_iter().map(CoinHistoryItemDto::from).collect(),
        })
    }
}
