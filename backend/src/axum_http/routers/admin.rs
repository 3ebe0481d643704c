use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
};
use crates::{
    domain::{
        repositories::{
            coin_ledger::CoinLedgerRepository, coin_packs::CoinPackRepository, users::UserRepository,
        },
        value_objects::{coin_ledger::AdjustBalanceModel, coin_packs::UpsertCoinPackModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            coin_ledger::CoinLedgerPostgres, coin_packs::CoinPackPostgres, users::UserPostgres,
        },
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::error_response,
    usecases::admin_coins::AdminCoinUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, currency: String) -> Router {
    let admin_coin_usecase = AdminCoinUseCase::new(
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
        Arc::new(CoinLedgerPostgres::new(Arc::clone(&db_pool))),
        Arc::new(CoinPackPostgres::new(Arc::clone(&db_pool))),
        currency,
    );

    Router::new()
        .route(
            "/coins/adjust",
            post(adjust_balance::<UserPostgres, CoinLedgerPostgres, CoinPackPostgres>),
        )
        .route(
            "/coins/:user_id/audit",
            get(audit_balance::<UserPostgres, CoinLedgerPostgres, CoinPackPostgres>),
        )
        .route(
            "/coin-packs",
            put(upsert_coin_pack::<UserPostgres, CoinLedgerPostgres, CoinPackPostgres>),
        )
        .route(
            "/coin-packs/seed",
            post(seed_default_catalog::<UserPostgres, CoinLedgerPostgres, CoinPackPostgres>),
        )
        .with_state(Arc::new(admin_coin_usecase))
}

pub async fn adjust_balance<Usr, L, P>(
    State(admin_coin_usecase): State<Arc<AdminCoinUseCase<Usr, L, P>>>,
    auth: AuthUser,
    Json(model): Json<AdjustBalanceModel>,
) -> impl IntoResponse
where
    Usr: UserRepository + Send + Sync + 'static,
    L: CoinLedgerRepository + Send + Sync + 'static,
    P: CoinPackRepository + Send + Sync + 'static,
{
    match admin_coin_usecase.adjust_balance(auth.user_id, model).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => error_response(&err),
    }
}

pub async fn audit_balance<Usr, L, P>(
    State(admin_coin_usecase): State<Arc<AdminCoinUseCase<Usr, L, P>>>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse
where
    Usr: UserRepository + Send + Sync + 'static,
    L: CoinLedgerRepository + Send + Sync + 'static,
    P: CoinPackRepository + Send + Sync + 'static,
{
    match admin_coin_usecase.audit_balance(auth.user_id, user_id).await {
        Ok(audit) => Json(audit).into_response(),
        Err(err) => error_response(&err),
    }
}

pub async fn upsert_coin_pack<Usr, L, P>(
    State(admin_coin_usecase): State<Arc<AdminCoinUseCase<Usr, L, P>>>,
    auth: AuthUser,
    Json(model): Json<UpsertCoinPackModel>,
) -> impl IntoResponse
where
    Usr: UserRepository + Send + Sync + 'static,
    L: CoinLedgerRepository + Send + Sync + 'static,
    P: CoinPackRepository + Send + Sync + 'static,
{
    match admin_coin_usecase.upsert_coin_pack(auth.user_id, model).await {
        Ok(pack) => Json(pack).into_response(),
        Err(err) => error_response(&err),
    }
}

pub async fn seed_default_catalog<Usr, L, P>(
    State(admin_coin_usecase): State<Arc<AdminCoinUseCase<Usr, L, P>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    Usr: UserRepository + Send + Sync + 'static,
    L: CoinLedgerRepository + Send + Sync + 'static,
    P: CoinPackRepository + Send + Sync + 'static,
{
    match admin_coin_usecase.seed_default_catalog(auth.user_id).await {
        Ok(packs) => Json(packs).into_response(),
        Err(err) => error_response(&err),
    }
}
