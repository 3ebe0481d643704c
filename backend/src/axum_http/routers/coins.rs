use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            coin_ledger::CoinLedgerRepository, coin_packs::CoinPackRepository,
            coin_transactions::CoinTransactionRepository,
        },
        value_objects::checkout::CreateCheckoutRequest,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            coin_ledger::CoinLedgerPostgres, coin_packs::CoinPackPostgres,
            coin_transactions::CoinTransactionPostgres,
        },
    },
    payments::omise_client::OmiseClient,
};
use serde::Deserialize;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::error_response,
    config::config_model::DotEnvyConfig,
    usecases::{
        checkout::{CheckoutUseCase, PaymentGateway},
        coin_wallet::CoinWalletUseCase,
    },
};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    config: Arc<DotEnvyConfig>,
    omise_client: Arc<OmiseClient>,
) -> Router {
    let coin_ledger_repository = Arc::new(CoinLedgerPostgres::new(Arc::clone(&db_pool)));
    let coin_pack_repository = Arc::new(CoinPackPostgres::new(Arc::clone(&db_pool)));
    let coin_transaction_repository = CoinTransactionPostgres::new(Arc::clone(&db_pool));

    let coin_wallet_usecase = CoinWalletUseCase::new(
        coin_ledger_repository,
        Arc::clone(&coin_pack_repository),
        config.coin_economy.currency.clone(),
    );
    let checkout_usecase = CheckoutUseCase::new(
        coin_pack_repository,
        Arc::new(coin_transaction_repository),
        omise_client,
        config.coin_economy.currency.clone(),
        config.app.default_return_uri(),
    );

    let wallet = Router::new()
        .route(
            "/packs",
            get(list_packs::<CoinLedgerPostgres, CoinPackPostgres>),
        )
        .route(
            "/balance",
            get(get_balance::<CoinLedgerPostgres, CoinPackPostgres>),
        )
        .route(
            "/history",
            get(get_history::<CoinLedgerPostgres, CoinPackPostgres>),
        )
        .with_state(Arc::new(coin_wallet_usecase));

    let checkout = Router::new()
        .route(
            "/checkout",
            post(create_checkout::<CoinPackPostgres, CoinTransactionPostgres, OmiseClient>),
        )
        .with_state(Arc::new(checkout_usecase));

    wallet.merge(checkout)
}

pub async fn list_packs<L, P>(
    State(coin_wallet_usecase): State<Arc<CoinWalletUseCase<L, P>>>,
) -> impl IntoResponse
where
    L: CoinLedgerRepository + Send + Sync + 'static,
    P: CoinPackRepository + Send + Sync + 'static,
{
    match coin_wallet_usecase.list_packs().await {
        Ok(packs) => Json(packs).into_response(),
        Err(err) => error_response(&err),
    }
}

pub async fn get_balance<L, P>(
    State(coin_wallet_usecase): State<Arc<CoinWalletUseCase<L, P>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    L: CoinLedgerRepository + Send + Sync + 'static,
    P: CoinPackRepository + Send + Sync + 'static,
{
    match coin_wallet_usecase.get_balance(auth.user_id).await {
        Ok(balance) => Json(balance).into_response(),
        Err(err) => error_response(&err),
    }
}

pub async fn get_history<L, P>(
    State(coin_wallet_usecase): State<Arc<CoinWalletUseCase<L, P>>>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse
where
    L: CoinLedgerRepository + Send + Sync + 'static,
    P: CoinPackRepository + Send + Sync + 'static,
{
    match coin_wallet_usecase
        .get_history(auth.user_id, query.limit, query.offset)
        .await
    {
        Ok(history) => Json(history).into_response(),
        Err(err) => error_response(&err),
    }
}

pub async fn create_checkout<P, T, G>(
    State(checkout_usecase): State<Arc<CheckoutUseCase<P, T, G>>>,
    auth: AuthUser,
    Json(request): Json<CreateCheckoutRequest>,
) -> impl IntoResponse
where
    P: CoinPackRepository + Send + Sync + 'static,
    T: CoinTransactionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    match checkout_usecase.create_checkout(auth.user_id, request).await {
        Ok(artifact) => (StatusCode::CREATED, Json(artifact)).into_response(),
        Err(err) => error_response(&err),
    }
}
