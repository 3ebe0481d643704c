use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use crates::{
    domain::repositories::coin_transactions::CoinTransactionRepository,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::coin_transactions::CoinTransactionPostgres,
    },
    payments::omise_webhook::{SIGNATURE_HEADER, WebhookVerifier},
};

use crate::{axum_http::error_responses::error_response, usecases::payment_webhook::PaymentWebhookUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>, verifier: WebhookVerifier) -> Router {
    let coin_transaction_repository = CoinTransactionPostgres::new(Arc::clone(&db_pool));
    let payment_webhook_usecase =
        PaymentWebhookUseCase::new(Arc::new(coin_transaction_repository), verifier);

    Router::new()
        .route("/omise", post(omise_webhook::<CoinTransactionPostgres>))
        .with_state(Arc::new(payment_webhook_usecase))
}

/// The body is taken as raw bytes so the signature covers exactly what was sent.
pub async fn omise_webhook<T>(
    State(payment_webhook_usecase): State<Arc<PaymentWebhookUseCase<T>>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse
where
    T: CoinTransactionRepository + Send + Sync + 'static,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match payment_webhook_usecase
        .handle_gateway_event(&body, signature)
        .await
    {
        Ok(ack) => Json(ack).into_response(),
        Err(err) => error_response(&err),
    }
}
