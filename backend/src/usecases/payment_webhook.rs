use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use crates::{
    domain::{
        repositories::coin_transactions::CoinTransactionRepository,
        value_objects::{
            coin_transactions::{Settlement, SettlementOutcome},
            enums::coin_transaction_statuses::CoinTransactionStatus,
            gateway_events::{GatewayEvent, WebhookAckDto},
        },
    },
    payments::omise_webhook::{WebhookRejection, WebhookVerifier},
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::axum_http::error_responses::ApiError;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error(transparent)]
    Rejected(WebhookRejection),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError for WebhookError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Rejected(rejection) if rejection.is_authentication_failure() => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::Rejected(_) => StatusCode::BAD_REQUEST,
            WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            WebhookError::Rejected(WebhookRejection::MissingSignature) => "MISSING_SIGNATURE",
            WebhookError::Rejected(WebhookRejection::InvalidSignature) => "INVALID_SIGNATURE",
            WebhookError::Rejected(WebhookRejection::Malformed(_)) => "MALFORMED_PAYLOAD",
            WebhookError::Rejected(WebhookRejection::Stale { .. }) => "STALE_EVENT",
            WebhookError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, WebhookError>;

pub struct PaymentWebhookUseCase<T>
where
    T: CoinTransactionRepository + Send + Sync + 'static,
{
    transaction_repo: Arc<T>,
    verifier: WebhookVerifier,
}

impl<T> PaymentWebhookUseCase<T>
where
    T: CoinTransactionRepository + Send + Sync + 'static,
{
    pub fn new(transaction_repo: Arc<T>, verifier: WebhookVerifier) -> Self {
        Self {
            transaction_repo,
            verifier,
        }
    }

    /// Authenticates the raw delivery, then settles the referenced
    /// transaction at most once. Rejections happen before any storage access.
    pub async fn handle_gateway_event(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> UseCaseResult<WebhookAckDto> {
        let event = self
            .verifier
            .verify(payload, signature, Utc::now())
            .map_err(|rejection| {
                warn!(
                    reason = %rejection,
                    signature_present = signature.is_some(),
                    payload_len = payload.len(),
                    "payment_webhook: delivery rejected"
                );
                WebhookError::Rejected(rejection)
            })?;

        let (charge_id, outcome) = match event {
            GatewayEvent::ChargeCompleted { charge_id, outcome } => (charge_id, outcome),
            GatewayEvent::Ignored { key, reason } => {
                info!(event_key = %key, reason = ?reason, "payment_webhook: event ignored");
                return Ok(WebhookAckDto::ignored(reason));
            }
        };

        let settlement = Settlement::from(outcome);
        let target = settlement.target_status();

        let outcome = self
            .transaction_repo
            .settle(&charge_id, settlement)
            .await
            .map_err(|err| {
                error!(
                    charge_id = %charge_id,
                    target_status = %target,
                    db_error = ?err,
                    "payment_webhook: settlement failed"
                );
                WebhookError::Internal(err)
            })?;

        let ack = match outcome {
            SettlementOutcome::Completed {
                transaction_id,
                user_id,
                coins_granted,
                new_balance,
            } => {
                info!(
                    %user_id,
                    %transaction_id,
                    charge_id = %charge_id,
                    coins_granted,
                    new_balance,
                    "payment_webhook: purchase credited"
                );
                WebhookAckDto::settled(CoinTransactionStatus::Completed)
            }
            SettlementOutcome::Failed { transaction_id } => {
                info!(%transaction_id, charge_id = %charge_id, "payment_webhook: charge failed");
                WebhookAckDto::settled(CoinTransactionStatus::Failed)
            }
            SettlementOutcome::Expired { transaction_id } => {
                info!(%transaction_id, charge_id = %charge_id, "payment_webhook: charge expired");
                WebhookAckDto::settled(CoinTransactionStatus::Expired)
            }
            SettlementOutcome::AlreadySettled(status) => {
                info!(
                    charge_id = %charge_id,
                    current_status = %status,
                    reported_status = %target,
                    "payment_webhook: duplicate delivery for settled transaction"
                );
                WebhookAckDto::duplicate(status)
            }
            SettlementOutcome::NotFound => {
                error!(charge_id = %charge_id, "payment_webhook: no transaction for charge");
                WebhookAckDto::unknown_charge()
            }
        };

        Ok(ack)
    }
}
