use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use axum::http::StatusCode;
use crates::{
    domain::{
        entities::coin_transactions::InsertCoinTransactionEntity,
        repositories::{coin_packs::CoinPackRepository, coin_transactions::CoinTransactionRepository},
        value_objects::{
            checkout::{
                ChargeRequest, ChargeSource, CheckoutArtifactDto, CreateCheckoutRequest, GatewayCharge,
            },
            enums::{coin_transaction_statuses::CoinTransactionStatus, payment_methods::PaymentMethod},
        },
    },
    payments::omise_client::{OmiseClient, PAYMENT_GATEWAY_NAME},
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::axum_http::error_responses::ApiError;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PaymentGateway: Send + Sync {
    fn gateway_name(&self) -> &'static str;

    async fn create_charge_artifact(&self, request: ChargeRequest) -> AnyResult<GatewayCharge>;
}

#[async_trait]
impl PaymentGateway for OmiseClient {
    fn gateway_name(&self) -> &'static str {
        PAYMENT_GATEWAY_NAME
    }

    async fn create_charge_artifact(&self, request: ChargeRequest) -> AnyResult<GatewayCharge> {
        self.create_charge(&request).await
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("coin pack not found or inactive")]
    InvalidCoinPack,
    #[error("failed to create payment")]
    Gateway(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError for CheckoutError {
    fn status_code(&self) -> StatusCode {
        match self {
            CheckoutError::UnsupportedPaymentMethod(_)
            | CheckoutError::MissingParameter(_)
            | CheckoutError::InvalidCoinPack => StatusCode::BAD_REQUEST,
            CheckoutError::Gateway(_) => StatusCode::BAD_GATEWAY,
            CheckoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CheckoutError::UnsupportedPaymentMethod(_) => "UNSUPPORTED_PAYMENT_METHOD",
            CheckoutError::MissingParameter(_) => "MISSING_PARAMETER",
            CheckoutError::InvalidCoinPack => "INVALID_COIN_PACK",
            CheckoutError::Gateway(_) => "PAYMENT_CREATION_FAILED",
            CheckoutError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CheckoutError>;

pub struct CheckoutUseCase<P, T, G>
where
    P: CoinPackRepository + Send + Sync + 'static,
    T: CoinTransactionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    pack_repo: Arc<P>,
    transaction_repo: Arc<T>,
    gateway: Arc<G>,
    currency: String,
    default_return_uri: String,
}

impl<P, T, G> CheckoutUseCase<P, T, G>
where
    P: CoinPackRepository + Send + Sync + 'static,
    T: CoinTransactionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    pub fn new(
        pack_repo: Arc<P>,
        transaction_repo: Arc<T>,
        gateway: Arc<G>,
        currency: String,
        default_return_uri: String,
    ) -> Self {
        Self {
            pack_repo,
            transaction_repo,
            gateway,
            currency,
            default_return_uri,
        }
    }

    /// Validates everything locally, asks the gateway for a payable artifact,
    /// then records a PENDING transaction keyed by the returned charge id.
    /// No balance changes here.
    pub async fn create_checkout(
        &self,
        user_id: Uuid,
        request: CreateCheckoutRequest,
    ) -> UseCaseResult<CheckoutArtifactDto> {
        let method = PaymentMethod::from_str(request.payment_method.trim()).ok_or_else(|| {
            CheckoutError::UnsupportedPaymentMethod(request.payment_method.clone())
        })?;
        let source = ChargeSource::from_method(
            method,
            request.token.as_deref(),
            request.phone_number.as_deref(),
        )
        .map_err(CheckoutError::MissingParameter)?;

        let pack = self
            .pack_repo
            .find_by_id(request.coin_pack_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    coin_pack_id = %request.coin_pack_id,
                    db_error = ?err,
                    "checkout: failed to load coin pack"
                );
                CheckoutError::Internal(err)
            })?
            .filter(|pack| pack.is_active)
            .ok_or_else(|| {
                warn!(%user_id, coin_pack_id = %request.coin_pack_id, "checkout: coin pack missing or inactive");
                CheckoutError::InvalidCoinPack
            })?;

        let return_uri = request
            .return_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.default_return_uri.clone());

        let Some(coins_granted) = pack.total_coins() else {
            error!(%user_id, coin_pack_id = %pack.id, "checkout: coin pack total overflows");
            return Err(CheckoutError::InvalidCoinPack);
        };
        let charge_request = ChargeRequest {
            amount_minor: pack.price,
            currency: self.currency.clone(),
            source,
            return_uri,
            user_id,
            coin_pack_id: pack.id,
        };

        let charge = self
            .gateway
            .create_charge_artifact(charge_request)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    coin_pack_id = %pack.id,
                    payment_method = %method,
                    error = ?err,
                    "checkout: gateway charge creation failed"
                );
                CheckoutError::Gateway(err)
            })?;

        let transaction = self
            .transaction_repo
            .create_pending(InsertCoinTransactionEntity {
                user_id,
                coin_pack_id: pack.id,
                coins_granted,
                paid_amount: pack.price,
                payment_gateway: self.gateway.gateway_name().to_string(),
                gateway_tx_id: charge.charge_id.clone(),
                gateway_payload: charge.raw.clone(),
                payment_method: method.to_string(),
                status: CoinTransactionStatus::Pending.to_string(),
            })
            .await
            .map_err(|err| {
                // The charge exists at the gateway but has no local row; its
                // webhook will be acknowledged as an unknown charge.
                error!(
                    %user_id,
                    charge_id = %charge.charge_id,
                    db_error = ?err,
                    "checkout: failed to persist pending transaction"
                );
                CheckoutError::Internal(err)
            })?;

        info!(
            %user_id,
            transaction_id = %transaction.id,
            charge_id = %charge.charge_id,
            payment_method = %method,
            coins_granted,
            "checkout: pending transaction created"
        );

        Ok(CheckoutArtifactDto {
            transaction_id: transaction.id,
            charge_id: charge.charge_id,
            payment_method: method,
            amount: pack.price,
            coins_granted,
            qr_code_url: charge.qr_code_url,
            authorize_uri: charge.authorize_uri,
            expires_at: charge.expires_at,
        })
    }
}
