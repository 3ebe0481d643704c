use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{error, info};

use crate::domain::value_objects::checkout::{ChargeRequest, ChargeSource, GatewayCharge};

pub const PAYMENT_GATEWAY_NAME: &str = "omise";

/// Minimal Omise client built on reqwest. Requests authenticate with the
/// secret key as the basic-auth username.
pub struct OmiseClient {
    http: reqwest::Client,
    secret_key: String,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct OmiseErrorEnvelope {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmiseSource {
    id: String,
}

#[derive(Debug, Deserialize)]
pub struct OmiseCharge {
    pub id: String,
    pub status: Option<String>,
    pub authorize_uri: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub failure_code: Option<String>,
    pub failure_message: Option<String>,
    pub source: Option<OmiseChargeSource>,
}

#[derive(Debug, Deserialize)]
pub struct OmiseChargeSource {
    pub scannable_code: Option<OmiseScannableCode>,
}

#[derive(Debug, Deserialize)]
pub struct OmiseScannableCode {
    pub image: Option<OmiseDocument>,
}

#[derive(Debug, Deserialize)]
pub struct OmiseDocument {
    pub download_uri: Option<String>,
}

impl OmiseCharge {
    /// QR image for push-payment sources such as PromptPay.
    pub fn qr_code_url(&self) -> Option<String> {
        self.source
            .as_ref()
            .and_then(|source| source.scannable_code.as_ref())
            .and_then(|code| code.image.as_ref())
            .and_then(|image| image.download_uri.clone())
    }
}

impl OmiseClient {
    pub fn new(secret_key: String, api_base_url: String, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http,
            secret_key,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (omise_error_code, omise_error_message) =
            match serde_json::from_str::<OmiseErrorEnvelope>(&body) {
                Ok(envelope) => (envelope.code, envelope.message),
                Err(_) => (None, None),
            };

        error!(
            status = %status,
            omise_error_code = ?omise_error_code,
            omise_error_message = ?omise_error_message,
            response_body = %body,
            context = %context,
            "omise api request failed"
        );

        anyhow::bail!(
            "Omise API request failed: {} (status {}, code={:?})",
            context,
            status,
            omise_error_code
        );
    }

    async fn post_form(&self, path: &str, body: &[(&str, String)], context: &str) -> Result<serde_json::Value> {
        let resp = self
            .http
            .post(format!("{}{}", self.api_base_url, path))
            .basic_auth(&self.secret_key, None::<&str>)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, context).await?;

        Ok(resp.json().await?)
    }

    /// Creates an offsite source (PromptPay or TrueMoney) and returns its id.
    async fn create_source(&self, request: &ChargeRequest) -> Result<String> {
        // https://docs.opn.ooo/sources-api
        let mut body = vec![
            ("amount", request.amount_minor.to_string()),
            ("currency", request.currency.clone()),
            ("type", request.source.method().to_string()),
        ];
        if let ChargeSource::TrueMoney { phone_number } = &request.source {
            body.push(("phone_number", phone_number.clone()));
        }

        let raw = self.post_form("/sources", &body, "create source").await?;
        let source: OmiseSource = serde_json::from_value(raw)?;
        Ok(source.id)
    }

    /// Creates a charge against either a source or a tokenized card.
    pub async fn create_charge(&self, request: &ChargeRequest) -> Result<GatewayCharge> {
        // https://docs.opn.ooo/charges-api
        let mut body = vec![
            ("amount", request.amount_minor.to_string()),
            ("currency", request.currency.clone()),
            ("return_uri", request.return_uri.clone()),
            ("metadata[user_id]", request.user_id.to_string()),
            ("metadata[coin_pack_id]", request.coin_pack_id.to_string()),
        ];

        match &request.source {
            ChargeSource::Card { token } => body.push(("card", token.clone())),
            ChargeSource::PromptPay | ChargeSource::TrueMoney { .. } => {
                let source_id = self.create_source(request).await?;
                body.push(("source", source_id));
            }
        }

        let raw = self.post_form("/charges", &body, "create charge").await?;
        let charge: OmiseCharge = serde_json::from_value(raw.clone())?;

        if charge.status.as_deref() == Some("failed") {
            return Err(anyhow!(
                "charge {} was declined: {}",
                charge.id,
                charge
                    .failure_message
                    .as_deref()
                    .or(charge.failure_code.as_deref())
                    .unwrap_or("unknown reason")
            ));
        }

        info!(
            charge_id = %charge.id,
            payment_method = %request.source.method(),
            amount = request.amount_minor,
            "omise: charge created"
        );

        Ok(GatewayCharge {
            qr_code_url: charge.qr_code_url(),
            authorize_uri: charge.authorize_uri,
            expires_at: charge.expires_at,
            charge_id: charge.id,
            raw,
        })
    }
}
