use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use crate::domain::value_objects::gateway_events::{ChargeOutcome, GatewayEvent, IgnoreReason};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "omise-signature";
const SIGNATURE_LEN: usize = 32;
pub const CHARGE_COMPLETE_KEY: &str = "charge.complete";

/// Allowed skew between an event's `created_at` and the local clock, in
/// either direction.
pub const TIMESTAMP_TOLERANCE: Duration = Duration::minutes(5);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookRejection {
    #[error("missing webhook signature")]
    MissingSignature,
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("malformed webhook payload: {0}")]
    Malformed(String),
    #[error("webhook timestamp outside the {tolerance_secs}s tolerance")]
    Stale { tolerance_secs: i64 },
}

impl WebhookRejection {
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            WebhookRejection::MissingSignature | WebhookRejection::InvalidSignature
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawWebhookEvent {
    key: Option<String>,
    created_at: Option<serde_json::Value>,
    data: Option<RawCharge>,
}

#[derive(Debug, Deserialize)]
struct RawCharge {
    id: Option<String>,
    status: Option<String>,
    failure_code: Option<String>,
    failure_message: Option<String>,
}

/// Authenticates and decodes gateway deliveries.
///
/// With no secret the signature step is skipped. Callers decide whether that
/// is acceptable at startup; the verifier only reports it through
/// [`WebhookVerifier::is_signing_enforced`].
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Option<String>,
    tolerance: Duration,
}

impl WebhookVerifier {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|secret| !secret.is_empty()),
            tolerance: TIMESTAMP_TOLERANCE,
        }
    }

    pub fn is_signing_enforced(&self) -> bool {
        self.secret.is_some()
    }

    /// Runs authenticity, freshness, and decoding in that order. Nothing here
    /// touches storage.
    pub fn verify(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<GatewayEvent, WebhookRejection> {
        self.verify_signature(payload, signature)?;

        let raw: RawWebhookEvent = serde_json::from_slice(payload)
            .map_err(|err| WebhookRejection::Malformed(err.to_string()))?;

        let created_at = raw
            .created_at
            .as_ref()
            .ok_or_else(|| WebhookRejection::Malformed("missing created_at".to_string()))
            .and_then(parse_timestamp)?;
        if (now - created_at).abs() > self.tolerance {
            return Err(WebhookRejection::Stale {
                tolerance_secs: self.tolerance.num_seconds(),
            });
        }

        into_event(raw)
    }

    /// Hex HMAC-SHA256 of the raw body, compared in constant time.
    pub fn verify_signature(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<(), WebhookRejection> {
        let Some(secret) = self.secret.as_deref() else {
            return Ok(());
        };

        let signature = signature
            .map(str::trim)
            .filter(|signature| !signature.is_empty())
            .ok_or(WebhookRejection::MissingSignature)?;
        let provided = hex::decode(signature).map_err(|_| WebhookRejection::InvalidSignature)?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| WebhookRejection::InvalidSignature)?;
        mac.update(payload);

        if provided.len() != SIGNATURE_LEN {
            return Err(WebhookRejection::InvalidSignature);
        }
        mac.verify_slice(&provided)
            .map_err(|_| WebhookRejection::InvalidSignature)
    }
}

/// Accepts RFC 3339 strings and unix seconds.
fn parse_timestamp(value: &serde_json::Value) -> Result<DateTime<Utc>, WebhookRejection> {
    let parsed = match value {
        serde_json::Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        serde_json::Value::Number(number) => number
            .as_i64()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        _ => None,
    };

    parsed.ok_or_else(|| WebhookRejection::Malformed(format!("invalid created_at: {value}")))
}

fn into_event(raw: RawWebhookEvent) -> Result<GatewayEvent, WebhookRejection> {
    let key = raw
        .key
        .ok_or_else(|| WebhookRejection::Malformed("missing key".to_string()))?;

    if key != CHARGE_COMPLETE_KEY {
        return Ok(GatewayEvent::Ignored {
            key,
            reason: IgnoreReason::UnhandledEventKey,
        });
    }

    let charge = raw
        .data
        .ok_or_else(|| WebhookRejection::Malformed("missing data".to_string()))?;
    let charge_id = charge
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| WebhookRejection::Malformed("missing charge id".to_string()))?;

    let outcome = match charge.status.as_deref() {
        Some("successful") => ChargeOutcome::Successful,
        Some("failed") => ChargeOutcome::Failed {
            failure_code: charge.failure_code,
            failure_message: charge.failure_message,
        },
        Some("expired") => ChargeOutcome::Expired,
        _ => {
            return Ok(GatewayEvent::Ignored {
                key,
                reason: IgnoreReason::NonTerminalChargeStatus,
            });
        }
    };

    Ok(GatewayEvent::ChargeCompleted { charge_id, outcome })
}
