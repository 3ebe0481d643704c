use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::enums::payment_methods::PaymentMethod;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCheckoutRequest {
    pub coin_pack_id: Uuid,
    pub payment_method: String,
    pub return_uri: Option<String>,
    /// Tokenized card reference, required for `credit_card`.
    pub token: Option<String>,
    /// Wallet phone number, required for `truemoney`.
    pub phone_number: Option<String>,
}

/// A payment method together with the parameters it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeSource {
    PromptPay,
    TrueMoney { phone_number: String },
    Card { token: String },
}

impl ChargeSource {
    /// Pairs a method with its method-specific parameter. The error names the
    /// missing parameter.
    pub fn from_method(
        method: PaymentMethod,
        token: Option<&str>,
        phone_number: Option<&str>,
    ) -> Result<Self, &'static str> {
        let present = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        match method {
            PaymentMethod::PromptPay => Ok(ChargeSource::PromptPay),
            PaymentMethod::TrueMoney => present(phone_number)
                .map(|phone_number| ChargeSource::TrueMoney { phone_number })
                .ok_or("phone_number"),
            PaymentMethod::CreditCard => present(token)
                .map(|token| ChargeSource::Card { token })
                .ok_or("token"),
        }
    }

    pub fn method(&self) -> PaymentMethod {
        match self {
            ChargeSource::PromptPay => PaymentMethod::PromptPay,
            ChargeSource::TrueMoney { .. } => PaymentMethod::TrueMoney,
            ChargeSource::Card { .. } => PaymentMethod::CreditCard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub amount_minor: i32,
    pub currency: String,
    pub source: ChargeSource,
    pub return_uri: String,
    pub user_id: Uuid,
    pub coin_pack_id: Uuid,
}

/// What the gateway hands back for a newly created charge.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayCharge {
    pub charge_id: String,
    pub qr_code_url: Option<String>,
    pub authorize_uri: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckoutArtifactDto {
    pub transaction_id: Uuid,
    pub charge_id: String,
    pub payment_method: PaymentMethod,
    pub amount: i32,
    pub coins_granted: i32,
    pub qr_code_url: Option<String>,
    pub authorize_uri: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}
