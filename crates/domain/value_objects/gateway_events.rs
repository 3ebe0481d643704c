use serde::Serialize;

use crate::domain::value_objects::enums::coin_transaction_statuses::CoinTransactionStatus;

/// Reported result of a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    Successful,
    Failed {
        failure_code: Option<String>,
        failure_message: Option<String>,
    },
    Expired,
}

/// The subset of gateway deliveries the reconciler acts on. Anything else is
/// carried as `Ignored` and acknowledged without touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    ChargeCompleted {
        charge_id: String,
        outcome: ChargeOutcome,
    },
    Ignored {
        key: String,
        reason: IgnoreReason,
    },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    UnhandledEventKey,
    /// A `charge.complete` whose charge is still pending or carries a status
    /// this service does not settle on.
    NonTerminalChargeStatus,
}

impl GatewayEvent {
    pub fn key(&self) -> &str {
        match self {
            GatewayEvent::ChargeCompleted { .. } => "charge.complete",
            GatewayEvent::Ignored { key, .. } => key,
        }
    }
}

/// Body returned to the gateway for every delivery it should not retry.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WebhookAckDto {
    pub received: bool,
    pub status: Option<CoinTransactionStatus>,
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<IgnoreReason>,
}

impl WebhookAckDto {
    pub fn settled(status: CoinTransactionStatus) -> Self {
        Self {
            received: true,
            status: Some(status),
            duplicate: false,
            ignored: None,
        }
    }

    pub fn duplicate(status: CoinTransactionStatus) -> Self {
        Self {
            duplicate: true,
            ..Self::settled(status)
        }
    }

    pub fn ignored(reason: IgnoreReason) -> Self {
        Self {
            received: true,
            status: None,
            duplicate: false,
            ignored: Some(reason),
        }
    }

    /// Charge id with no local transaction.
    pub fn unknown_charge() -> Self {
        Self {
            received: true,
            status: None,
            duplicate: false,
            ignored: None,
        }
    }
}
