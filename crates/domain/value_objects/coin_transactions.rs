use uuid::Uuid;

use crate::domain::value_objects::{
    enums::coin_transaction_statuses::CoinTransactionStatus, gateway_events::ChargeOutcome,
};

/// Terminal transition requested for a pending transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Complete,
    Fail {
        failure_code: Option<String>,
        failure_message: Option<String>,
    },
    Expire,
}

impl Settlement {
    pub fn target_status(&self) -> CoinTransactionStatus {
        match self {
            Settlement::Complete => CoinTransactionStatus::Completed,
            Settlement::Fail { .. } => CoinTransactionStatus::Failed,
            Settlement::Expire => CoinTransactionStatus::Expired,
        }
    }
}

impl From<ChargeOutcome> for Settlement {
    fn from(value: ChargeOutcome) -> Self {
        match value {
            ChargeOutcome::Successful => Settlement::Complete,
            ChargeOutcome::Failed {
                failure_code,
                failure_message,
            } => Settlement::Fail {
                failure_code,
                failure_message,
            },
            ChargeOutcome::Expired => Settlement::Expire,
        }
    }
}

/// Result of the atomic settle unit. Only `Completed` moved coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    Completed {
        transaction_id: Uuid,
        user_id: Uuid,
        coins_granted: i32,
        new_balance: i32,
    },
    Failed { transaction_id: Uuid },
    Expired { transaction_id: Uuid },
    AlreadySettled(CoinTransactionStatus),
    NotFound,
}
