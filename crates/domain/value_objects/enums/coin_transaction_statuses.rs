use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoinTransactionStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Expired,
}

impl Display for CoinTransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            CoinTransactionStatus::Pending => "PENDING",
            CoinTransactionStatus::Completed => "COMPLETED",
            CoinTransactionStatus::Failed => "FAILED",
            CoinTransactionStatus::Expired => "EXPIRED",
        };
        write!(f, "{}", status)
    }
}

impl CoinTransactionStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(CoinTransactionStatus::Pending),
            "COMPLETED" => Some(CoinTransactionStatus::Completed),
            "FAILED" => Some(CoinTransactionStatus::Failed),
            "EXPIRED" => Some(CoinTransactionStatus::Expired),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CoinTransactionStatus::Pending)
    }
}
