use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerType {
    Purchase,
    Spend,
    Refund,
    Bonus,
    AdminAdjust,
}

impl LedgerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerType::Purchase => "PURCHASE",
            LedgerType::Spend => "SPEND",
            LedgerType::Refund => "REFUND",
            LedgerType::Bonus => "BONUS",
            LedgerType::AdminAdjust => "ADMIN_ADJUST",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "PURCHASE" => Some(LedgerType::Purchase),
            "SPEND" => Some(LedgerType::Spend),
            "REFUND" => Some(LedgerType::Refund),
            "BONUS" => Some(LedgerType::Bonus),
            "ADMIN_ADJUST" => Some(LedgerType::AdminAdjust),
            _ => None,
        }
    }

    /// Types an administrator may post by hand. Purchases and spends only
    /// come from checkout reconciliation and chapter unlocks.
    pub fn is_manual(&self) -> bool {
        matches!(
            self,
            LedgerType::Refund | LedgerType::Bonus | LedgerType::AdminAdjust
        )
    }
}

impl Display for LedgerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
