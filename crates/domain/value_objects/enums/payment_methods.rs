use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[serde(rename = "promptpay")]
    PromptPay,
    CreditCard,
    #[serde(rename = "truemoney")]
    TrueMoney,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::PromptPay => "promptpay",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::TrueMoney => "truemoney",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "promptpay" => Some(PaymentMethod::PromptPay),
            "credit_card" => Some(PaymentMethod::CreditCard),
            "truemoney" => Some(PaymentMethod::TrueMoney),
            _ => None,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
