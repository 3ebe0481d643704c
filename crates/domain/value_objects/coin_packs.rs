use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::coin_packs::{CoinPackEntity, UpsertCoinPackEntity};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoinPackDto {
    pub id: Uuid,
    pub name: String,
    pub price: i32,
    pub price_display: String,
    pub coins: i32,
    pub bonus_coins: i32,
    pub total_coins: i32,
    pub is_featured: bool,
}

impl CoinPackDto {
    pub fn from_entity(value: CoinPackEntity, currency: &str) -> Self {
        Self {
            id: value.id,
            price_display: format_price_label(value.price, currency),
            total_coins: value.total_coins().unwrap_or(i32::MAX),
            name: value.name,
            price: value.price,
            coins: value.coins,
            bonus_coins: value.bonus_coins,
            is_featured: value.is_featured,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoinPacksDto {
    pub packs: Vec<CoinPackDto>,
}

/// Administrative catalog entry. `name` is the logical identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpsertCoinPackModel {
    pub name: String,
    pub price: i32,
    pub coins: i32,
    #[serde(default)]
    pub bonus_coins: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_true() -> bool {
    true
}

impl UpsertCoinPackModel {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.price <= 0 {
            return Err("price must be positive".to_string());
        }
        if self.coins <= 0 {
            return Err("coins must be positive".to_string());
        }
        if self.bonus_coins < 0 {
            return Err("bonus_coins must not be negative".to_string());
        }
        if self.coins.checked_add(self.bonus_coins).is_none() {
            return Err("coins plus bonus_coins is too large".to_string());
        }
        Ok(())
    }

    pub fn to_entity(&self) -> UpsertCoinPackEntity {
        UpsertCoinPackEntity {
            name: self.name.trim().to_string(),
            price: self.price,
            coins: self.coins,
            bonus_coins: self.bonus_coins,
            is_active: self.is_active,
            is_featured: self.is_featured,
            sort_order: self.sort_order,
        }
    }
}

/// Packs provisioned by the catalog seed.
pub fn default_catalog() -> Vec<UpsertCoinPackModel> {
    let pack = |name: &str, price, coins, bonus_coins, is_featured, sort_order| UpsertCoinPackModel {
        name: name.to_string(),
        price,
        coins,
        bonus_coins,
        is_active: true,
        is_featured,
        sort_order,
    };

    vec![
        pack("Starter", 2900, 30, 0, false, 1),
        pack("Reader", 9900, 100, 10, false, 2),
        pack("Bookworm", 19900, 200, 30, true, 3),
        pack("Collector", 49900, 500, 100, false, 4),
        pack("Patron", 99900, 1000, 250, false, 5),
    ]
}

/// Renders minor currency units as a grouped major amount, e.g. `12950 -> "129.50 THB"`.
pub fn format_price_label(price_minor: i32, currency: &str) -> String {
    let sign = if price_minor < 0 { "-" } else { "" };
    let price = i64::from(price_minor).abs();
    let major = group_thousands(price / 100);
    let minor = price % 100;

    if minor == 0 {
        format!("{}{} {}", sign, major, currency)
    } else {
        format!("{}{}.{:02} {}", sign, major, minor, currency)
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
