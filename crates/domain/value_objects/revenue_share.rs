use anyhow::{Result, bail};
use serde::Serialize;

/// Writer share of a chapter spend.
///
/// The currency value uses a single average rate for every coin rather than the
/// rate of the pack that funded the spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueShare {
    percent: i32,
    minor_per_coin: i32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WriterShare {
    pub coins_earned: i32,
    pub amount_minor: i32,
}

impl RevenueShare {
    pub fn new(percent: i32, minor_per_coin: i32) -> Result<Self> {
        if !(0..=100).contains(&percent) {
            bail!("writer revenue percent must be within 0..=100, got {percent}");
        }
        if minor_per_coin < 0 {
            bail!("coin average rate must not be negative, got {minor_per_coin}");
        }
        Ok(Self {
            percent,
            minor_per_coin,
        })
    }

    pub fn percent(&self) -> i32 {
        self.percent
    }

    pub fn minor_per_coin(&self) -> i32 {
        self.minor_per_coin
    }

    /// `coins_earned = floor(price * percent / 100)`, valued at the average rate.
    pub fn split(&self, price: i32) -> WriterShare {
        let price = i64::from(price.max(0));
        let coins_earned = price * i64::from(self.percent) / 100;
        let amount_minor = coins_earned * i64::from(self.minor_per_coin);

        WriterShare {
            coins_earned: i32::try_from(coins_earned).unwrap_or(i32::MAX),
            amount_minor: i32::try_from(amount_minor).unwrap_or(i32::MAX),
        }
    }
}
