pub mod admin_coins;
pub mod chapter_unlock;
pub mod checkout;
pub mod coin_wallet;
pub mod payment_webhook;
pub mod writer_revenue;
