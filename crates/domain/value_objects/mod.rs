pub mod chapter_unlocks;
pub mod checkout;
pub mod coin_ledger;
pub mod coin_packs;
pub mod coin_transactions;
pub mod enums;
pub mod gateway_events;
pub mod revenue_share;
pub mod writer_revenues;
