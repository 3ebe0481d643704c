pub mod chapters;
pub mod coin_ledger;
pub mod coin_packs;
pub mod coin_spends;
pub mod coin_transactions;
pub mod users;
pub mod writer_revenues;
