pub mod coin_transaction_statuses;
pub mod ledger_types;
pub mod payment_methods;
pub mod user_roles;
