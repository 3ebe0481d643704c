pub mod admin;
pub mod chapters;
pub mod coins;
pub mod webhooks;
pub mod writer_revenue;
