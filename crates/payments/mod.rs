pub mod omise_client;
pub mod omise_webhook;
