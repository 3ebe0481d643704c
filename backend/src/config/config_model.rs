use super::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub stage: Stage,
    pub backend_server: BackendServer,
    pub database: Database,
    pub auth: Auth,
    pub omise: Omise,
    pub app: App,
    pub coin_economy: CoinEconomy,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct Omise {
    pub secret_key: String,
    pub api_base_url: String,
    pub request_timeout: u64,
    /// `None` disables webhook signature verification.
    pub webhook_secret: Option<String>,
    pub allow_unsigned_webhooks: bool,
}

#[derive(Debug, Clone)]
pub struct App {
    pub public_url: String,
}

impl App {
    /// Where the gateway sends the payer back when no return URI is given.
    pub fn default_return_uri(&self) -> String {
        format!("{}/coins", self.public_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone)]
pub struct CoinEconomy {
    pub currency: String,
    pub writer_revenue_percent: i32,
    pub coin_average_rate_minor: i32,
}
