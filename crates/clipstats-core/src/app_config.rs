use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub rabbitmq_url: String,
    pub redis_url: String,
    pub clip_service_url: String,
    pub campaign_service_url: String,
    pub jwt_secret: String,
    pub youtube_api_key: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub event_exchange: String,
    /// Allowed CORS origins. Empty means "allow any" (development default).
    pub allowed_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub platform_request_timeout_secs: u64,
    pub peer_request_timeout_secs: u64,
    pub batch_inter_request_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("event_exchange", &self.event_exchange)
            .field("allowed_origins", &self.allowed_origins)
            .field("database_url", &"[redacted]")
            .field("rabbitmq_url", &"[redacted]")
            .field("redis_url", &"[redacted]")
            .field("clip_service_url", &self.clip_service_url)
            .field("campaign_service_url", &self.campaign_service_url)
            .field("jwt_secret", &"[redacted]")
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "platform_request_timeout_secs",
                &self.platform_request_timeout_secs,
            )
            .field("peer_request_timeout_secs", &self.peer_request_timeout_secs)
            .field(
                "batch_inter_request_delay_ms",
                &self.batch_inter_request_delay_ms,
            )
            .finish()
    }
}
