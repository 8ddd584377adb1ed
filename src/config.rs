use std::env;

const DEFAULT_DASHBOARD_URL: &str =
    "https://public.tableau.com/views/SuperstoreOverview/Dashboard1";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub verification_ttl_hours: i64,
    pub public_base_url: String,
    pub default_dashboard_url: String,
    pub mail: MailConfig,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from: String,
    /// HTTP relay endpoint; mail is only logged when unset.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub queue_capacity: usize,
    pub max_attempts: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"));

        let mail = MailConfig {
            from: env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@analytics.local".to_string()),
            api_url: env::var("MAIL_API_URL").ok().filter(|v| !v.is_empty()),
            api_key: env::var("MAIL_API_KEY").ok().filter(|v| !v.is_empty()),
            queue_capacity: parse_or("MAIL_QUEUE_CAPACITY", 256),
            max_attempts: parse_or("MAIL_MAX_ATTEMPTS", 3),
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            session_ttl_hours: parse_or("SESSION_TOKEN_TTL_HOURS", 24 * 7),
            verification_ttl_hours: parse_or("VERIFICATION_TOKEN_TTL_HOURS", 24),
            public_base_url,
            default_dashboard_url: env::var("DEFAULT_DASHBOARD_URL")
                .unwrap_or_else(|_| DEFAULT_DASHBOARD_URL.to_string()),
            mail,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
