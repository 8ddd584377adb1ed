use std::sync::Arc;

use chrono::Duration;

use crate::{config::AppConfig, db::OrmConn, mail::MailQueue, services::token_service::TokenService};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub tokens: TokenService,
    pub mail: MailQueue,
    pub settings: Arc<Settings>,
}

/// Plain values handlers need when composing responses and emails.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base for links sent by email, without a trailing slash.
    pub public_base_url: String,
    pub default_dashboard_url: String,
}

impl AppState {
    pub fn new(orm: OrmConn, config: &AppConfig, mail: MailQueue) -> Self {
        let tokens = TokenService::new(
            &config.jwt_secret,
            Duration::hours(config.session_ttl_hours),
            Duration::hours(config.verification_ttl_hours),
        );
        let settings = Settings {
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            default_dashboard_url: config.default_dashboard_url.clone(),
        };
        Self {
            orm,
            tokens,
            mail,
            settings: Arc::new(settings),
        }
    }
}
