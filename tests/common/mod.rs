#![allow(dead_code)]

use analytics_portal_api::{
    config::{AppConfig, MailConfig},
    db::{create_orm_conn, run_migrations},
    entity::users::ActiveModel as UserActive,
    mail::{MailQueue, OutboundEmail},
    middleware::auth::AuthUser,
    models::Role,
    services::auth_service::hash_password,
    state::AppState,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::mpsc;
use uuid::Uuid;

pub const PASSWORD: &str = "s3cret-pass";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "integration-test-secret".into(),
        session_ttl_hours: 1,
        verification_ttl_hours: 1,
        public_base_url: "http://portal.test/".into(),
        default_dashboard_url: "https://dashboards.test/overview".into(),
        mail: MailConfig {
            from: "no-reply@portal.test".into(),
            api_url: None,
            api_key: None,
            queue_capacity: 16,
            max_attempts: 1,
        },
    }
}

/// Fresh in-memory database per call. The receiver stands in for the mail worker.
pub async fn setup_state() -> anyhow::Result<(AppState, mpsc::Receiver<OutboundEmail>)> {
    let config = test_config();
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let (mail, outbox) = MailQueue::channel(config.mail.queue_capacity);
    Ok((AppState::new(orm, &config, mail), outbox))
}

/// Inserts a verified account directly, bypassing signup.
pub async fn create_user(state: &AppState, email: &str, role: Role) -> anyhow::Result<AuthUser> {
    let now = Utc::now();
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(email.split('@').next().unwrap_or(email).to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(PASSWORD)?),
        role: Set(role.as_str().to_string()),
        is_verified: Set(true),
        verification_token: Set(None),
        company: Set(None),
        profile_completion: Set(80),
        notification_channels: Set(serde_json::json!(["Email"])),
        dashboard_url: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        email: user.email,
        role,
    })
}

/// Drains whatever the services queued so far.
pub fn drain(outbox: &mut mpsc::Receiver<OutboundEmail>) -> Vec<OutboundEmail> {
    let mut sent = Vec::new();
    while let Ok(email) = outbox.try_recv() {
        sent.push(email);
    }
    sent
}
