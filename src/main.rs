use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analytics_portal_api::{
    app::build_app,
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    mail::{MailQueue, RetryPolicy, mailer_from_config, spawn_mail_worker},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,analytics_portal_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let mailer = mailer_from_config(&config.mail)?;
    let (mail, outbox) = MailQueue::channel(config.mail.queue_capacity);
    let _mail_worker = spawn_mail_worker(outbox, mailer, RetryPolicy::new(config.mail.max_attempts));

    let state = AppState::new(orm, &config, mail);
    let app = build_app(state);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
