mod common;

use analytics_portal_api::routes::health::health_check;
use axum::extract::State;

#[tokio::test]
async fn health_check_returns_ok() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "ok");
    Ok(())
}
