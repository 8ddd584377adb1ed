mod common;

use analytics_portal_api::{
    app::build_app,
    dto::{
        analytics::{CreateAnalyticsReportRequest, UpdateAnalyticsReportRequest},
        auth::TokenPurpose,
    },
    entity::Notifications,
    error::AppError,
    models::Role,
    routes::params::StatusListQuery,
    services::{analytics_service, user_service},
};
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

fn new_report(user_id: Uuid) -> CreateAnalyticsReportRequest {
    CreateAnalyticsReportRequest {
        user_id,
        title: "Sales Forecast Q2".into(),
        results_url: None,
    }
}

fn move_to(status: &str, results_url: Option<&str>) -> UpdateAnalyticsReportRequest {
    UpdateAnalyticsReportRequest {
        status: status.into(),
        results_url: results_url.map(str::to_owned),
    }
}

#[tokio::test]
async fn admin_prepares_report_and_owner_is_notified() -> anyhow::Result<()> {
    let (state, mut outbox) = common::setup_state().await?;
    let customer = common::create_user(&state, "ann@x.com", Role::Customer).await?;
    let admin = common::create_user(&state, "root@x.com", Role::Admin).await?;

    let err = analytics_service::create_report(&state, &customer, new_report(customer.user_id))
        .await
        .expect_err("customer");
    assert!(matches!(err, AppError::Forbidden));

    let err = analytics_service::create_report(&state, &admin, new_report(Uuid::new_v4()))
        .await
        .expect_err("unknown user");
    assert!(matches!(err, AppError::BadRequest(_)));

    let report = analytics_service::create_report(&state, &admin, new_report(customer.user_id))
        .await?
        .data
        .expect("report");
    assert_eq!(report.status, "pending");
    assert!(report.results_url.is_none());

    let done = analytics_service::update_report(
        &state,
        &admin,
        report.id,
        move_to("Completed", Some("https://dashboards.test/q2")),
    )
    .await?
    .data
    .expect("report");
    assert_eq!(done.status, "completed");
    assert_eq!(done.results_url.as_deref(), Some("https://dashboards.test/q2"));

    let sent = common::drain(&mut outbox);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ann@x.com");
    assert_eq!(sent[0].subject, "Update on your analytics report");
    assert_eq!(Notifications::find().count(&state.orm).await?, 1);

    let err = analytics_service::update_report(&state, &admin, report.id, move_to("processing", None))
        .await
        .expect_err("completed is final");
    assert!(matches!(err, AppError::BadRequest(_)));

    let profile = user_service::profile(&state, &customer).await?.data.expect("profile");
    assert_eq!(profile.analytics_reports.len(), 1);
    assert_eq!(profile.analytics_reports[0].title, "Sales Forecast Q2");
    Ok(())
}

#[tokio::test]
async fn admin_listing_filters_reports_by_status() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let customer = common::create_user(&state, "ann@x.com", Role::Customer).await?;
    let admin = common::create_user(&state, "root@x.com", Role::Admin).await?;

    let first = analytics_service::create_report(&state, &admin, new_report(customer.user_id))
        .await?
        .data
        .expect("report");
    analytics_service::create_report(&state, &admin, new_report(customer.user_id)).await?;
    analytics_service::update_report(&state, &admin, first.id, move_to("failed", None)).await?;

    let query = StatusListQuery {
        status: Some("Failed".into()),
        ..Default::default()
    };
    let failed = analytics_service::list_all_reports(&state, &admin, query)
        .await?
        .data
        .expect("list")
        .items;
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, first.id);

    let err = analytics_service::list_all_reports(&state, &customer, StatusListQuery::default())
        .await
        .expect_err("customer");
    assert!(matches!(err, AppError::Forbidden));
    Ok(())
}

#[tokio::test]
async fn customers_read_their_reports_over_http() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let customer = common::create_user(&state, "ann@x.com", Role::Customer).await?;
    let other = common::create_user(&state, "bob@x.com", Role::Customer).await?;
    let admin = common::create_user(&state, "root@x.com", Role::Admin).await?;
    analytics_service::create_report(&state, &admin, new_report(other.user_id)).await?;
    analytics_service::create_report(&state, &admin, new_report(customer.user_id)).await?;

    let token = state
        .tokens
        .issue(customer.user_id, &customer.email, Role::Customer, TokenPurpose::Session)?
        .token;
    let app = build_app(state);

    let request = Request::builder()
        .method("GET")
        .uri("/api/customer/analytics")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    let items = body["data"]["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["user_id"], json!(customer.user_id.to_string()));
    assert_eq!(items[0]["status"], json!("pending"));
    Ok(())
}
