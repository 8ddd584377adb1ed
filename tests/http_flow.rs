mod common;

use analytics_portal_api::{
    app::build_app,
    dto::auth::TokenPurpose,
    entity::{Users, users::Column as UserCol},
    models::Role,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

async fn send(app: &Router, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn post_json(uri: &str, body: Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

fn get(uri: &str, token: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    Ok(builder.body(Body::empty())?)
}

#[tokio::test]
async fn signup_verify_login_and_profile() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let app = build_app(state.clone());

    let credentials = json!({ "email": "ann@x.com", "password": common::PASSWORD });
    let (status, body) = send(
        &app,
        post_json(
            "/api/users/signup",
            json!({ "name": "Ann", "email": "ann@x.com", "password": common::PASSWORD }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["is_verified"], json!(false));
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = send(&app, post_json("/api/users/login", credentials.clone())?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Please verify your email first"));

    let token = Users::find()
        .filter(UserCol::Email.eq("ann@x.com"))
        .one(&state.orm)
        .await?
        .and_then(|user| user.verification_token)
        .expect("verification token");

    let (status, _) = send(&app, get(&format!("/api/users/verify/{token}"), None)?).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, get(&format!("/api/users/verify/{token}"), None)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["error"], json!("Invalid or expired verification token"));

    let (status, body) = send(&app, post_json("/api/users/login", credentials)?).await?;
    assert_eq!(status, StatusCode::OK);
    let session = body["data"]["token"].as_str().expect("token").to_string();

    let (status, body) = send(&app, get("/api/users/profile", Some(&session))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Ann"));
    assert_eq!(body["data"]["bookings"], json!([]));
    assert_eq!(body["data"]["preferences"]["notification_channels"], json!(["Email"]));

    let (status, body) = send(&app, get("/api/customer/dashboard", Some(&session))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dashboard_url"], json!("https://dashboards.test/overview"));
    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_missing_and_forged_tokens() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let app = build_app(state);

    let (status, body) = send(&app, get("/api/bookings/mine", None)?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["data"]["error"].is_string());

    let (status, _) = send(&app, get("/api/bookings/mine", Some("not.a.jwt"))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_routes_forbid_customers() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let customer = common::create_user(&state, "ann@x.com", Role::Customer).await?;
    let admin = common::create_user(&state, "root@x.com", Role::Admin).await?;
    let customer_token = state
        .tokens
        .issue(customer.user_id, &customer.email, Role::Customer, TokenPurpose::Session)?
        .token;
    let admin_token = state
        .tokens
        .issue(admin.user_id, &admin.email, Role::Admin, TokenPurpose::Session)?
        .token;
    let app = build_app(state);

    let (status, body) = send(&app, get("/api/bookings", Some(&customer_token))?).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], json!("Forbidden"));

    let uri = "/api/bookings?page=1&per_page=5&status=pending";
    let (status, body) = send(&app, get(uri, Some(&admin_token))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["per_page"], json!(5));
    Ok(())
}

#[tokio::test]
async fn malformed_bodies_and_unknown_routes() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let app = build_app(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/users/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\":"))?;
    let (status, body) = send(&app, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"]["error"].is_string());

    let (status, _) = send(&app, post_json("/api/reviews", json!({ "name": "Eve", "text": "ok" }))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/nowhere", None)?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Not Found"));
    Ok(())
}

fn patch_json(uri: &str, token: &str, body: Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("PATCH")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))?)
}

async fn admin_token(state: &analytics_portal_api::state::AppState) -> anyhow::Result<String> {
    let admin = common::create_user(state, "root@x.com", Role::Admin).await?;
    Ok(state
        .tokens
        .issue(admin.user_id, &admin.email, Role::Admin, TokenPurpose::Session)?
        .token)
}

#[tokio::test]
async fn far_page_returns_empty_list() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let token = admin_token(&state).await?;
    let app = build_app(state);

    let uri = format!("/api/users?page={}&per_page=100", u64::MAX);
    let (status, body) = send(&app, get(&uri, Some(&token))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(body["meta"]["total"], json!(1));
    Ok(())
}

#[tokio::test]
async fn bad_path_and_query_values_use_the_error_envelope() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let token = admin_token(&state).await?;
    let app = build_app(state);

    let request = patch_json("/api/bookings/not-a-uuid", &token, json!({ "status": "confirmed" }))?;
    let (status, body) = send(&app, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["error"], json!("Invalid path parameter"));

    let (status, body) = send(&app, get("/api/users?page=abc", Some(&token))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["error"], json!("Invalid query parameters"));
    Ok(())
}

#[tokio::test]
async fn session_for_missing_user_is_unauthenticated() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let token = state
        .tokens
        .issue(Uuid::new_v4(), "ghost@x.com", Role::Admin, TokenPurpose::Session)?
        .token;
    let app = build_app(state);

    let (status, body) = send(&app, get("/api/users", Some(&token))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["data"]["error"], json!("Invalid or expired token"));
    assert_eq!(body["message"], body["data"]["error"]);
    Ok(())
}
