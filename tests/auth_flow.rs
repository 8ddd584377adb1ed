mod common;

use analytics_portal_api::{
    dto::{
        auth::{LoginRequest, SignupRequest, TokenPurpose},
        users::UpdatePreferencesRequest,
    },
    entity::{Users, users::Column as UserCol},
    error::AppError,
    models::Role,
    routes::params::Pagination,
    services::{auth_service, user_service},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

fn signup_request(email: &str) -> SignupRequest {
    SignupRequest {
        name: "Ann".into(),
        email: email.into(),
        password: common::PASSWORD.into(),
        company: None,
    }
}

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.into(),
        password: password.into(),
    }
}

async fn stored_verification_token(
    state: &analytics_portal_api::state::AppState,
    email: &str,
) -> anyhow::Result<String> {
    let user = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?
        .expect("user stored");
    Ok(user.verification_token.expect("token stored"))
}

#[tokio::test]
async fn signup_stores_unverified_customer_and_queues_link() -> anyhow::Result<()> {
    let (state, mut outbox) = common::setup_state().await?;

    let resp = auth_service::signup(&state, signup_request("Ann@X.com")).await?;
    let user = resp.data.expect("user");
    assert_eq!(user.email, "ann@x.com");
    assert_eq!(user.role, Role::Customer.as_str());
    assert!(!user.is_verified);

    let token = stored_verification_token(&state, "ann@x.com").await?;
    let sent = common::drain(&mut outbox);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ann@x.com");
    assert!(
        sent[0]
            .body
            .contains(&format!("http://portal.test/api/users/verify/{token}"))
    );
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    auth_service::signup(&state, signup_request("ann@x.com")).await?;

    let err = auth_service::signup(&state, signup_request("ANN@x.com "))
        .await
        .expect_err("duplicate must fail");
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Email already exists"));

    let count = Users::find().count(&state.orm).await?;
    assert_eq!(count, 1);
    Ok(())
}

#[tokio::test]
async fn login_requires_verification_and_token_is_single_use() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    auth_service::signup(&state, signup_request("ann@x.com")).await?;

    let err = auth_service::login(&state, login_request("ann@x.com", common::PASSWORD))
        .await
        .expect_err("unverified login");
    assert!(matches!(err, AppError::Unauthorized(ref msg) if msg == "Please verify your email first"));

    let token = stored_verification_token(&state, "ann@x.com").await?;
    let verified = auth_service::verify_email(&state, &token).await?;
    let session = verified.data.expect("session token");
    let claims = state.tokens.verify(&session.token, TokenPurpose::Session)?;
    assert_eq!(claims.email, "ann@x.com");

    let again = auth_service::verify_email(&state, &token)
        .await
        .expect_err("token already used");
    assert!(matches!(again, AppError::BadRequest(_)));

    let user = Users::find()
        .filter(UserCol::Email.eq("ann@x.com"))
        .one(&state.orm)
        .await?
        .expect("user");
    assert!(user.is_verified);
    assert!(user.verification_token.is_none());

    let wrong = auth_service::login(&state, login_request("ann@x.com", "nope"))
        .await
        .expect_err("wrong password");
    assert!(matches!(wrong, AppError::Unauthorized(ref msg) if msg == "Invalid email or password"));

    let ok = auth_service::login(&state, login_request("ann@x.com", common::PASSWORD)).await?;
    assert!(ok.data.is_some());
    Ok(())
}

#[tokio::test]
async fn session_token_cannot_verify_email() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let user = common::create_user(&state, "bob@x.com", Role::Customer).await?;
    let session = state
        .tokens
        .issue(user.user_id, &user.email, Role::Customer, TokenPurpose::Session)?;

    let err = auth_service::verify_email(&state, &session.token)
        .await
        .expect_err("wrong purpose");
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn preferences_update_recomputes_completion() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let user = common::create_user(&state, "cleo@x.com", Role::Customer).await?;

    let resp = user_service::update_preferences(
        &state,
        &user,
        UpdatePreferencesRequest {
            name: None,
            company: Some("Acme".into()),
            notification_channels: Some(vec!["SMS".into(), "Email".into(), "SMS".into()]),
        },
    )
    .await?;
    let updated = resp.data.expect("user");
    assert_eq!(updated.company.as_deref(), Some("Acme"));
    assert_eq!(updated.notification_channels, vec!["SMS", "Email"]);
    assert_eq!(updated.profile_completion, 100);

    let bad = user_service::update_preferences(
        &state,
        &user,
        UpdatePreferencesRequest {
            notification_channels: Some(vec!["Pigeon".into()]),
            ..Default::default()
        },
    )
    .await
    .expect_err("unknown channel");
    assert!(matches!(bad, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn only_admins_list_users() -> anyhow::Result<()> {
    let (state, _outbox) = common::setup_state().await?;
    let customer = common::create_user(&state, "dan@x.com", Role::Customer).await?;
    let admin = common::create_user(&state, "root@x.com", Role::Admin).await?;

    let err = user_service::list_users(&state, &customer, Pagination::default())
        .await
        .expect_err("customer");
    assert!(matches!(err, AppError::Forbidden));

    let resp = user_service::list_users(&state, &admin, Pagination::default()).await?;
    assert_eq!(resp.data.expect("users").items.len(), 2);
    assert_eq!(resp.meta.and_then(|m| m.total), Some(2));
    Ok(())
}
