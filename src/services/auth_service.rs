use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    dto::auth::{LoginRequest, SignupRequest, TokenPurpose, TokenResponse},
    entity::{
        Users,
        users::{ActiveModel as UserActive, Column as UserCol},
    },
    error::{AppError, AppResult},
    mail::OutboundEmail,
    models::{NotificationChannel, Role, User},
    response::ApiResponse,
    services::{
        normalize_email, optional_text, require_text, user_service::profile_completion,
    },
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const UNVERIFIED: &str = "Please verify your email first";
const INVALID_VERIFICATION: &str = "Invalid or expired verification token";

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Creates an unverified customer and queues the verification email.
pub async fn signup(state: &AppState, payload: SignupRequest) -> AppResult<ApiResponse<User>> {
    let name = require_text("name", &payload.name)?;
    let email = normalize_email(&payload.email)?;
    if payload.password.is_empty() {
        return Err(AppError::BadRequest("password is required".into()));
    }
    let company = optional_text(payload.company);

    let exists = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest("Email already exists".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let id = Uuid::new_v4();
    let verification =
        state
            .tokens
            .issue(id, &email, Role::Customer, TokenPurpose::Verification)?;

    let channels = vec![NotificationChannel::Email.as_str().to_string()];
    let now = Utc::now();
    let user = UserActive {
        id: Set(id),
        name: Set(name.clone()),
        email: Set(email.clone()),
        password_hash: Set(password_hash),
        role: Set(Role::Customer.as_str().to_string()),
        is_verified: Set(false),
        verification_token: Set(Some(verification.token.clone())),
        profile_completion: Set(profile_completion(company.as_deref(), &channels, false)),
        company: Set(company),
        notification_channels: Set(serde_json::json!(channels)),
        dashboard_url: Set(Some(state.settings.default_dashboard_url.clone())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await
    .map_err(|err| AppError::conflict_as_bad_request(err, "Email already exists"))?;

    let link = format!(
        "{}/api/users/verify/{}",
        state.settings.public_base_url, verification.token
    );
    state.mail.enqueue(OutboundEmail {
        to: email,
        subject: "Verify your email".into(),
        body: format!(
            "Hello {name},\n\nPlease confirm your email address by opening the link below. \
             The link expires at {}.\n\n{link}\n",
            verification.expires_at.format("%Y-%m-%d %H:%M UTC")
        ),
    });

    tracing::info!(user_id = %user.id, "user signed up");
    Ok(ApiResponse::item(
        "Signup successful, check your email to verify your account",
        User::from(user),
    ))
}

/// Consumes a verification token and signs the user in.
///
/// The token is cleared in the same conditional update that marks the user
/// verified, so a second submission of the same token never matches.
pub async fn verify_email(state: &AppState, token: &str) -> AppResult<ApiResponse<TokenResponse>> {
    let invalid = || AppError::BadRequest(INVALID_VERIFICATION.into());

    let claims = state
        .tokens
        .verify(token, TokenPurpose::Verification)
        .map_err(|_| invalid())?;
    let user_id = claims.user_id().map_err(|_| invalid())?;

    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(invalid)?;

    let channels = crate::models::string_list(&user.notification_channels);
    let completion = profile_completion(user.company.as_deref(), &channels, true);

    let result = Users::update_many()
        .col_expr(UserCol::IsVerified, Expr::value(true))
        .col_expr(UserCol::VerificationToken, Expr::value(Option::<String>::None))
        .col_expr(UserCol::ProfileCompletion, Expr::value(completion))
        .col_expr(
            UserCol::UpdatedAt,
            Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
        )
        .filter(UserCol::Id.eq(user.id))
        .filter(UserCol::VerificationToken.eq(token))
        .exec(&state.orm)
        .await?;
    if result.rows_affected != 1 {
        return Err(invalid());
    }

    let role = Role::parse(&user.role).unwrap_or(Role::Customer);
    let session = state
        .tokens
        .issue(user.id, &user.email, role, TokenPurpose::Session)?;

    tracing::info!(user_id = %user.id, "email verified");
    Ok(ApiResponse::item(
        "Email verified",
        TokenResponse {
            token: session.token,
            expires_at: session.expires_at,
        },
    ))
}

/// Unverified accounts are refused before the password is even checked.
pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<TokenResponse>> {
    let LoginRequest { email, password } = payload;
    let email = normalize_email(&email)
        .map_err(|_| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    if !user.is_verified {
        return Err(AppError::Unauthorized(UNVERIFIED.into()));
    }

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let role = Role::parse(&user.role).unwrap_or(Role::Customer);
    let session = state
        .tokens
        .issue(user.id, &user.email, role, TokenPurpose::Session)?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(ApiResponse::item(
        "Logged in",
        TokenResponse {
            token: session.token,
            expires_at: session.expires_at,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = hash_password("pw123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("pw123", &hash).unwrap());
        assert!(!verify_password("pw124", &hash).unwrap());
    }
}
