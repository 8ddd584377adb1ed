use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::{analytics::AnalyticsReportList, users::DashboardResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{analytics_service, user_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/analytics", get(analytics))
}

#[utoipa::path(
    get,
    path = "/api/customer/dashboard",
    responses(
        (status = 200, description = "Analytics dashboard link", body = ApiResponse<DashboardResponse>),
        (status = 401, description = "Unauthenticated"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customer"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardResponse>>> {
    let resp = user_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customer/analytics",
    responses(
        (status = 200, description = "Analytics reports prepared for the caller", body = ApiResponse<AnalyticsReportList>),
        (status = 401, description = "Unauthenticated"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customer"
)]
pub async fn analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AnalyticsReportList>>> {
    let resp = analytics_service::list_my_reports(&state, &user).await?;
    Ok(Json(resp))
}
