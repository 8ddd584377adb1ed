use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::analytics::{
        AnalyticsReportList, CreateAnalyticsReportRequest, UpdateAnalyticsReportRequest,
    },
    error::AppResult,
    middleware::{auth::AuthUser, extract::{ApiPath, ApiQuery}, json::ApiJson},
    models::AnalyticsReport,
    response::ApiResponse,
    routes::params::StatusListQuery,
    services::analytics_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_reports).post(create_report))
        .route("/{id}", patch(update_report))
}

#[utoipa::path(
    post,
    path = "/api/analytics-reports",
    request_body = CreateAnalyticsReportRequest,
    responses(
        (status = 201, description = "Report queued for a customer (admin only)", body = ApiResponse<AnalyticsReport>),
        (status = 400, description = "Missing title or unknown user"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn create_report(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateAnalyticsReportRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AnalyticsReport>>)> {
    let resp = analytics_service::create_report(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/analytics-reports",
    params(StatusListQuery),
    responses(
        (status = 200, description = "All reports (admin only)", body = ApiResponse<AnalyticsReportList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn list_all_reports(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<StatusListQuery>,
) -> AppResult<Json<ApiResponse<AnalyticsReportList>>> {
    let resp = analytics_service::list_all_reports(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/analytics-reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = UpdateAnalyticsReportRequest,
    responses(
        (status = 200, description = "Status updated, owner notified", body = ApiResponse<AnalyticsReport>),
        (status = 400, description = "Unknown status or report already final"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn update_report(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateAnalyticsReportRequest>,
) -> AppResult<Json<ApiResponse<AnalyticsReport>>> {
    let resp = analytics_service::update_report(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
