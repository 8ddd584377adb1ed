use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::reviews::{CreateReviewRequest, ReviewApprovalRequest, ReviewList},
    error::AppResult,
    middleware::{auth::AuthUser, extract::{ApiPath, ApiQuery}, json::ApiJson},
    models::Review,
    response::ApiResponse,
    routes::params::Pagination,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews).post(submit_review))
        .route("/all", get(list_all_reviews))
        .route("/{id}/approval", patch(set_approval))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored, pending approval", body = ApiResponse<Review>),
        (status = 400, description = "Invalid review"),
    ),
    tag = "Reviews"
)]
pub async fn submit_review(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let resp = review_service::submit_review(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    responses(
        (status = 200, description = "Approved reviews", body = ApiResponse<ReviewList>),
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::list_approved(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reviews/all",
    params(Pagination),
    responses(
        (status = 200, description = "Every review (admin only)", body = ApiResponse<ReviewList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn list_all_reviews(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::list_all(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/reviews/{id}/approval",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = ReviewApprovalRequest,
    responses(
        (status = 200, description = "Approval flag set", body = ApiResponse<Review>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn set_approval(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ReviewApprovalRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::set_approval(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
