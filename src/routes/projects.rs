use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::{
        UpdateStatusRequest,
        projects::{CreateProjectRequest, ProjectList},
    },
    error::AppResult,
    middleware::{auth::AuthUser, extract::{ApiPath, ApiQuery}, json::ApiJson},
    models::Project,
    response::ApiResponse,
    routes::params::StatusListQuery,
    services::project_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_projects).post(create_project))
        .route("/mine", get(list_my_projects))
        .route("/{id}", patch(update_project_status))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created for a customer (admin only)", body = ApiResponse<Project>),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Projects"
)]
pub async fn create_project(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Project>>)> {
    let resp = project_service::create_project(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/projects/mine",
    responses(
        (status = 200, description = "Projects owned by the caller", body = ApiResponse<ProjectList>),
        (status = 401, description = "Unauthenticated"),
    ),
    security(("bearer_auth" = [])),
    tag = "Projects"
)]
pub async fn list_my_projects(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProjectList>>> {
    let resp = project_service::list_my_projects(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/projects",
    params(StatusListQuery),
    responses(
        (status = 200, description = "All projects (admin only)", body = ApiResponse<ProjectList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Projects"
)]
pub async fn list_all_projects(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<StatusListQuery>,
) -> AppResult<Json<ApiResponse<ProjectList>>> {
    let resp = project_service::list_all_projects(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated, owner notified", body = ApiResponse<Project>),
        (status = 400, description = "Unknown status or project already completed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Projects"
)]
pub async fn update_project_status(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Project>>> {
    let resp = project_service::update_project_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
