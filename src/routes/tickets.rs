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
        tickets::{CreateTicketRequest, TicketList},
    },
    error::AppResult,
    middleware::{auth::AuthUser, extract::{ApiPath, ApiQuery}, json::ApiJson},
    models::SupportTicket,
    response::ApiResponse,
    routes::params::StatusListQuery,
    services::ticket_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_tickets).post(create_ticket))
        .route("/mine", get(list_my_tickets))
        .route("/{id}", patch(update_ticket_status))
}

#[utoipa::path(
    post,
    path = "/api/support-tickets",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket opened", body = ApiResponse<SupportTicket>),
        (status = 400, description = "Missing subject"),
        (status = 401, description = "Unauthenticated"),
    ),
    security(("bearer_auth" = [])),
    tag = "Support Tickets"
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateTicketRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SupportTicket>>)> {
    let resp = ticket_service::create_ticket(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/support-tickets/mine",
    responses(
        (status = 200, description = "Tickets owned by the caller", body = ApiResponse<TicketList>),
        (status = 401, description = "Unauthenticated"),
    ),
    security(("bearer_auth" = [])),
    tag = "Support Tickets"
)]
pub async fn list_my_tickets(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<TicketList>>> {
    let resp = ticket_service::list_my_tickets(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/support-tickets",
    params(StatusListQuery),
    responses(
        (status = 200, description = "All tickets (admin only)", body = ApiResponse<TicketList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Support Tickets"
)]
pub async fn list_all_tickets(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<StatusListQuery>,
) -> AppResult<Json<ApiResponse<TicketList>>> {
    let resp = ticket_service::list_all_tickets(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/support-tickets/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated, owner notified", body = ApiResponse<SupportTicket>),
        (status = 400, description = "Unknown status or ticket already closed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Support Tickets"
)]
pub async fn update_ticket_status(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<SupportTicket>>> {
    let resp = ticket_service::update_ticket_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
