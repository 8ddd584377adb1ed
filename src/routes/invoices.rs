use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::invoices::{CreateInvoiceRequest, InvoiceList},
    error::AppResult,
    middleware::{auth::AuthUser, extract::ApiQuery, json::ApiJson},
    models::Invoice,
    response::ApiResponse,
    routes::params::Pagination,
    services::invoice_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_invoices).post(create_invoice))
        .route("/mine", get(list_my_invoices))
}

#[utoipa::path(
    post,
    path = "/api/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice issued (admin only)", body = ApiResponse<Invoice>),
        (status = 400, description = "Invalid amount or unknown user"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateInvoiceRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Invoice>>)> {
    let resp = invoice_service::create_invoice(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/invoices/mine",
    responses(
        (status = 200, description = "Invoices owned by the caller", body = ApiResponse<InvoiceList>),
        (status = 401, description = "Unauthenticated"),
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn list_my_invoices(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<InvoiceList>>> {
    let resp = invoice_service::list_my_invoices(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    params(Pagination),
    responses(
        (status = 200, description = "All invoices (admin only)", body = ApiResponse<InvoiceList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn list_all_invoices(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> AppResult<Json<ApiResponse<InvoiceList>>> {
    let resp = invoice_service::list_all_invoices(&state, &user, pagination).await?;
    Ok(Json(resp))
}
