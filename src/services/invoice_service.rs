use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::invoices::{CreateInvoiceRequest, InvoiceList},
    entity::{
        Invoices, Users,
        invoices::{ActiveModel as InvoiceActive, Column as InvoiceCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Invoice,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{fetch_page, optional_text},
    state::AppState,
};

/// Issues an invoice to a customer. Invoices have no update path once issued.
pub async fn create_invoice(
    state: &AppState,
    user: &AuthUser,
    payload: CreateInvoiceRequest,
) -> AppResult<ApiResponse<Invoice>> {
    ensure_admin(user)?;
    if payload.amount <= 0 {
        return Err(AppError::BadRequest("amount must be positive".into()));
    }

    let owner = Users::find_by_id(payload.user_id).one(&state.orm).await?;
    if owner.is_none() {
        return Err(AppError::BadRequest("user_id does not match any user".into()));
    }

    let now = Utc::now();
    let invoice = InvoiceActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(payload.user_id),
        amount: Set(payload.amount),
        issued_on: Set(payload.issued_on.unwrap_or_else(|| now.date_naive())),
        url: Set(optional_text(payload.url)),
        created_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(invoice_id = %invoice.id, user_id = %invoice.user_id, amount = invoice.amount, "invoice issued");
    Ok(ApiResponse::item("Invoice created", Invoice::from(invoice)))
}

pub async fn list_my_invoices(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<InvoiceList>> {
    let items: Vec<Invoice> = Invoices::find()
        .filter(InvoiceCol::UserId.eq(user.user_id))
        .order_by_desc(InvoiceCol::IssuedOn)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Invoice::from)
        .collect();
    let meta = Meta::unpaged(items.len());
    Ok(ApiResponse::success("Invoices", InvoiceList { items }, Some(meta)))
}

pub async fn list_all_invoices(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<InvoiceList>> {
    ensure_admin(user)?;
    let finder = Invoices::find().order_by_desc(InvoiceCol::IssuedOn);
    let (rows, meta) = fetch_page(finder, &state.orm, &pagination).await?;
    let items = rows.into_iter().map(Invoice::from).collect();
    Ok(ApiResponse::success("Invoices", InvoiceList { items }, Some(meta)))
}
