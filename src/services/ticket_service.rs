use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    dto::{
        UpdateStatusRequest,
        tickets::{CreateTicketRequest, TicketList},
    },
    entity::{
        SupportTickets, Users,
        support_tickets::{ActiveModel as TicketActive, Column as TicketCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{SupportTicket, TicketStatus},
    response::{ApiResponse, Meta},
    routes::params::StatusListQuery,
    services::{
        fetch_page,
        notification_service::{StatusChange, on_status_change},
        optional_text, require_text,
    },
    state::AppState,
};

pub async fn create_ticket(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTicketRequest,
) -> AppResult<ApiResponse<SupportTicket>> {
    let subject = require_text("subject", &payload.subject)?;

    let now = Utc::now();
    let ticket = TicketActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        subject: Set(subject),
        description: Set(optional_text(payload.description)),
        status: Set(TicketStatus::Open.as_str().to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(ticket_id = %ticket.id, user_id = %user.user_id, "support ticket opened");
    Ok(ApiResponse::item("Support ticket created", SupportTicket::from(ticket)))
}

pub async fn list_my_tickets(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<TicketList>> {
    let items: Vec<SupportTicket> = SupportTickets::find()
        .filter(TicketCol::UserId.eq(user.user_id))
        .order_by_desc(TicketCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(SupportTicket::from)
        .collect();
    let meta = Meta::unpaged(items.len());
    Ok(ApiResponse::success("Support tickets", TicketList { items }, Some(meta)))
}

pub async fn list_all_tickets(
    state: &AppState,
    user: &AuthUser,
    query: StatusListQuery,
) -> AppResult<ApiResponse<TicketList>> {
    ensure_admin(user)?;

    let mut finder = SupportTickets::find();
    if let Some(status) = query.status() {
        let status = TicketStatus::parse(status)?;
        finder = finder.filter(TicketCol::Status.eq(status.as_str()));
    }
    let finder = finder.order_by_desc(TicketCol::CreatedAt);

    let (rows, meta) = fetch_page(finder, &state.orm, &query.pagination()).await?;
    let items = rows.into_iter().map(SupportTicket::from).collect();
    Ok(ApiResponse::success("Support tickets", TicketList { items }, Some(meta)))
}

/// Tickets only move forward: a closed ticket stays closed.
pub async fn update_ticket_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStatusRequest,
) -> AppResult<ApiResponse<SupportTicket>> {
    ensure_admin(user)?;
    let next = TicketStatus::parse(&payload.status)?;

    let txn = state.orm.begin().await?;
    let existing = SupportTickets::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let current = TicketStatus::parse(&existing.status)?;
    if current.is_terminal() {
        return Err(AppError::BadRequest(format!("Support ticket is already {current}")));
    }

    let owner = Users::find_by_id(existing.user_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: TicketActive = existing.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let ticket = active.update(&txn).await?;

    let change = StatusChange {
        owner_id: ticket.user_id,
        email: owner.email,
        kind: "support ticket",
        summary: ticket.subject.clone(),
        status: ticket.status.clone(),
    };
    on_status_change(txn, &state.mail, change).await?;

    Ok(ApiResponse::item("Support ticket updated", SupportTicket::from(ticket)))
}
