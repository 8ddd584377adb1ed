use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    dto::{
        UpdateStatusRequest,
        bookings::{BookingList, CreateBookingRequest},
    },
    entity::{
        Bookings,
        bookings::{ActiveModel as BookingActive, Column as BookingCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Booking, BookingService, BookingStatus},
    response::{ApiResponse, Meta},
    routes::params::StatusListQuery,
    services::{
        fetch_page, normalize_email,
        notification_service::{StatusChange, on_status_change},
        optional_text,
    },
    state::AppState,
};

pub async fn create_booking(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    let service = BookingService::parse(&payload.service)?;
    let email = match optional_text(payload.email) {
        Some(email) => normalize_email(&email)?,
        None => user.email.clone(),
    };

    let now = Utc::now();
    let booking = BookingActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        service: Set(service.as_str().to_string()),
        date: Set(payload.date),
        time: Set(payload.time),
        email: Set(email),
        notes: Set(optional_text(payload.notes)),
        status: Set(BookingStatus::Pending.as_str().to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(booking_id = %booking.id, user_id = %user.user_id, service = %service, "booking created");
    Ok(ApiResponse::item("Booking created", Booking::from(booking)))
}

pub async fn list_my_bookings(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<BookingList>> {
    let items: Vec<Booking> = Bookings::find()
        .filter(BookingCol::UserId.eq(user.user_id))
        .order_by_desc(BookingCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Booking::from)
        .collect();
    let meta = Meta::unpaged(items.len());
    Ok(ApiResponse::success("Bookings", BookingList { items }, Some(meta)))
}

pub async fn list_all_bookings(
    state: &AppState,
    user: &AuthUser,
    query: StatusListQuery,
) -> AppResult<ApiResponse<BookingList>> {
    ensure_admin(user)?;

    let mut finder = Bookings::find();
    if let Some(status) = query.status() {
        let status = BookingStatus::parse(status)?;
        finder = finder.filter(BookingCol::Status.eq(status.as_str()));
    }
    let finder = finder.order_by_desc(BookingCol::CreatedAt);

    let (rows, meta) = fetch_page(finder, &state.orm, &query.pagination()).await?;
    let items = rows.into_iter().map(Booking::from).collect();
    Ok(ApiResponse::success("Bookings", BookingList { items }, Some(meta)))
}

/// Moves a booking to a new status and notifies its owner.
///
/// Completed and cancelled bookings are final.
pub async fn update_booking_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStatusRequest,
) -> AppResult<ApiResponse<Booking>> {
    ensure_admin(user)?;
    let next = BookingStatus::parse(&payload.status)?;

    let txn = state.orm.begin().await?;
    let existing = Bookings::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let current = BookingStatus::parse(&existing.status)?;
    if current.is_terminal() {
        return Err(AppError::BadRequest(format!("Booking is already {current}")));
    }

    let mut active: BookingActive = existing.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let booking = active.update(&txn).await?;

    let service = BookingService::parse(&booking.service)
        .map(|s| s.label().to_string())
        .unwrap_or_else(|_| booking.service.clone());
    let change = StatusChange {
        owner_id: booking.user_id,
        email: booking.email.clone(),
        kind: "booking",
        summary: format!(
            "{service} on {} at {}",
            booking.date.format("%Y-%m-%d"),
            booking.time.format("%H:%M")
        ),
        status: booking.status.clone(),
    };
    on_status_change(txn, &state.mail, change).await?;

    Ok(ApiResponse::item("Booking updated", Booking::from(booking)))
}
