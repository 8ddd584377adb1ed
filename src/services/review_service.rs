use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::reviews::{CreateReviewRequest, ReviewApprovalRequest, ReviewList},
    entity::{
        Reviews,
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Review,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{fetch_page, require_text},
    state::AppState,
};

/// Public submission. New reviews always wait for approval.
pub async fn submit_review(state: &AppState, payload: CreateReviewRequest) -> AppResult<ApiResponse<Review>> {
    let name = require_text("name", &payload.name)?;
    let text = require_text("text", &payload.text)?;
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        text: Set(text),
        rating: Set(payload.rating),
        approved: Set(false),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(review_id = %review.id, rating = review.rating, "review submitted");
    Ok(ApiResponse::item("Review submitted for approval", Review::from(review)))
}

pub async fn list_approved(state: &AppState) -> AppResult<ApiResponse<ReviewList>> {
    let items: Vec<Review> = Reviews::find()
        .filter(ReviewCol::Approved.eq(true))
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();
    let meta = Meta::unpaged(items.len());
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

pub async fn list_all(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    ensure_admin(user)?;
    let finder = Reviews::find().order_by_desc(ReviewCol::CreatedAt);
    let (rows, meta) = fetch_page(finder, &state.orm, &pagination).await?;
    let items = rows.into_iter().map(Review::from).collect();
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

pub async fn set_approval(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ReviewApprovalRequest,
) -> AppResult<ApiResponse<Review>> {
    ensure_admin(user)?;
    let existing = Reviews::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ReviewActive = existing.into();
    active.approved = Set(payload.approved);
    let review = active.update(&state.orm).await?;

    tracing::info!(review_id = %review.id, approved = review.approved, "review moderated");
    Ok(ApiResponse::item("Review updated", Review::from(review)))
}
