use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    dto::analytics::{
        AnalyticsReportList, CreateAnalyticsReportRequest, UpdateAnalyticsReportRequest,
    },
    entity::{
        AnalyticsReports, Users,
        analytics_reports::{ActiveModel as ReportActive, Column as ReportCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{AnalyticsReport, AnalyticsStatus},
    response::{ApiResponse, Meta},
    routes::params::StatusListQuery,
    services::{
        fetch_page,
        notification_service::{StatusChange, on_status_change},
        optional_text, require_text,
    },
    state::AppState,
};

/// Queues a report for a customer. Reports start out `pending`.
pub async fn create_report(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAnalyticsReportRequest,
) -> AppResult<ApiResponse<AnalyticsReport>> {
    ensure_admin(user)?;
    let title = require_text("title", &payload.title)?;

    let owner = Users::find_by_id(payload.user_id).one(&state.orm).await?;
    if owner.is_none() {
        return Err(AppError::BadRequest("user_id does not match any user".into()));
    }

    let now = Utc::now();
    let report = ReportActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(payload.user_id),
        title: Set(title),
        status: Set(AnalyticsStatus::Pending.as_str().to_string()),
        results_url: Set(optional_text(payload.results_url)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(report_id = %report.id, user_id = %report.user_id, "analytics report queued");
    Ok(ApiResponse::item("Analytics report created", AnalyticsReport::from(report)))
}

pub async fn list_my_reports(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AnalyticsReportList>> {
    let items: Vec<AnalyticsReport> = AnalyticsReports::find()
        .filter(ReportCol::UserId.eq(user.user_id))
        .order_by_desc(ReportCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(AnalyticsReport::from)
        .collect();
    let meta = Meta::unpaged(items.len());
    Ok(ApiResponse::success("Analytics reports", AnalyticsReportList { items }, Some(meta)))
}

pub async fn list_all_reports(
    state: &AppState,
    user: &AuthUser,
    query: StatusListQuery,
) -> AppResult<ApiResponse<AnalyticsReportList>> {
    ensure_admin(user)?;

    let mut finder = AnalyticsReports::find();
    if let Some(status) = query.status() {
        let status = AnalyticsStatus::parse(status)?;
        finder = finder.filter(ReportCol::Status.eq(status.as_str()));
    }
    let finder = finder.order_by_desc(ReportCol::CreatedAt);

    let (rows, meta) = fetch_page(finder, &state.orm, &query.pagination()).await?;
    let items = rows.into_iter().map(AnalyticsReport::from).collect();
    Ok(ApiResponse::success("Analytics reports", AnalyticsReportList { items }, Some(meta)))
}

/// Completed and failed reports are final.
pub async fn update_report(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateAnalyticsReportRequest,
) -> AppResult<ApiResponse<AnalyticsReport>> {
    ensure_admin(user)?;
    let next = AnalyticsStatus::parse(&payload.status)?;
    let results_url = optional_text(payload.results_url);

    let txn = state.orm.begin().await?;
    let existing = AnalyticsReports::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let current = AnalyticsStatus::parse(&existing.status)?;
    if current.is_terminal() {
        return Err(AppError::BadRequest(format!("Analytics report is already {current}")));
    }

    let owner = Users::find_by_id(existing.user_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ReportActive = existing.into();
    active.status = Set(next.as_str().to_string());
    if results_url.is_some() {
        active.results_url = Set(results_url);
    }
    active.updated_at = Set(Utc::now().into());
    let report = active.update(&txn).await?;

    let change = StatusChange {
        owner_id: report.user_id,
        email: owner.email,
        kind: "analytics report",
        summary: report.title.clone(),
        status: report.status.clone(),
    };
    on_status_change(txn, &state.mail, change).await?;

    Ok(ApiResponse::item("Analytics report updated", AnalyticsReport::from(report)))
}
