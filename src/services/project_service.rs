use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    dto::{
        UpdateStatusRequest,
        projects::{CreateProjectRequest, ProjectList},
    },
    entity::{
        Projects, Users,
        projects::{ActiveModel as ProjectActive, Column as ProjectCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Project, ProjectStatus},
    response::{ApiResponse, Meta},
    routes::params::StatusListQuery,
    services::{
        fetch_page,
        notification_service::{StatusChange, on_status_change},
        require_text,
    },
    state::AppState,
};

pub async fn create_project(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProjectRequest,
) -> AppResult<ApiResponse<Project>> {
    ensure_admin(user)?;
    let name = require_text("name", &payload.name)?;
    if payload.deadline < payload.start_date {
        return Err(AppError::BadRequest("deadline must not be before start_date".into()));
    }
    let deliverables: Vec<String> = payload
        .deliverables
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
        .collect();

    let owner = Users::find_by_id(payload.user_id).one(&state.orm).await?;
    if owner.is_none() {
        return Err(AppError::BadRequest("user_id does not match any user".into()));
    }

    let now = Utc::now();
    let project = ProjectActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(payload.user_id),
        name: Set(name),
        start_date: Set(payload.start_date),
        deadline: Set(payload.deadline),
        status: Set(ProjectStatus::InProgress.as_str().to_string()),
        deliverables: Set(serde_json::json!(deliverables)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(project_id = %project.id, user_id = %project.user_id, "project created");
    Ok(ApiResponse::item("Project created", Project::from(project)))
}

pub async fn list_my_projects(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ProjectList>> {
    let items: Vec<Project> = Projects::find()
        .filter(ProjectCol::UserId.eq(user.user_id))
        .order_by_desc(ProjectCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Project::from)
        .collect();
    let meta = Meta::unpaged(items.len());
    Ok(ApiResponse::success("Projects", ProjectList { items }, Some(meta)))
}

pub async fn list_all_projects(
    state: &AppState,
    user: &AuthUser,
    query: StatusListQuery,
) -> AppResult<ApiResponse<ProjectList>> {
    ensure_admin(user)?;

    let mut finder = Projects::find();
    if let Some(status) = query.status() {
        let status = ProjectStatus::parse(status)?;
        finder = finder.filter(ProjectCol::Status.eq(status.as_str()));
    }
    let finder = finder.order_by_desc(ProjectCol::CreatedAt);

    let (rows, meta) = fetch_page(finder, &state.orm, &query.pagination()).await?;
    let items = rows.into_iter().map(Project::from).collect();
    Ok(ApiResponse::success("Projects", ProjectList { items }, Some(meta)))
}

pub async fn update_project_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStatusRequest,
) -> AppResult<ApiResponse<Project>> {
    ensure_admin(user)?;
    let next = ProjectStatus::parse(&payload.status)?;

    let txn = state.orm.begin().await?;
    let existing = Projects::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let current = ProjectStatus::parse(&existing.status)?;
    if current.is_terminal() {
        return Err(AppError::BadRequest(format!("Project is already {current}")));
    }

    let owner = Users::find_by_id(existing.user_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ProjectActive = existing.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let project = active.update(&txn).await?;

    let change = StatusChange {
        owner_id: project.user_id,
        email: owner.email,
        kind: "project",
        summary: project.name.clone(),
        status: project.status.clone(),
    };
    on_status_change(txn, &state.mail, change).await?;

    Ok(ApiResponse::item("Project updated", Project::from(project)))
}
