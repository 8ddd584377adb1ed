use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::{
    dto::users::{DashboardResponse, Preferences, ProfileResponse, UpdatePreferencesRequest, UserList},
    entity::{
        AnalyticsReports, Bookings, Invoices, Notifications, Projects, SupportTickets, Users,
        analytics_reports, bookings, invoices, notifications, projects, support_tickets,
        users::{ActiveModel as UserActive, Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{NotificationChannel, User, string_list},
    response::ApiResponse,
    routes::params::Pagination,
    services::{fetch_page, optional_text, require_text},
    state::AppState,
};

/// Share of the profile that is filled in, in steps of 20%.
///
/// Name and email are always present; company, at least one notification
/// channel and a verified email each add a step.
pub fn profile_completion(company: Option<&str>, channels: &[String], verified: bool) -> i32 {
    let filled = 2 + [company.is_some(), !channels.is_empty(), verified]
        .iter()
        .filter(|done| **done)
        .count();
    (filled * 20) as i32
}

async fn load_user(state: &AppState, user: &AuthUser) -> AppResult<UserModel> {
    Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

/// The caller's account together with everything it owns.
pub async fn profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ProfileResponse>> {
    let account = load_user(state, user).await?;
    let owner = account.id;

    let (projects, bookings, support_tickets, invoices, notifications, analytics_reports) = tokio::try_join!(
        Projects::find()
            .filter(projects::Column::UserId.eq(owner))
            .order_by_desc(projects::Column::CreatedAt)
            .all(&state.orm),
        Bookings::find()
            .filter(bookings::Column::UserId.eq(owner))
            .order_by_desc(bookings::Column::CreatedAt)
            .all(&state.orm),
        SupportTickets::find()
            .filter(support_tickets::Column::UserId.eq(owner))
            .order_by_desc(support_tickets::Column::CreatedAt)
            .all(&state.orm),
        Invoices::find()
            .filter(invoices::Column::UserId.eq(owner))
            .order_by_desc(invoices::Column::IssuedOn)
            .all(&state.orm),
        Notifications::find()
            .filter(notifications::Column::UserId.eq(owner))
            .order_by_desc(notifications::Column::CreatedAt)
            .all(&state.orm),
        AnalyticsReports::find()
            .filter(analytics_reports::Column::UserId.eq(owner))
            .order_by_desc(analytics_reports::Column::CreatedAt)
            .all(&state.orm),
    )?;

    let channels = string_list(&account.notification_channels);
    let data = ProfileResponse {
        id: account.id,
        name: account.name.clone(),
        email: account.email.clone(),
        role: account.role,
        profile_completion: account.profile_completion,
        projects: projects.into_iter().map(Into::into).collect(),
        bookings: bookings.into_iter().map(Into::into).collect(),
        support_tickets: support_tickets.into_iter().map(Into::into).collect(),
        invoices: invoices.into_iter().map(Into::into).collect(),
        notifications: notifications.into_iter().map(Into::into).collect(),
        analytics_reports: analytics_reports.into_iter().map(Into::into).collect(),
        preferences: Preferences {
            name: account.name,
            email: account.email,
            company: account.company,
            notification_channels: channels,
        },
    };

    Ok(ApiResponse::item("Profile", data))
}

pub async fn update_preferences(
    state: &AppState,
    user: &AuthUser,
    payload: UpdatePreferencesRequest,
) -> AppResult<ApiResponse<User>> {
    let account = load_user(state, user).await?;

    let name = payload
        .name
        .as_deref()
        .map(|n| require_text("name", n))
        .transpose()?;
    let channels = match payload.notification_channels {
        Some(raw) => {
            let mut parsed: Vec<NotificationChannel> = Vec::with_capacity(raw.len());
            for value in &raw {
                let channel = NotificationChannel::parse(value)?;
                if !parsed.contains(&channel) {
                    parsed.push(channel);
                }
            }
            Some(parsed.iter().map(|c| c.as_str().to_string()).collect::<Vec<_>>())
        }
        None => None,
    };

    let company = match payload.company {
        Some(value) => optional_text(Some(value)),
        None => account.company.clone(),
    };
    let effective_channels = channels
        .clone()
        .unwrap_or_else(|| string_list(&account.notification_channels));
    let completion =
        profile_completion(company.as_deref(), &effective_channels, account.is_verified);

    let mut active: UserActive = account.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(channels) = channels {
        active.notification_channels = Set(serde_json::json!(channels));
    }
    active.company = Set(company);
    active.profile_completion = Set(completion);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::item("Preferences updated", User::from(updated)))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let finder = Users::find().order_by_desc(UserCol::CreatedAt);
    let (rows, meta) = fetch_page(finder, &state.orm, &pagination).await?;
    let items = rows.into_iter().map(User::from).collect();
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardResponse>> {
    let account = load_user(state, user).await?;
    let dashboard_url = account
        .dashboard_url
        .unwrap_or_else(|| state.settings.default_dashboard_url.clone());
    Ok(ApiResponse::item("Dashboard", DashboardResponse { dashboard_url }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_counts_filled_sections() {
        let email = vec!["Email".to_string()];
        assert_eq!(profile_completion(None, &[], false), 40);
        assert_eq!(profile_completion(None, &email, false), 60);
        assert_eq!(profile_completion(Some("Acme"), &email, true), 100);
    }
}
