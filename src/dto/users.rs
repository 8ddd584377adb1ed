use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{AnalyticsReport, Booking, Invoice, Notification, Project, SupportTicket, User};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Preferences {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub notification_channels: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub profile_completion: i32,
    pub projects: Vec<Project>,
    pub bookings: Vec<Booking>,
    pub support_tickets: Vec<SupportTicket>,
    pub invoices: Vec<Invoice>,
    pub notifications: Vec<Notification>,
    pub analytics_reports: Vec<AnalyticsReport>,
    pub preferences: Preferences,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePreferencesRequest {
    pub name: Option<String>,
    pub company: Option<String>,
    pub notification_channels: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub dashboard_url: String,
}
