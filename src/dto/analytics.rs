use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::AnalyticsReport;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAnalyticsReportRequest {
    pub user_id: Uuid,
    pub title: String,
    pub results_url: Option<String>,
}

/// Moves a report along; `results_url` is usually set together with `completed`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAnalyticsReportRequest {
    /// One of `pending`, `processing`, `completed`, `failed` (any case).
    pub status: String,
    pub results_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsReportList {
    pub items: Vec<AnalyticsReport>,
}
