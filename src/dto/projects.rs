use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Project;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub user_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub deliverables: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectList {
    pub items: Vec<Project>,
}
