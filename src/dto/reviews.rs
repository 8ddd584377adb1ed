use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Review;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub name: String,
    pub text: String,
    pub rating: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewApprovalRequest {
    pub approved: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewList {
    pub items: Vec<Review>,
}
