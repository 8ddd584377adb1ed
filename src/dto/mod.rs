pub mod analytics;
pub mod auth;
pub mod bookings;
pub mod invoices;
pub mod notifications;
pub mod projects;
pub mod reviews;
pub mod tickets;
pub mod users;

use serde::Deserialize;
use utoipa::ToSchema;

/// Body of every admin status transition endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}
