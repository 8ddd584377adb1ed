use axum::Router;

use crate::state::AppState;

pub mod analytics;
pub mod bookings;
pub mod customer;
pub mod doc;
pub mod health;
pub mod invoices;
pub mod notifications;
pub mod params;
pub mod projects;
pub mod reviews;
pub mod tickets;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/customer", customer::router())
        .nest("/bookings", bookings::router())
        .nest("/support-tickets", tickets::router())
        .nest("/invoices", invoices::router())
        .nest("/projects", projects::router())
        .nest("/notifications", notifications::router())
        .nest("/reviews", reviews::router())
        .nest("/analytics-reports", analytics::router())
}
