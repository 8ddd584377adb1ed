pub mod analytics_reports;
pub mod bookings;
pub mod invoices;
pub mod notifications;
pub mod projects;
pub mod reviews;
pub mod support_tickets;
pub mod users;

pub use analytics_reports::Entity as AnalyticsReports;
pub use bookings::Entity as Bookings;
pub use invoices::Entity as Invoices;
pub use notifications::Entity as Notifications;
pub use projects::Entity as Projects;
pub use reviews::Entity as Reviews;
pub use support_tickets::Entity as SupportTickets;
pub use users::Entity as Users;
