use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{analytics_reports, bookings, invoices, notifications, projects, reviews, support_tickets, users},
    error::AppError,
};

/// Declares a closed string vocabulary stored as text in the database.
///
/// `parse` ignores case and rejects anything outside the vocabulary with a
/// 400 naming `$label`.
macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Matches case-insensitively; the canonical spelling is `as_str`.
            pub fn parse(value: &str) -> Result<Self, AppError> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(value))
                    .ok_or_else(|| {
                        AppError::BadRequest(format!(
                            concat!("Invalid ", $label, " '{}'; expected one of: {}"),
                            value,
                            Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
                        ))
                    })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary!(Role, "role" {
    Admin => "admin",
    Customer => "customer",
});

vocabulary!(
    /// Services a customer can book a call for.
    BookingService, "service" {
        BasicReport => "basic_report",
        AdvancedForecasting => "advanced_forecasting",
        MlModel => "ml_model",
    }
);

vocabulary!(BookingStatus, "booking status" {
    Pending => "pending",
    Confirmed => "confirmed",
    Completed => "completed",
    Cancelled => "cancelled",
});

vocabulary!(TicketStatus, "ticket status" {
    Open => "open",
    Closed => "closed",
});

vocabulary!(ProjectStatus, "project status" {
    InProgress => "in_progress",
    AwaitingData => "awaiting_data",
    Completed => "completed",
});

vocabulary!(AnalyticsStatus, "report status" {
    Pending => "pending",
    Processing => "processing",
    Completed => "completed",
    Failed => "failed",
});

vocabulary!(NotificationChannel, "notification channel" {
    Email => "Email",
    Sms => "SMS",
    Push => "Push",
});

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl TicketStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Closed)
    }
}

impl ProjectStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed)
    }
}

impl AnalyticsStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalyticsStatus::Completed | AnalyticsStatus::Failed)
    }
}

impl BookingService {
    pub fn label(&self) -> &'static str {
        match self {
            BookingService::BasicReport => "Basic Report",
            BookingService::AdvancedForecasting => "Advanced Forecasting",
            BookingService::MlModel => "ML Model",
        }
    }
}

/// Public view of a user. The password hash and verification token never leave the service.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_verified: bool,
    pub company: Option<String>,
    pub profile_completion: i32,
    pub notification_channels: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub email: String,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupportTicket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Invoice {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub issued_on: NaiveDate,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub deadline: NaiveDate,
    pub status: String,
    pub deliverables: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalyticsReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub status: String,
    pub results_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub name: String,
    pub text: String,
    pub rating: i32,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Reads a JSON array of strings, skipping anything that is not a string.
pub(crate) fn string_list(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            is_verified: model.is_verified,
            company: model.company,
            profile_completion: model.profile_completion,
            notification_channels: string_list(&model.notification_channels),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<bookings::Model> for Booking {
    fn from(model: bookings::Model) -> Self {
        Booking {
            id: model.id,
            user_id: model.user_id,
            service: model.service,
            date: model.date,
            time: model.time,
            email: model.email,
            notes: model.notes,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<support_tickets::Model> for SupportTicket {
    fn from(model: support_tickets::Model) -> Self {
        SupportTicket {
            id: model.id,
            user_id: model.user_id,
            subject: model.subject,
            description: model.description,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<invoices::Model> for Invoice {
    fn from(model: invoices::Model) -> Self {
        Invoice {
            id: model.id,
            user_id: model.user_id,
            amount: model.amount,
            issued_on: model.issued_on,
            url: model.url,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<projects::Model> for Project {
    fn from(model: projects::Model) -> Self {
        Project {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            start_date: model.start_date,
            deadline: model.deadline,
            status: model.status,
            deliverables: string_list(&model.deliverables),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<notifications::Model> for Notification {
    fn from(model: notifications::Model) -> Self {
        Notification {
            id: model.id,
            user_id: model.user_id,
            message: model.message,
            read: model.read,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<analytics_reports::Model> for AnalyticsReport {
    fn from(model: analytics_reports::Model) -> Self {
        AnalyticsReport {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            status: model.status,
            results_url: model.results_url,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<reviews::Model> for Review {
    fn from(model: reviews::Model) -> Self {
        Review {
            id: model.id,
            name: model.name,
            text: model.text,
            rating: model.rating,
            approved: model.approved,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_services_and_rejects_others() {
        assert_eq!(
            BookingService::parse("ml_model").unwrap(),
            BookingService::MlModel
        );
        let err = BookingService::parse("astrology").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("basic_report")));
    }

    #[test]
    fn parse_ignores_case_but_stores_canonical_spelling() {
        let channel = NotificationChannel::parse("sms").unwrap();
        assert_eq!(channel, NotificationChannel::Sms);
        assert_eq!(channel.as_str(), "SMS");

        assert_eq!(TicketStatus::parse("Closed").unwrap(), TicketStatus::Closed);
        assert_eq!(TicketStatus::parse(" OPEN ").unwrap().as_str(), "open");
        assert_eq!(AnalyticsStatus::parse("Processing").unwrap(), AnalyticsStatus::Processing);
        assert!(TicketStatus::parse("Clos").is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert!(TicketStatus::Closed.is_terminal());
        assert!(!ProjectStatus::AwaitingData.is_terminal());
        assert!(AnalyticsStatus::Failed.is_terminal());
        assert!(!AnalyticsStatus::Pending.is_terminal());
    }

    #[test]
    fn string_list_ignores_non_strings() {
        let value = serde_json::json!(["Email", 3, "Push"]);
        assert_eq!(string_list(&value), vec!["Email", "Push"]);
    }
}
