use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        UpdateStatusRequest,
        analytics::{AnalyticsReportList, CreateAnalyticsReportRequest, UpdateAnalyticsReportRequest},
        auth::{LoginRequest, SignupRequest, TokenResponse},
        bookings::{BookingList, CreateBookingRequest},
        invoices::{CreateInvoiceRequest, InvoiceList},
        notifications::NotificationList,
        projects::{CreateProjectRequest, ProjectList},
        reviews::{CreateReviewRequest, ReviewApprovalRequest, ReviewList},
        tickets::{CreateTicketRequest, TicketList},
        users::{DashboardResponse, Preferences, ProfileResponse, UpdatePreferencesRequest, UserList},
    },
    error::ErrorData,
    models::{
        AnalyticsReport, AnalyticsStatus, Booking, BookingService, BookingStatus, Invoice, Notification, NotificationChannel,
        Project, ProjectStatus, Review, Role, SupportTicket, TicketStatus, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        analytics, bookings, customer, health, invoices, notifications, params, projects, reviews, tickets,
        users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::signup,
        users::verify_email,
        users::login,
        users::profile,
        users::update_profile,
        users::list_users,
        customer::dashboard,
        customer::analytics,
        bookings::create_booking,
        bookings::list_my_bookings,
        bookings::list_all_bookings,
        bookings::update_booking_status,
        tickets::create_ticket,
        tickets::list_my_tickets,
        tickets::list_all_tickets,
        tickets::update_ticket_status,
        invoices::create_invoice,
        invoices::list_my_invoices,
        invoices::list_all_invoices,
        projects::create_project,
        projects::list_my_projects,
        projects::list_all_projects,
        projects::update_project_status,
        notifications::list_my_notifications,
        notifications::mark_read,
        reviews::submit_review,
        reviews::list_reviews,
        reviews::list_all_reviews,
        reviews::set_approval,
        analytics::create_report,
        analytics::list_all_reports,
        analytics::update_report
    ),
    components(
        schemas(
            User,
            Booking,
            SupportTicket,
            Invoice,
            Project,
            Notification,
            Review,
            AnalyticsReport,
            AnalyticsStatus,
            Role,
            BookingService,
            BookingStatus,
            TicketStatus,
            ProjectStatus,
            NotificationChannel,
            SignupRequest,
            LoginRequest,
            TokenResponse,
            UpdatePreferencesRequest,
            Preferences,
            ProfileResponse,
            DashboardResponse,
            UserList,
            CreateBookingRequest,
            BookingList,
            CreateTicketRequest,
            TicketList,
            CreateInvoiceRequest,
            InvoiceList,
            CreateProjectRequest,
            ProjectList,
            NotificationList,
            CreateReviewRequest,
            ReviewApprovalRequest,
            ReviewList,
            UpdateStatusRequest,
            CreateAnalyticsReportRequest,
            UpdateAnalyticsReportRequest,
            AnalyticsReportList,
            ErrorData,
            params::Pagination,
            params::StatusListQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<TokenResponse>,
            ApiResponse<ProfileResponse>,
            ApiResponse<Booking>,
            ApiResponse<BookingList>,
            ApiResponse<ErrorData>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "Signup, verification, login and profile"),
        (name = "Customer", description = "Customer dashboard"),
        (name = "Bookings", description = "Consultation bookings"),
        (name = "Support Tickets", description = "Support tickets"),
        (name = "Invoices", description = "Invoices issued to customers"),
        (name = "Projects", description = "Analytics projects"),
        (name = "Notifications", description = "Status change notifications"),
        (name = "Reviews", description = "Public testimonials"),
        (name = "Analytics", description = "Analytics reports prepared for customers"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
