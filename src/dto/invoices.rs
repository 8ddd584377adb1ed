use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Invoice;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInvoiceRequest {
    pub user_id: Uuid,
    /// Minor currency units, must be positive.
    pub amount: i64,
    /// Defaults to today.
    pub issued_on: Option<NaiveDate>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceList {
    pub items: Vec<Invoice>,
}
