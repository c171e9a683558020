use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Invoice joined with the usernames of its creator and approver.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Invoice {
    pub id: u64,
    #[schema(example = "42")]
    pub invoice_id: String,
    pub client_name: String,
    pub amount: f64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub invoice_date: NaiveDate,
    pub description: Option<String>,
    #[schema(example = "DRAFT")]
    pub payment_status: String,
    pub created_by: Option<String>,
    pub approved_by: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_on: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub approved_on: Option<NaiveDateTime>,
}
