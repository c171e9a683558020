use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Purchase order joined with its product code and creator's username.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Purchase {
    pub id: u64,
    pub vendor_name: String,
    pub po_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub purchase_date: NaiveDate,
    #[schema(example = "2026-01-08", value_type = Option<String>, format = "date")]
    pub delivery_date: Option<NaiveDate>,
    #[schema(example = "PENDING")]
    pub payment_status: String,
    pub product_id: Option<u64>,
    pub product_code: Option<String>,
    pub created_by: Option<String>,
    #[schema(example = "2026-01-01T09:30:00", value_type = Option<String>, format = "date-time")]
    pub created_on: Option<NaiveDateTime>,
}

/// Order total, computed from the line when the caller did not supply one.
pub fn resolve_total_price(unit_price: f64, quantity: i32, total_price: Option<f64>) -> f64 {
    total_price.unwrap_or(unit_price * quantity as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_defaults_to_unit_times_quantity() {
        assert_eq!(resolve_total_price(2.5, 4, None), 10.0);
    }

    #[test]
    fn explicit_total_wins() {
        // negotiated discount
        assert_eq!(resolve_total_price(2.5, 4, Some(9.0)), 9.0);
    }
}
