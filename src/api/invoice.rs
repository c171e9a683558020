use crate::{
    auth::auth::AuthUser,
    model::{invoice::Invoice, status::InvoiceStatus},
    utils::db_utils::{
        DateRangeQuery, FilterValue, bind_filters, internal_error, is_duplicate_key, like_pattern,
    },
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct InvoiceRequest {
    /// Generated when omitted on create. Cannot be changed afterwards.
    #[schema(example = "INV-1001")]
    pub invoice_id: Option<String>,
    #[schema(example = "Globex Corporation")]
    pub client_name: String,
    #[schema(example = 1250.0)]
    pub amount: f64,
    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub invoice_date: NaiveDate,
    pub description: Option<String>,
    #[serde(default)]
    pub payment_status: InvoiceStatus,
}

impl InvoiceRequest {
    fn validate(&self) -> Result<(), &'static str> {
        if self.client_name.trim().is_empty() || self.client_name.len() > 100 {
            return Err("client_name must be 1-100 characters");
        }
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err("amount must be positive");
        }
        if let Some(id) = &self.invoice_id {
            if id.trim().is_empty() || id.len() > 50 {
                return Err("invoice_id must be 1-50 characters");
            }
        }
        Ok(())
    }

    fn requested_invoice_id(&self) -> Option<&str> {
        self.invoice_id.as_deref().map(str::trim)
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceStatusQuery {
    pub status: InvoiceStatus,
}

const SELECT_INVOICE: &str = r#"
    SELECT
        i.id, i.invoice_id, i.client_name, i.amount, i.invoice_date, i.description,
        i.payment_status, c.username AS created_by, a.username AS approved_by,
        i.created_on, i.approved_on
    FROM invoices i
    LEFT JOIN users c ON c.id = i.created_by
    LEFT JOIN users a ON a.id = i.approved_by
"#;

async fn find_invoices(
    pool: &MySqlPool,
    filter: &str,
    args: &[FilterValue],
) -> Result<Vec<Invoice>, sqlx::Error> {
    let sql = format!("{SELECT_INVOICE} {filter} ORDER BY i.id");
    bind_filters(sqlx::query_as::<_, Invoice>(&sql), args)
        .fetch_all(pool)
        .await
}

async fn find_by_id(pool: &MySqlPool, id: u64) -> Result<Option<Invoice>, sqlx::Error> {
    Ok(find_invoices(pool, "WHERE i.id = ?", &[FilterValue::U64(id)])
        .await?
        .into_iter()
        .next())
}

async fn invoice_id_taken(pool: &MySqlPool, invoice_id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT EXISTS(SELECT 1 FROM invoices WHERE invoice_id = ?)")
        .bind(invoice_id)
        .fetch_one(pool)
        .await
        .map(|found| found > 0)
}

/// Next free numeric invoice id, starting from the row count.
async fn next_invoice_id(pool: &MySqlPool) -> Result<String, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
        .fetch_one(pool)
        .await?;

    let mut candidate = count + 1;
    while invoice_id_taken(pool, &candidate.to_string()).await? {
        candidate += 1;
    }
    Ok(candidate.to_string())
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "message": "Invoice not found" }))
}

fn duplicate_invoice_id() -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "message": "Error: Invoice ID already exists!" }))
}

fn one_or_404(invoice: Option<Invoice>) -> HttpResponse {
    match invoice {
        Some(i) => HttpResponse::Ok().json(i),
        None => not_found(),
    }
}

/// List invoices
#[utoipa::path(
    get,
    path = "/api/invoices",
    responses((status = 200, description = "All invoices", body = [Invoice])),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn list_invoices(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let invoices = find_invoices(pool.get_ref(), "", &[])
        .await
        .map_err(|e| internal_error(e, "Failed to list invoices"))?;

    Ok(HttpResponse::Ok().json(invoices))
}

/// Get invoice by id
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    params(("id" = u64, Path, description = "Invoice row id")),
    responses(
        (status = 200, description = "Invoice found", body = Invoice),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn get_invoice(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let invoice = find_by_id(pool.get_ref(), path.into_inner())
        .await
        .map_err(|e| internal_error(e, "Failed to fetch invoice"))?;

    Ok(one_or_404(invoice))
}

/// Get invoice by its business invoice id
#[utoipa::path(
    get,
    path = "/api/invoices/invoice/{invoice_id}",
    params(("invoice_id" = String, Path, description = "Invoice number")),
    responses(
        (status = 200, description = "Invoice found", body = Invoice),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn get_invoice_by_number(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let invoice = find_invoices(
        pool.get_ref(),
        "WHERE i.invoice_id = ?",
        &[FilterValue::Str(path.into_inner())],
    )
    .await
    .map_err(|e| internal_error(e, "Failed to fetch invoice by number"))?
    .into_iter()
    .next();

    Ok(one_or_404(invoice))
}

/// Search invoices by client name (case-insensitive substring)
#[utoipa::path(
    get,
    path = "/api/invoices/client/{client_name}",
    params(("client_name" = String, Path, description = "Part of the client name")),
    responses((status = 200, description = "Matching invoices", body = [Invoice])),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn invoices_by_client(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let invoices = find_invoices(
        pool.get_ref(),
        "WHERE LOWER(i.client_name) LIKE ?",
        &[FilterValue::Str(like_pattern(&path.into_inner()))],
    )
    .await
    .map_err(|e| internal_error(e, "Failed to search invoices by client"))?;

    Ok(HttpResponse::Ok().json(invoices))
}

/// Invoices with a given payment status
#[utoipa::path(
    get,
    path = "/api/invoices/status/{status}",
    params(("status" = InvoiceStatus, Path, description = "Payment status")),
    responses((status = 200, description = "Matching invoices", body = [Invoice])),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn invoices_by_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<InvoiceStatus>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let invoices = find_invoices(
        pool.get_ref(),
        "WHERE i.payment_status = ?",
        &[FilterValue::Str(path.into_inner().to_string())],
    )
    .await
    .map_err(|e| internal_error(e, "Failed to list invoices by status"))?;

    Ok(HttpResponse::Ok().json(invoices))
}

/// Invoices dated inside the range (inclusive)
#[utoipa::path(
    get,
    path = "/api/invoices/date-range",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Matching invoices", body = [Invoice]),
        (status = 400, description = "start_date after end_date")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn invoices_by_date_range(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<DateRangeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let (start, end) = query.validate()?;
    let invoices = find_invoices(
        pool.get_ref(),
        "WHERE i.invoice_date BETWEEN ? AND ?",
        &[FilterValue::Date(start), FilterValue::Date(end)],
    )
    .await
    .map_err(|e| internal_error(e, "Failed to list invoices by date range"))?;

    Ok(HttpResponse::Ok().json(invoices))
}

/// Pending invoices nobody has approved yet
#[utoipa::path(
    get,
    path = "/api/invoices/pending-approval",
    responses(
        (status = 200, description = "Invoices awaiting approval", body = [Invoice]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn pending_approval(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    let invoices = find_invoices(
        pool.get_ref(),
        "WHERE i.approved_by IS NULL AND i.payment_status = ?",
        &[FilterValue::Str(InvoiceStatus::Pending.to_string())],
    )
    .await
    .map_err(|e| internal_error(e, "Failed to list invoices pending approval"))?;

    Ok(HttpResponse::Ok().json(invoices))
}

/// Sum of invoice amounts with a given status
#[utoipa::path(
    get,
    path = "/api/invoices/total-amount/{status}",
    params(("status" = InvoiceStatus, Path, description = "Payment status")),
    responses((status = 200, description = "Total amount", body = Object, example = json!({
        "status": "PAID",
        "total_amount": 1250.0
    }))),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn total_amount_by_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<InvoiceStatus>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let status = path.into_inner();
    let total: f64 = sqlx::query_scalar(
        "SELECT CAST(COALESCE(SUM(amount), 0) AS DOUBLE) FROM invoices WHERE payment_status = ?",
    )
    .bind(status.as_ref())
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| internal_error(e, "Failed to total invoice amounts"))?;

    Ok(HttpResponse::Ok().json(json!({
        "status": status,
        "total_amount": total
    })))
}

/// Create invoice
#[utoipa::path(
    post,
    path = "/api/invoices",
    request_body = InvoiceRequest,
    responses(
        (status = 201, description = "Invoice created", body = Invoice),
        (status = 400, description = "Invalid payload or duplicate invoice id", body = Object, example = json!({
            "message": "Error: Invoice ID already exists!"
        })),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn create_invoice(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<InvoiceRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    if let Err(msg) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
    }

    let pool = pool.get_ref();

    let invoice_id = match payload.requested_invoice_id() {
        Some(id) => {
            let taken = invoice_id_taken(pool, id)
                .await
                .map_err(|e| internal_error(e, "Failed to check invoice id"))?;
            if taken {
                return Ok(duplicate_invoice_id());
            }
            id.to_owned()
        }
        None => {
            let id = next_invoice_id(pool)
                .await
                .map_err(|e| internal_error(e, "Failed to generate invoice id"))?;
            debug!(invoice_id = %id, "Generated invoice id");
            id
        }
    };

    let result = sqlx::query(
        r#"
        INSERT INTO invoices
            (invoice_id, client_name, amount, invoice_date, description,
             payment_status, created_by, created_on)
        VALUES (?, ?, ?, ?, ?, ?, ?, NOW())
        "#,
    )
    .bind(&invoice_id)
    .bind(&payload.client_name)
    .bind(payload.amount)
    .bind(payload.invoice_date)
    .bind(&payload.description)
    .bind(payload.payment_status.as_ref())
    .bind(auth.user_id)
    .execute(pool)
    .await;

    let id = match result {
        Ok(r) => r.last_insert_id(),
        Err(e) if is_duplicate_key(&e) => return Ok(duplicate_invoice_id()),
        Err(e) => return Err(internal_error(e, "Failed to create invoice")),
    };

    info!(id, invoice_id = %invoice_id, user = %auth.username, "Invoice created");

    let invoice = find_by_id(pool, id)
        .await
        .map_err(|e| internal_error(e, "Failed to reload invoice"))?;

    Ok(match invoice {
        Some(i) => HttpResponse::Created().json(i),
        None => not_found(),
    })
}

/// Update invoice. A supplied `invoice_id` must match the stored one.
#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    params(("id" = u64, Path, description = "Invoice row id")),
    request_body = InvoiceRequest,
    responses(
        (status = 200, description = "Invoice updated", body = Invoice),
        (status = 400, description = "Invalid payload or invoice id change"),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn update_invoice(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<InvoiceRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    if let Err(msg) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
    }

    let id = path.into_inner();
    let pool = pool.get_ref();

    let Some(existing) = find_by_id(pool, id)
        .await
        .map_err(|e| internal_error(e, "Failed to fetch invoice"))?
    else {
        return Ok(not_found());
    };

    if payload
        .requested_invoice_id()
        .is_some_and(|requested| requested != existing.invoice_id)
    {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Error: Invoice ID cannot be changed!"
        })));
    }

    sqlx::query(
        r#"
        UPDATE invoices
        SET client_name = ?, amount = ?, invoice_date = ?, description = ?, payment_status = ?
        WHERE id = ?
        "#,
    )
    .bind(&payload.client_name)
    .bind(payload.amount)
    .bind(payload.invoice_date)
    .bind(&payload.description)
    .bind(payload.payment_status.as_ref())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| internal_error(e, "Failed to update invoice"))?;

    let invoice = find_by_id(pool, id)
        .await
        .map_err(|e| internal_error(e, "Failed to reload invoice"))?;

    Ok(one_or_404(invoice))
}

/// Change the payment status of an invoice
#[utoipa::path(
    patch,
    path = "/api/invoices/{id}/status",
    params(("id" = u64, Path, description = "Invoice row id"), InvoiceStatusQuery),
    responses(
        (status = 200, description = "Status updated", body = Invoice),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn update_invoice_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<InvoiceStatusQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    let id = path.into_inner();

    sqlx::query("UPDATE invoices SET payment_status = ? WHERE id = ?")
        .bind(query.status.as_ref())
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "Failed to update invoice status"))?;

    let invoice = find_by_id(pool.get_ref(), id)
        .await
        .map_err(|e| internal_error(e, "Failed to reload invoice"))?;

    Ok(one_or_404(invoice))
}

/// Approve an invoice as the calling user
#[utoipa::path(
    patch,
    path = "/api/invoices/{id}/approve",
    params(("id" = u64, Path, description = "Invoice row id")),
    responses(
        (status = 200, description = "Invoice approved", body = Invoice),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn approve_invoice(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    let id = path.into_inner();

    // only PENDING moves forward; other statuses keep their value
    sqlx::query(
        r#"
        UPDATE invoices
        SET approved_by = ?,
            approved_on = COALESCE(approved_on, NOW()),
            payment_status = IF(payment_status = ?, ?, payment_status)
        WHERE id = ?
        "#,
    )
    .bind(auth.user_id)
    .bind(InvoiceStatus::Pending.as_ref())
    .bind(InvoiceStatus::Approved.as_ref())
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| internal_error(e, "Failed to approve invoice"))?;

    let invoice = find_by_id(pool.get_ref(), id)
        .await
        .map_err(|e| internal_error(e, "Failed to reload invoice"))?;

    if let Some(i) = &invoice {
        info!(id, invoice_id = %i.invoice_id, approver = %auth.username, "Invoice approved");
    }

    Ok(one_or_404(invoice))
}

/// Delete invoice (admin only)
#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    params(("id" = u64, Path, description = "Invoice row id")),
    responses(
        (status = 200, description = "Invoice deleted", body = Object, example = json!({
            "message": "Invoice deleted successfully"
        })),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn delete_invoice(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM invoices WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "Failed to delete invoice"))?;

    if result.rows_affected() == 0 {
        return Ok(not_found());
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Invoice deleted successfully"
    })))
}
