use crate::{
    auth::auth::AuthUser,
    model::{
        purchase::{Purchase, resolve_total_price},
        status::PaymentStatus,
    },
    utils::db_utils::{
        DateRangeQuery, FilterValue, bind_filters, internal_error, is_duplicate_key, like_pattern,
    },
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct PurchaseRequest {
    #[schema(example = "ABC Suppliers")]
    pub vendor_name: String,
    #[schema(example = "PO-2024-001")]
    pub po_id: String,
    #[schema(example = "Cordless Drill")]
    pub product_name: String,
    #[schema(example = 10)]
    pub quantity: i32,
    #[schema(example = 99.5)]
    pub unit_price: f64,
    /// Defaults to `unit_price * quantity`
    pub total_price: Option<f64>,
    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub purchase_date: NaiveDate,
    #[schema(example = "2024-01-22", value_type = Option<String>, format = "date")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Links the order to a catalogue product when it exists
    pub product_id: Option<u64>,
}

impl PurchaseRequest {
    fn validate(&self) -> Result<(), &'static str> {
        if self.vendor_name.trim().is_empty() || self.vendor_name.len() > 100 {
            return Err("vendor_name must be 1-100 characters");
        }
        if self.po_id.trim().is_empty() || self.po_id.len() > 50 {
            return Err("po_id must be 1-50 characters");
        }
        if self.product_name.trim().is_empty() || self.product_name.len() > 100 {
            return Err("product_name must be 1-100 characters");
        }
        if self.quantity <= 0 {
            return Err("quantity must be positive");
        }
        if !(self.unit_price.is_finite() && self.unit_price > 0.0) {
            return Err("unit_price must be positive");
        }
        if let Some(total) = self.total_price {
            if !(total.is_finite() && total > 0.0) {
                return Err("total_price must be positive");
            }
        }
        Ok(())
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentStatusQuery {
    pub status: PaymentStatus,
}

const SELECT_PURCHASE: &str = r#"
    SELECT
        pu.id, pu.vendor_name, pu.po_id, pu.product_name, pu.quantity,
        pu.unit_price, pu.total_price, pu.purchase_date, pu.delivery_date,
        pu.payment_status, pu.product_id, p.code AS product_code,
        u.username AS created_by, pu.created_on
    FROM purchases pu
    LEFT JOIN products p ON p.id = pu.product_id
    LEFT JOIN users u ON u.id = pu.created_by
"#;

async fn find_purchases(
    pool: &MySqlPool,
    filter: &str,
    args: &[FilterValue],
) -> Result<Vec<Purchase>, sqlx::Error> {
    let sql = format!("{SELECT_PURCHASE} {filter} ORDER BY pu.id");
    bind_filters(sqlx::query_as::<_, Purchase>(&sql), args)
        .fetch_all(pool)
        .await
}

async fn find_one(
    pool: &MySqlPool,
    filter: &str,
    arg: FilterValue,
) -> Result<Option<Purchase>, sqlx::Error> {
    Ok(find_purchases(pool, filter, &[arg]).await?.into_iter().next())
}

async fn po_id_taken(pool: &MySqlPool, po_id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT EXISTS(SELECT 1 FROM purchases WHERE po_id = ?)")
        .bind(po_id)
        .fetch_one(pool)
        .await
        .map(|found| found > 0)
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "message": "Purchase not found" }))
}

fn duplicate_po() -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "message": "Error: PO ID already exists!" }))
}

fn one_or_404(purchase: Option<Purchase>) -> HttpResponse {
    match purchase {
        Some(p) => HttpResponse::Ok().json(p),
        None => not_found(),
    }
}

/// List purchases
#[utoipa::path(
    get,
    path = "/api/purchases",
    responses((status = 200, description = "All purchases", body = [Purchase])),
    security(("bearer_auth" = [])),
    tag = "Purchase"
)]
pub async fn list_purchases(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let purchases = find_purchases(pool.get_ref(), "", &[])
        .await
        .map_err(|e| internal_error(e, "Failed to list purchases"))?;

    Ok(HttpResponse::Ok().json(purchases))
}

/// Get purchase by id
#[utoipa::path(
    get,
    path = "/api/purchases/{id}",
    params(("id" = u64, Path, description = "Purchase id")),
    responses(
        (status = 200, description = "Purchase found", body = Purchase),
        (status = 404, description = "Purchase not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Purchase"
)]
pub async fn get_purchase(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let purchase = find_one(pool.get_ref(), "WHERE pu.id = ?", FilterValue::U64(path.into_inner()))
        .await
        .map_err(|e| internal_error(e, "Failed to fetch purchase"))?;

    Ok(one_or_404(purchase))
}

/// Get purchase by PO number
#[utoipa::path(
    get,
    path = "/api/purchases/po/{po_id}",
    params(("po_id" = String, Path, description = "Purchase order number")),
    responses(
        (status = 200, description = "Purchase found", body = Purchase),
        (status = 404, description = "Purchase not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Purchase"
)]
pub async fn get_purchase_by_po(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let purchase = find_one(pool.get_ref(), "WHERE pu.po_id = ?", FilterValue::Str(path.into_inner()))
        .await
        .map_err(|e| internal_error(e, "Failed to fetch purchase by PO id"))?;

    Ok(one_or_404(purchase))
}

/// Search purchases by vendor name (case-insensitive substring)
#[utoipa::path(
    get,
    path = "/api/purchases/vendor/{vendor_name}",
    params(("vendor_name" = String, Path, description = "Part of the vendor name")),
    responses((status = 200, description = "Matching purchases", body = [Purchase])),
    security(("bearer_auth" = [])),
    tag = "Purchase"
)]
pub async fn purchases_by_vendor(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let pattern = like_pattern(&path.into_inner());
    let purchases = find_purchases(
        pool.get_ref(),
        "WHERE LOWER(pu.vendor_name) LIKE ?",
        &[FilterValue::Str(pattern)],
    )
    .await
    .map_err(|e| internal_error(e, "Failed to search purchases by vendor"))?;

    Ok(HttpResponse::Ok().json(purchases))
}

/// Purchases with a given payment status
#[utoipa::path(
    get,
    path = "/api/purchases/status/{status}",
    params(("status" = PaymentStatus, Path, description = "Payment status")),
    responses((status = 200, description = "Matching purchases", body = [Purchase])),
    security(("bearer_auth" = [])),
    tag = "Purchase"
)]
pub async fn purchases_by_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<PaymentStatus>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let status = path.into_inner();
    let purchases = find_purchases(
        pool.get_ref(),
        "WHERE pu.payment_status = ?",
        &[FilterValue::Str(status.to_string())],
    )
    .await
    .map_err(|e| internal_error(e, "Failed to list purchases by status"))?;

    Ok(HttpResponse::Ok().json(purchases))
}

/// Purchases whose purchase date falls inside the range (inclusive)
#[utoipa::path(
    get,
    path = "/api/purchases/date-range",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Matching purchases", body = [Purchase]),
        (status = 400, description = "start_date after end_date")
    ),
    security(("bearer_auth" = [])),
    tag = "Purchase"
)]
pub async fn purchases_by_date_range(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<DateRangeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let (start, end) = query.validate()?;
    let purchases = find_purchases(
        pool.get_ref(),
        "WHERE pu.purchase_date BETWEEN ? AND ?",
        &[FilterValue::Date(start), FilterValue::Date(end)],
    )
    .await
    .map_err(|e| internal_error(e, "Failed to list purchases by date range"))?;

    Ok(HttpResponse::Ok().json(purchases))
}

/// Purchases linked to a catalogue product
#[utoipa::path(
    get,
    path = "/api/purchases/product/{product_id}",
    params(("product_id" = u64, Path, description = "Product id")),
    responses((status = 200, description = "Matching purchases", body = [Purchase])),
    security(("bearer_auth" = [])),
    tag = "Purchase"
)]
pub async fn purchases_by_product(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let purchases = find_purchases(
        pool.get_ref(),
        "WHERE pu.product_id = ?",
        &[FilterValue::U64(path.into_inner())],
    )
    .await
    .map_err(|e| internal_error(e, "Failed to list purchases by product"))?;

    Ok(HttpResponse::Ok().json(purchases))
}

/// Create purchase
#[utoipa::path(
    post,
    path = "/api/purchases",
    request_body = PurchaseRequest,
    responses(
        (status = 201, description = "Purchase created", body = Purchase),
        (status = 400, description = "Invalid payload or duplicate PO id", body = Object, example = json!({
            "message": "Error: PO ID already exists!"
        })),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Purchase"
)]
pub async fn create_purchase(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<PurchaseRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    if let Err(msg) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
    }

    let total_price = resolve_total_price(payload.unit_price, payload.quantity, payload.total_price);

    // a missing product leaves the order unlinked
    let result = sqlx::query(
        r#"
        INSERT INTO purchases
            (vendor_name, po_id, product_name, quantity, unit_price, total_price,
             purchase_date, delivery_date, payment_status, product_id, created_by, created_on)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, (SELECT id FROM products WHERE id = ?), ?, NOW())
        "#,
    )
    .bind(&payload.vendor_name)
    .bind(payload.po_id.trim())
    .bind(&payload.product_name)
    .bind(payload.quantity)
    .bind(payload.unit_price)
    .bind(total_price)
    .bind(payload.purchase_date)
    .bind(payload.delivery_date)
    .bind(payload.payment_status.as_ref())
    .bind(payload.product_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await;

    let id = match result {
        Ok(r) => r.last_insert_id(),
        Err(e) if is_duplicate_key(&e) => return Ok(duplicate_po()),
        Err(e) => return Err(internal_error(e, "Failed to create purchase")),
    };

    info!(id, po_id = %payload.po_id, user = %auth.username, "Purchase created");

    let purchase = find_one(pool.get_ref(), "WHERE pu.id = ?", FilterValue::U64(id))
        .await
        .map_err(|e| internal_error(e, "Failed to reload purchase"))?;

    Ok(match purchase {
        Some(p) => HttpResponse::Created().json(p),
        None => not_found(),
    })
}

/// Update purchase
#[utoipa::path(
    put,
    path = "/api/purchases/{id}",
    params(("id" = u64, Path, description = "Purchase id")),
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Purchase updated", body = Purchase),
        (status = 400, description = "Invalid payload or PO id already used"),
        (status = 404, description = "Purchase not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Purchase"
)]
pub async fn update_purchase(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<PurchaseRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    if let Err(msg) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
    }

    let id = path.into_inner();
    let pool = pool.get_ref();

    let Some(existing) = find_one(pool, "WHERE pu.id = ?", FilterValue::U64(id))
        .await
        .map_err(|e| internal_error(e, "Failed to fetch purchase"))?
    else {
        return Ok(not_found());
    };

    let po_id = payload.po_id.trim();
    if existing.po_id != po_id
        && po_id_taken(pool, po_id)
            .await
            .map_err(|e| internal_error(e, "Failed to check PO id"))?
    {
        return Ok(duplicate_po());
    }

    let total_price = resolve_total_price(payload.unit_price, payload.quantity, payload.total_price);

    let result = sqlx::query(
        r#"
        UPDATE purchases
        SET vendor_name = ?, po_id = ?, product_name = ?, quantity = ?, unit_price = ?,
            total_price = ?, purchase_date = ?, delivery_date = ?, payment_status = ?,
            product_id = (SELECT id FROM products WHERE id = ?)
        WHERE id = ?
        "#,
    )
    .bind(&payload.vendor_name)
    .bind(po_id)
    .bind(&payload.product_name)
    .bind(payload.quantity)
    .bind(payload.unit_price)
    .bind(total_price)
    .bind(payload.purchase_date)
    .bind(payload.delivery_date)
    .bind(payload.payment_status.as_ref())
    .bind(payload.product_id)
    .bind(id)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {}
        // lost a race with another writer for the same PO id
        Err(e) if is_duplicate_key(&e) => return Ok(duplicate_po()),
        Err(e) => return Err(internal_error(e, "Failed to update purchase")),
    }

    let purchase = find_one(pool, "WHERE pu.id = ?", FilterValue::U64(id))
        .await
        .map_err(|e| internal_error(e, "Failed to reload purchase"))?;

    Ok(one_or_404(purchase))
}

/// Change the payment status of a purchase
#[utoipa::path(
    patch,
    path = "/api/purchases/{id}/status",
    params(("id" = u64, Path, description = "Purchase id"), PaymentStatusQuery),
    responses(
        (status = 200, description = "Status updated", body = Purchase),
        (status = 404, description = "Purchase not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Purchase"
)]
pub async fn update_purchase_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<PaymentStatusQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    let id = path.into_inner();

    // rows_affected is 0 for an unchanged value, so existence comes from the re-read
    sqlx::query("UPDATE purchases SET payment_status = ? WHERE id = ?")
        .bind(query.status.as_ref())
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "Failed to update purchase status"))?;

    let purchase = find_one(pool.get_ref(), "WHERE pu.id = ?", FilterValue::U64(id))
        .await
        .map_err(|e| internal_error(e, "Failed to reload purchase"))?;

    Ok(one_or_404(purchase))
}

/// Delete purchase (admin only)
#[utoipa::path(
    delete,
    path = "/api/purchases/{id}",
    params(("id" = u64, Path, description = "Purchase id")),
    responses(
        (status = 200, description = "Purchase deleted", body = Object, example = json!({
            "message": "Purchase deleted successfully"
        })),
        (status = 404, description = "Purchase not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Purchase"
)]
pub async fn delete_purchase(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM purchases WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "Failed to delete purchase"))?;

    if result.rows_affected() == 0 {
        return Ok(not_found());
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Purchase deleted successfully"
    })))
}
