use crate::{auth::auth::AuthUser, model::product::Product, utils::db_utils::is_duplicate_key};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ProductRequest {
    #[schema(example = "SKU-1001")]
    pub code: String,
    #[serde(alias = "product")]
    #[schema(example = "Cordless Drill")]
    pub name: String,
    #[schema(example = "Makita")]
    pub brand: String,
    #[schema(example = "Tools")]
    pub category: String,
    #[schema(example = 129.99)]
    pub price: f64,
    pub color: Option<String>,
    pub thumbnail_image: Option<String>,
    pub sub_images: Option<String>,
    pub description: Option<String>,
}

impl ProductRequest {
    fn validate(&self) -> Result<(), &'static str> {
        if self.code.trim().is_empty() {
            return Err("code must not be blank");
        }
        if self.name.trim().is_empty() || self.name.len() > 100 {
            return Err("name must be 1-100 characters");
        }
        if self.brand.trim().is_empty() || self.brand.len() > 50 {
            return Err("brand must be 1-50 characters");
        }
        if self.category.trim().is_empty() || self.category.len() > 50 {
            return Err("category must be 1-50 characters");
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("price must be zero or positive");
        }
        Ok(())
    }
}

const SELECT_PRODUCT: &str = r#"
    SELECT id, code, name, brand, category, price, color, thumbnail_image, sub_images, description
    FROM products
"#;

async fn fetch_product(pool: &MySqlPool, id: u64) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "message": "Product not found" }))
}

/// List products
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products", body = [Product]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Product"
)]
pub async fn list_products(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let products = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} ORDER BY id"))
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list products");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(products))
}

/// Get product by id
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = u64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Product"
)]
pub async fn get_product(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let id = path.into_inner();
    let product = fetch_product(pool.get_ref(), id).await.map_err(|e| {
        error!(error = %e, id, "Failed to fetch product");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(match product {
        Some(p) => HttpResponse::Ok().json(p),
        None => not_found(),
    })
}

/// Create product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid payload or duplicate code", body = Object, example = json!({
            "message": "Error: Product code already exists!"
        })),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Product"
)]
pub async fn create_product(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ProductRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    if let Err(msg) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO products
            (code, name, brand, category, price, color, thumbnail_image, sub_images, description)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.code.trim())
    .bind(&payload.name)
    .bind(&payload.brand)
    .bind(&payload.category)
    .bind(payload.price)
    .bind(&payload.color)
    .bind(&payload.thumbnail_image)
    .bind(&payload.sub_images)
    .bind(&payload.description)
    .execute(pool.get_ref())
    .await;

    let id = match result {
        Ok(r) => r.last_insert_id(),
        Err(e) if is_duplicate_key(&e) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Error: Product code already exists!"
            })));
        }
        Err(e) => {
            error!(error = %e, code = %payload.code, "Failed to create product");
            return Err(ErrorInternalServerError("Internal Server Error"));
        }
    };

    let product = fetch_product(pool.get_ref(), id).await.map_err(|e| {
        error!(error = %e, id, "Failed to reload product");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(match product {
        Some(p) => HttpResponse::Created().json(p),
        None => not_found(),
    })
}

/// Update product. The product code is fixed at creation and ignored here.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = u64, Path, description = "Product id")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Product"
)]
pub async fn update_product(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ProductRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    if let Err(msg) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
    }

    let id = path.into_inner();

    let existing = fetch_product(pool.get_ref(), id).await.map_err(|e| {
        error!(error = %e, id, "Failed to fetch product");
        ErrorInternalServerError("Internal Server Error")
    })?;
    if existing.is_none() {
        return Ok(not_found());
    }

    sqlx::query(
        r#"
        UPDATE products
        SET name = ?, brand = ?, category = ?, price = ?, color = ?,
            thumbnail_image = ?, sub_images = ?, description = ?
        WHERE id = ?
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.brand)
    .bind(&payload.category)
    .bind(payload.price)
    .bind(&payload.color)
    .bind(&payload.thumbnail_image)
    .bind(&payload.sub_images)
    .bind(&payload.description)
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to update product");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let product = fetch_product(pool.get_ref(), id).await.map_err(|e| {
        error!(error = %e, id, "Failed to reload product");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(match product {
        Some(p) => HttpResponse::Ok().json(p),
        None => not_found(),
    })
}

/// Delete product (admin only)
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = u64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = Object, example = json!({
            "message": "Product deleted successfully"
        })),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Product"
)]
pub async fn delete_product(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete product");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(not_found());
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Product deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProductRequest {
        serde_json::from_value(json!({
            "code": "SKU-1",
            "product": "Hammer",
            "brand": "Stanley",
            "category": "Tools",
            "price": 12.5
        }))
        .unwrap()
    }

    #[test]
    fn legacy_product_field_maps_to_name() {
        let req = request();
        assert_eq!(req.name, "Hammer");
        assert!(req.color.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut req = request();
        req.brand = "   ".into();
        assert!(req.validate().is_err());

        let mut req = request();
        req.code = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn long_name_is_rejected() {
        let mut req = request();
        req.name = "x".repeat(101);
        assert_eq!(req.validate(), Err("name must be 1-100 characters"));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut req = request();
        req.price = -1.0;
        assert!(req.validate().is_err());
    }
}
