use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "code": "SKU-1001",
        "name": "Cordless Drill",
        "brand": "Makita",
        "category": "Tools",
        "price": 129.99,
        "color": "teal",
        "thumbnail_image": "https://cdn.example.com/sku-1001.jpg",
        "sub_images": null,
        "description": "18V brushless"
    })
)]
pub struct Product {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: f64,
    pub color: Option<String>,
    pub thumbnail_image: Option<String>,
    pub sub_images: Option<String>,
    pub description: Option<String>,
}
