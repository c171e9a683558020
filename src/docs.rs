use crate::api::attendance::{AttendanceRequest, AttendanceResponse, PhotoUpload};
use crate::api::invoice::InvoiceRequest;
use crate::api::product::ProductRequest;
use crate::api::purchase::PurchaseRequest;
use crate::model::invoice::Invoice;
use crate::model::product::Product;
use crate::model::purchase::Purchase;
use crate::model::status::{AttendanceStatus, InvoiceStatus, PaymentStatus};
use crate::models::{LoginReqDto, UserReq};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stock Inventory API",
        version = "1.0.0",
        description = r#"
## Stock Inventory Backend

Role-gated records for a small trading business.

### 🔹 Key Features
- **Products**: catalogue with unique product codes
- **Purchases**: purchase orders, payment status, vendor and date lookups
- **Invoices**: client invoices with an approval step and status totals
- **Attendance**: daily employee attendance with a timestamped photo

### 📷 Attendance photos
Uploads are checked (non-empty, size limit, `image/*`), scaled to fit
1024px, stamped with the upload time in a white band and stored as JPEG.

### 🔐 Security
Every `/api` endpoint needs a JWT access token (`Authorization: Bearer ...`).
- **USER**: read
- **MODERATOR**: read, create, update
- **ADMIN**: everything, including delete

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::product::list_products,
        crate::api::product::get_product,
        crate::api::product::create_product,
        crate::api::product::update_product,
        crate::api::product::delete_product,

        crate::api::purchase::list_purchases,
        crate::api::purchase::get_purchase,
        crate::api::purchase::get_purchase_by_po,
        crate::api::purchase::purchases_by_vendor,
        crate::api::purchase::purchases_by_status,
        crate::api::purchase::purchases_by_date_range,
        crate::api::purchase::purchases_by_product,
        crate::api::purchase::create_purchase,
        crate::api::purchase::update_purchase,
        crate::api::purchase::update_purchase_status,
        crate::api::purchase::delete_purchase,

        crate::api::invoice::list_invoices,
        crate::api::invoice::get_invoice,
        crate::api::invoice::get_invoice_by_number,
        crate::api::invoice::invoices_by_client,
        crate::api::invoice::invoices_by_status,
        crate::api::invoice::invoices_by_date_range,
        crate::api::invoice::pending_approval,
        crate::api::invoice::total_amount_by_status,
        crate::api::invoice::create_invoice,
        crate::api::invoice::update_invoice,
        crate::api::invoice::update_invoice_status,
        crate::api::invoice::approve_invoice,
        crate::api::invoice::delete_invoice,

        crate::api::attendance::list_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::attendance_by_employee,
        crate::api::attendance::attendance_by_status,
        crate::api::attendance::attendance_by_date_range,
        crate::api::attendance::create_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::update_attendance_status,
        crate::api::attendance::delete_attendance,
        crate::api::attendance::upload_photo,
        crate::api::attendance::download_photo
    ),
    components(
        schemas(
            Product,
            ProductRequest,
            Purchase,
            PurchaseRequest,
            Invoice,
            InvoiceRequest,
            AttendanceRequest,
            AttendanceResponse,
            PhotoUpload,
            PaymentStatus,
            InvoiceStatus,
            AttendanceStatus,
            UserReq,
            LoginReqDto
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Product", description = "Product catalogue APIs"),
        (name = "Purchase", description = "Purchase order APIs"),
        (name = "Invoice", description = "Invoice and approval APIs"),
        (name = "Attendance", description = "Attendance and photo APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_photo_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/attendance/{id}/photo"));
        assert!(doc.paths.paths.contains_key("/api/invoices/{id}/approve"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
