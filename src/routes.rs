use crate::{
    api::{attendance, invoice, product, purchase},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(60_000 / requests_per_min as u64)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter)
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter)
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes. Fixed segments are registered before `/{id}`.
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::scope("/products")
                    .service(
                        web::resource("")
                            .route(web::get().to(product::list_products))
                            .route(web::post().to(product::create_product)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(product::get_product))
                            .route(web::put().to(product::update_product))
                            .route(web::delete().to(product::delete_product)),
                    ),
            )
            .service(
                web::scope("/purchases")
                    .service(
                        web::resource("")
                            .route(web::get().to(purchase::list_purchases))
                            .route(web::post().to(purchase::create_purchase)),
                    )
                    .route("/po/{po_id}", web::get().to(purchase::get_purchase_by_po))
                    .route("/vendor/{vendor_name}", web::get().to(purchase::purchases_by_vendor))
                    .route("/status/{status}", web::get().to(purchase::purchases_by_status))
                    .route("/date-range", web::get().to(purchase::purchases_by_date_range))
                    .route("/product/{product_id}", web::get().to(purchase::purchases_by_product))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(purchase::get_purchase))
                            .route(web::put().to(purchase::update_purchase))
                            .route(web::delete().to(purchase::delete_purchase)),
                    )
                    .route("/{id}/status", web::patch().to(purchase::update_purchase_status)),
            )
            .service(
                web::scope("/invoices")
                    .service(
                        web::resource("")
                            .route(web::get().to(invoice::list_invoices))
                            .route(web::post().to(invoice::create_invoice)),
                    )
                    .route("/invoice/{invoice_id}", web::get().to(invoice::get_invoice_by_number))
                    .route("/client/{client_name}", web::get().to(invoice::invoices_by_client))
                    .route("/status/{status}", web::get().to(invoice::invoices_by_status))
                    .route("/date-range", web::get().to(invoice::invoices_by_date_range))
                    .route("/pending-approval", web::get().to(invoice::pending_approval))
                    .route("/total-amount/{status}", web::get().to(invoice::total_amount_by_status))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(invoice::get_invoice))
                            .route(web::put().to(invoice::update_invoice))
                            .route(web::delete().to(invoice::delete_invoice)),
                    )
                    .route("/{id}/status", web::patch().to(invoice::update_invoice_status))
                    .route("/{id}/approve", web::patch().to(invoice::approve_invoice)),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::list_attendance))
                            .route(web::post().to(attendance::create_attendance)),
                    )
                    .route("/employee/{emp_id}", web::get().to(attendance::attendance_by_employee))
                    .route("/status/{status}", web::get().to(attendance::attendance_by_status))
                    .route("/date-range", web::get().to(attendance::attendance_by_date_range))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(attendance::get_attendance))
                            .route(web::put().to(attendance::update_attendance))
                            .route(web::delete().to(attendance::delete_attendance)),
                    )
                    .route("/{id}/status", web::patch().to(attendance::update_attendance_status))
                    .service(
                        web::resource("/{id}/photo")
                            .route(web::post().to(attendance::upload_photo))
                            .route(web::get().to(attendance::download_photo)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns new access + refresh pair

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::jwt::generate_access_token, model::role::Role, photo::PhotoPipeline};
    use actix_web::{App, http::StatusCode, test, web::Data};
    use serde_json::{Value, json};
    use sqlx::mysql::MySqlPoolOptions;
    use std::net::SocketAddr;

    const BOUNDARY: &str = "stock-test-boundary";

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn bearer(role: Role, config: &Config) -> (&'static str, String) {
        let token =
            generate_access_token(1, "tester".into(), role.id(), &config.jwt_secret, 900).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    fn photo_form(content_type: &str, body: &[u8]) -> Vec<u8> {
        let mut form = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"photo\"; filename=\"photo.bin\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        form.extend_from_slice(body);
        form.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        form
    }

    // The pool is lazy and these requests are all refused before any query runs.
    macro_rules! app {
        ($config:expr, $pipeline:expr) => {{
            let config: Config = $config;
            let pool = MySqlPoolOptions::new()
                .connect_lazy(&config.database_url)
                .unwrap();
            test::init_service(
                App::new()
                    .app_data(Data::new(pool))
                    .app_data(Data::new(config.clone()))
                    .app_data(Data::new($pipeline))
                    .configure(|cfg| configure(cfg, config.clone())),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn protected_routes_require_a_token() {
        let app = app!(Config::for_tests(), PhotoPipeline::default());

        let req = test::TestRequest::get()
            .uri("/api/products")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn refresh_token_is_not_an_access_token() {
        let config = Config::for_tests();
        let (token, _) = crate::auth::jwt::generate_refresh_token(
            1,
            "tester".into(),
            Role::Admin.id(),
            &config.jwt_secret,
            900,
        )
        .unwrap();
        let app = app!(config, PhotoPipeline::default());

        let req = test::TestRequest::get()
            .uri("/api/invoices")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn access_token_cannot_be_exchanged_for_new_tokens() {
        let config = Config::for_tests();
        let header = bearer(Role::Admin, &config);
        let app = app!(config, PhotoPipeline::default());

        let req = test::TestRequest::post()
            .uri("/auth/refresh")
            .insert_header(header)
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn user_role_cannot_create_products() {
        let config = Config::for_tests();
        let auth = bearer(Role::User, &config);
        let app = app!(config, PhotoPipeline::default());

        let req = test::TestRequest::post()
            .uri("/api/products")
            .insert_header(auth)
            .set_json(json!({
                "code": "SKU-1",
                "name": "Hammer",
                "brand": "Stanley",
                "category": "Tools",
                "price": 12.5
            }))
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn moderator_cannot_delete_invoices() {
        let config = Config::for_tests();
        let auth = bearer(Role::Moderator, &config);
        let app = app!(config, PhotoPipeline::default());

        let req = test::TestRequest::delete()
            .uri("/api/invoices/3")
            .insert_header(auth)
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn reversed_date_range_is_rejected() {
        let config = Config::for_tests();
        let auth = bearer(Role::User, &config);
        let app = app!(config, PhotoPipeline::default());

        let req = test::TestRequest::get()
            .uri("/api/purchases/date-range?start_date=2024-02-01&end_date=2024-01-01")
            .insert_header(auth)
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn non_image_upload_is_rejected() {
        let config = Config::for_tests();
        let auth = bearer(Role::Moderator, &config);
        let app = app!(config, PhotoPipeline::default());

        let req = test::TestRequest::post()
            .uri("/api/attendance/5/photo")
            .insert_header(auth)
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(photo_form("text/plain", b"not a picture"))
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("must be an image"), "{message}");
    }

    #[actix_web::test]
    async fn empty_upload_is_rejected() {
        let config = Config::for_tests();
        let auth = bearer(Role::Admin, &config);
        let app = app!(config, PhotoPipeline::default());

        let req = test::TestRequest::post()
            .uri("/api/attendance/5/photo")
            .insert_header(auth)
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(photo_form("image/jpeg", b""))
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Error: Photo file is empty");
    }

    #[actix_web::test]
    async fn oversized_upload_is_rejected() {
        let config = Config::for_tests();
        let auth = bearer(Role::Moderator, &config);
        let app = app!(config, PhotoPipeline::new(16));

        let req = test::TestRequest::post()
            .uri("/api/attendance/5/photo")
            .insert_header(auth)
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(photo_form("image/jpeg", &[0xAB; 64]))
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn user_role_cannot_upload_photos() {
        let config = Config::for_tests();
        let auth = bearer(Role::User, &config);
        let app = app!(config, PhotoPipeline::default());

        let req = test::TestRequest::post()
            .uri("/api/attendance/5/photo")
            .insert_header(auth)
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(photo_form("image/jpeg", b"\xFF\xD8\xFF"))
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
