#[cfg(test)]
mod tests {
    use actix_web::{test, web, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    use delivery_marketplace::config::DatabaseConfig;
    use delivery_marketplace::database::DatabaseService;
    use delivery_marketplace::handlers;
    use delivery_marketplace::middleware::{AdminKeyMiddleware, API_KEY_HEADER};
    use delivery_marketplace::services::{
        AddressService, CatalogService, OrderService, PaymentService, SupportService,
        UserService, VendorService,
    };

    const USER_ID: &str = "2b6f7d0e-1c9a-4f3e-8d2b-5a4c3e2f1a0b";
    const VENDOR_ID: &str = "7e1d2c3b-4a59-4687-9a0b-1c2d3e4f5a6b";
    const DOCUMENT_ID: &str = "0c9b8a7f-6e5d-4c3b-a291-8f7e6d5c4b3a";
    const ADMIN_KEY: &str = "test-admin-key";

    // Nothing listens on port 1; the pool is built lazily so requests rejected
    // before the service layer never notice.
    fn unreachable_db() -> Arc<DatabaseService> {
        let config = DatabaseConfig {
            url: "postgres://postgres@127.0.0.1:1/unreachable".to_string(),
            max_connections: 1,
            connect_timeout_seconds: 1,
            wait_timeout_seconds: 1,
        };
        Arc::new(DatabaseService::from_config(&config).expect("lazy pool"))
    }

    macro_rules! marketplace_app {
        () => {{
            let db = unreachable_db();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(Arc::new(AddressService::new(Arc::clone(&db)))))
                    .app_data(web::Data::new(Arc::new(PaymentService::new(Arc::clone(&db), "USD"))))
                    .app_data(web::Data::new(Arc::new(CatalogService::new(Arc::clone(&db)))))
                    .app_data(web::Data::new(Arc::new(VendorService::new(Arc::clone(&db)))))
                    .app_data(web::Data::new(Arc::new(SupportService::new(Arc::clone(&db)))))
                    .app_data(web::Data::new(Arc::new(OrderService::new(Arc::clone(&db)))))
                    .app_data(web::Data::new(Arc::new(UserService::new(Arc::clone(&db)))))
                    .wrap(AdminKeyMiddleware {
                        admin_api_key: Some(ADMIN_KEY.to_string()),
                    })
                    .configure(handlers::configure),
            )
            .await
        }};
    }

    fn error_messages(body: &Value) -> Vec<String> {
        body["errors"]
            .as_array()
            .map(|errs| errs.iter().filter_map(|e| e.as_str().map(String::from)).collect())
            .unwrap_or_default()
    }

    #[actix_rt::test]
    async fn health_is_public() {
        let app = marketplace_app!();
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_rt::test]
    async fn address_with_out_of_range_coordinates_is_rejected() {
        let app = marketplace_app!();
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/users/{}/addresses", USER_ID))
            .set_json(json!({
                "street": "12 Harbour Road",
                "city": "Lisbon",
                "latitude": 95.0,
                "longitude": -9.1
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_messages(&body), vec!["Latitude must be between -90 and 90"]);
    }

    #[actix_rt::test]
    async fn address_missing_required_field_is_rejected() {
        let app = marketplace_app!();
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/users/{}/addresses", USER_ID))
            .set_json(json!({"city": "Lisbon", "latitude": 1.0, "longitude": 1.0}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_messages(&body).len(), 1);
    }

    #[actix_rt::test]
    async fn malformed_json_gets_error_list() {
        let app = marketplace_app!();
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/users/{}/payments", USER_ID))
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"amount\": 10,")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["errors"].is_array());
    }

    #[actix_rt::test]
    async fn invalid_user_id_is_rejected() {
        let app = marketplace_app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/users/not-a-uuid/addresses")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid user ID");
    }

    #[actix_rt::test]
    async fn unknown_payment_method_is_rejected() {
        let app = marketplace_app!();
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/users/{}/payments", USER_ID))
            .set_json(json!({"amount": 10.0, "method": "bitcoin", "gateway": "internal"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_rt::test]
    async fn cash_payment_through_gateway_is_rejected() {
        let app = marketplace_app!();
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/users/{}/payments", USER_ID))
            .set_json(json!({"amount": 10.0, "method": "cash", "gateway": "stripe"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            error_messages(&body),
            vec!["Cash and wallet payments must use the internal gateway"]
        );
    }

    #[actix_rt::test]
    async fn product_filter_rejects_inverted_price_range() {
        let app = marketplace_app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/products?min_price=50&max_price=10")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            error_messages(&body),
            vec!["Minimum price cannot be greater than maximum price"]
        );
    }

    #[actix_rt::test]
    async fn product_filter_rejects_unknown_sort_field() {
        let app = marketplace_app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/products?sort_by=password")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["errors"].is_array());
    }

    #[actix_rt::test]
    async fn driver_orders_page_limit_is_bounded() {
        let app = marketplace_app!();
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/drivers/{}/orders?limit=500", USER_ID))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_messages(&body), vec!["Limit must be between 1 and 100"]);
    }

    #[actix_rt::test]
    async fn support_reply_with_too_many_attachments_is_rejected() {
        let app = marketplace_app!();
        let attachments: Vec<String> = (0..6)
            .map(|i| format!("https://cdn.example.com/{}.png", i))
            .collect();
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/support/tickets/{}/replies", USER_ID))
            .set_json(json!({"message": "See attached", "attachments": attachments}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_messages(&body), vec!["At most 5 attachments are allowed"]);
    }

    #[actix_rt::test]
    async fn admin_routes_require_api_key() {
        let app = marketplace_app!();
        let req = test::TestRequest::get().uri("/api/v1/admin/users").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_rt::test]
    async fn rejecting_document_requires_reason() {
        let app = marketplace_app!();
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/admin/vendors/{}/documents/{}", VENDOR_ID, DOCUMENT_ID))
            .insert_header((API_KEY_HEADER, ADMIN_KEY))
            .set_json(json!({"status": "rejected"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            error_messages(&body),
            vec!["A rejection reason is required when rejecting a document"]
        );
    }

    #[actix_rt::test]
    async fn document_cannot_be_set_back_to_pending() {
        let app = marketplace_app!();
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/admin/vendors/{}/documents/{}", VENDOR_ID, DOCUMENT_ID))
            .insert_header((API_KEY_HEADER, ADMIN_KEY))
            .set_json(json!({"status": "pending"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_messages(&body), vec!["Status must be approved or rejected"]);
    }

    #[actix_rt::test]
    async fn admin_user_listing_rejects_unknown_role() {
        let app = marketplace_app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/admin/users?role=superuser")
            .insert_header((API_KEY_HEADER, ADMIN_KEY))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_rt::test]
    async fn database_failures_are_hidden_behind_generic_message() {
        let app = marketplace_app!();
        let req = test::TestRequest::get().uri("/api/v1/vendor-types").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 500);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "An internal error occurred");
    }
}
