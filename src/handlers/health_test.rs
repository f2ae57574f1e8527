use super::*;
use actix_web::{test, web, App};

#[actix_rt::test]
async fn health_check_returns_healthy() {
    let app = test::init_service(App::new().route("/health", web::get().to(health_check))).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"], "Server is healthy");
}

#[actix_rt::test]
async fn status_reports_version() {
    let app = test::init_service(App::new().route("/status", web::get().to(server_status))).await;
    let req = test::TestRequest::get().uri("/status").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "running");
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_rt::test]
async fn parse_id_rejects_malformed_ids() {
    let resp = parse_id("12", "vendor").unwrap_err();
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    assert!(parse_id("6f1c2d1e-8a9b-4c3d-9e8f-0a1b2c3d4e5f", "vendor").is_ok());
}
