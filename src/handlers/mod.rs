use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse, Result};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::DatabaseService;
use crate::dto::{
    self, AddressRequest, PaginationQuery, PaymentRequest, ProductFilterQuery,
    SupportReplyRequest, UserListQuery, VendorDocumentVerificationRequest,
};
use crate::models::ApiResponse;
use crate::services::{
    AddressService, CatalogService, OrderService, PaymentService, SupportService, UserService,
    VendorService,
};
use crate::utils;
use crate::utils::error::AppError;

#[cfg(test)]
mod health_test;

/// Register every API route together with the JSON and query extractor configs
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                .route("/status", web::get().to(server_status))
                .route("/users/{user_id}/addresses", web::get().to(list_addresses))
                .route("/users/{user_id}/addresses", web::post().to(create_address))
                .route("/users/{user_id}/payments", web::post().to(create_payment))
                .route("/users/{user_id}/wallet/transactions", web::get().to(list_wallet_transactions))
                .route("/products", web::get().to(search_products))
                .route("/vendor-types", web::get().to(list_vendor_types))
                .route("/vendors/{vendor_id}/status", web::get().to(vendor_status))
                .route("/support/tickets/{ticket_id}/replies", web::post().to(create_support_reply))
                .route("/drivers/{driver_id}/orders", web::get().to(driver_orders))
                .route("/admin/users", web::get().to(admin_list_users))
                .route(
                    "/admin/vendors/{vendor_id}/documents/{document_id}",
                    web::put().to(admin_review_document),
                ),
        );
}

/// Malformed or mistyped JSON bodies get the same error shape as DTO violations
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = match &err {
            JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                utils::response::error_response("Request body is too large", 413)
            }
            _ => utils::response::validation_error_response(vec![err.to_string()]),
        };
        InternalError::from_response(err, response).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req| {
        let response = utils::response::validation_error_response(vec![err.to_string()]);
        InternalError::from_response(err, response).into()
    })
}

fn parse_id(raw: &str, label: &str) -> std::result::Result<Uuid, HttpResponse> {
    utils::validate_uuid(raw)
        .map_err(|_| utils::response::error_response(&format!("Invalid {} ID", label), 400))
}

/// Turn a service error into a response. Internal failures are audited and
/// hidden behind a generic message.
fn service_error(err: AppError, category: &'static str, db: &Arc<DatabaseService>) -> HttpResponse {
    if !err.is_internal() {
        return utils::response::error_response(&err.message, err.status_code);
    }

    // Don't block the response on DB logging
    let db_clone = Arc::clone(db);
    let err_str = err.to_string();
    actix_web::rt::spawn(async move {
        if let Err(e) = utils::log_internal_error(
            db_clone,
            "ERROR",
            category,
            "Internal error while handling request",
            Some(serde_json::json!({ "error": err_str })),
        )
        .await
        {
            log::warn!("Failed to persist error log for {}: {}", category, e);
        }
    });

    utils::response::error_response("An internal error occurred", 500)
}

/// Health check endpoint
pub async fn health_check() -> Result<HttpResponse> {
    Ok(utils::response::success_response(ApiResponse::success("Server is healthy")))
}

/// Server status endpoint
pub async fn server_status() -> Result<HttpResponse> {
    let status = serde_json::json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });
    Ok(utils::response::success_response(ApiResponse::success(status)))
}

pub async fn create_address(
    path: web::Path<String>,
    req: web::Json<AddressRequest>,
    address_service: web::Data<Arc<AddressService>>,
) -> Result<HttpResponse> {
    let user_id = match parse_id(&path.into_inner(), "user") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let address = match dto::prepare(req.into_inner()) {
        Ok(a) => a,
        Err(msgs) => return Ok(utils::response::validation_error_response(msgs)),
    };

    match address_service.add_address(user_id, address).await {
        Ok(address) => Ok(utils::response::created_response(ApiResponse::success(address))),
        Err(err) => Ok(service_error(err, "create_address", &address_service.db)),
    }
}

pub async fn list_addresses(
    path: web::Path<String>,
    address_service: web::Data<Arc<AddressService>>,
) -> Result<HttpResponse> {
    let user_id = match parse_id(&path.into_inner(), "user") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    match address_service.list_addresses(user_id).await {
        Ok(addresses) => Ok(utils::response::success_response(ApiResponse::success(addresses))),
        Err(err) => Ok(service_error(err, "list_addresses", &address_service.db)),
    }
}

pub async fn create_payment(
    path: web::Path<String>,
    req: web::Json<PaymentRequest>,
    payment_service: web::Data<Arc<PaymentService>>,
) -> Result<HttpResponse> {
    let user_id = match parse_id(&path.into_inner(), "user") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let payment = match dto::prepare(req.into_inner()) {
        Ok(p) => p,
        Err(msgs) => return Ok(utils::response::validation_error_response(msgs)),
    };

    match payment_service.create_payment(user_id, payment).await {
        Ok(txn) => Ok(utils::response::created_response(ApiResponse::success(txn))),
        Err(err) => Ok(service_error(err, "create_payment", &payment_service.db)),
    }
}

pub async fn list_wallet_transactions(
    path: web::Path<String>,
    query: web::Query<PaginationQuery>,
    payment_service: web::Data<Arc<PaymentService>>,
) -> Result<HttpResponse> {
    let user_id = match parse_id(&path.into_inner(), "user") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let page = match dto::prepare(query.into_inner()) {
        Ok(q) => q,
        Err(msgs) => return Ok(utils::response::validation_error_response(msgs)),
    };

    match payment_service.list_transactions(user_id, &page).await {
        Ok(list) => Ok(utils::response::success_response(ApiResponse::success(list))),
        Err(err) => Ok(service_error(err, "list_wallet_transactions", &payment_service.db)),
    }
}

pub async fn search_products(
    query: web::Query<ProductFilterQuery>,
    catalog_service: web::Data<Arc<CatalogService>>,
) -> Result<HttpResponse> {
    let filter = match dto::prepare(query.into_inner()) {
        Ok(f) => f,
        Err(msgs) => return Ok(utils::response::validation_error_response(msgs)),
    };

    match catalog_service.search_products(&filter).await {
        Ok(products) => Ok(utils::response::success_response(ApiResponse::success(products))),
        Err(err) => Ok(service_error(err, "search_products", &catalog_service.db)),
    }
}

pub async fn list_vendor_types(
    catalog_service: web::Data<Arc<CatalogService>>,
) -> Result<HttpResponse> {
    match catalog_service.vendor_types().await {
        Ok(types) => Ok(utils::response::success_response(ApiResponse::success(types))),
        Err(err) => Ok(service_error(err, "list_vendor_types", &catalog_service.db)),
    }
}

pub async fn vendor_status(
    path: web::Path<String>,
    vendor_service: web::Data<Arc<VendorService>>,
) -> Result<HttpResponse> {
    let vendor_id = match parse_id(&path.into_inner(), "vendor") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    match vendor_service.vendor_status(vendor_id).await {
        Ok(status) => Ok(utils::response::success_response(ApiResponse::success(status))),
        Err(err) => Ok(service_error(err, "vendor_status", &vendor_service.db)),
    }
}

pub async fn create_support_reply(
    path: web::Path<String>,
    req: web::Json<SupportReplyRequest>,
    support_service: web::Data<Arc<SupportService>>,
) -> Result<HttpResponse> {
    let ticket_id = match parse_id(&path.into_inner(), "ticket") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let reply = match dto::prepare(req.into_inner()) {
        Ok(r) => r,
        Err(msgs) => return Ok(utils::response::validation_error_response(msgs)),
    };

    match support_service.reply(ticket_id, reply).await {
        Ok(reply) => Ok(utils::response::created_response(ApiResponse::success(reply))),
        Err(err) => Ok(service_error(err, "create_support_reply", &support_service.db)),
    }
}

pub async fn driver_orders(
    path: web::Path<String>,
    query: web::Query<PaginationQuery>,
    order_service: web::Data<Arc<OrderService>>,
) -> Result<HttpResponse> {
    let driver_id = match parse_id(&path.into_inner(), "driver") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let page = match dto::prepare(query.into_inner()) {
        Ok(q) => q,
        Err(msgs) => return Ok(utils::response::validation_error_response(msgs)),
    };

    match order_service.orders_for_driver(driver_id, &page).await {
        Ok(orders) => Ok(utils::response::success_response(ApiResponse::success(orders))),
        Err(err) => Ok(service_error(err, "driver_orders", &order_service.db)),
    }
}

/// Admin endpoint listing users, optionally by role
pub async fn admin_list_users(
    query: web::Query<UserListQuery>,
    user_service: web::Data<Arc<UserService>>,
) -> Result<HttpResponse> {
    let query = match dto::prepare(query.into_inner()) {
        Ok(q) => q,
        Err(msgs) => return Ok(utils::response::validation_error_response(msgs)),
    };

    match user_service.list_users(&query).await {
        Ok(users) => Ok(utils::response::success_response(ApiResponse::success(users))),
        Err(err) => Ok(service_error(err, "admin_list_users", &user_service.db)),
    }
}

/// Admin endpoint approving or rejecting a vendor document
pub async fn admin_review_document(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Json<VendorDocumentVerificationRequest>,
    vendor_service: web::Data<Arc<VendorService>>,
) -> Result<HttpResponse> {
    let (vendor_raw, document_raw) = path.into_inner();
    let vendor_id = match parse_id(&vendor_raw, "vendor") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let document_id = match parse_id(&document_raw, "document") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let review = match dto::prepare(body.into_inner()) {
        Ok(r) => r,
        Err(msgs) => return Ok(utils::response::validation_error_response(msgs)),
    };

    let peer = req.connection_info().peer_addr().unwrap_or("unknown").to_string();
    log::info!(
        "Document {} of vendor {} marked {} (from {})",
        document_id,
        vendor_id,
        review.status.as_str(),
        peer
    );

    match vendor_service.review_document(vendor_id, document_id, review).await {
        Ok(result) => Ok(utils::response::success_response(ApiResponse::success(result))),
        Err(err) => Ok(service_error(err, "admin_review_document", &vendor_service.db)),
    }
}
