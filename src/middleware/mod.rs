use actix_web::{
    body::BoxBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, Method},
    Error, HttpResponse,
};

use futures_util::future::LocalBoxFuture;
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const ADMIN_PREFIX: &str = "/api/v1/admin";

/// Sliding-window request counter keyed by client identity
#[derive(Default)]
pub struct RateLimitStore {
    requests: HashMap<String, Vec<i64>>,
}

impl RateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_allowed(&mut self, key: &str, max_requests: u32, window_seconds: u64) -> bool {
        self.is_allowed_at(key, max_requests, window_seconds, chrono::Utc::now().timestamp())
    }

    fn is_allowed_at(&mut self, key: &str, max_requests: u32, window_seconds: u64, now: i64) -> bool {
        let window_start = now - window_seconds as i64;
        let hits = self.requests.entry(key.to_string()).or_default();

        hits.retain(|&timestamp| timestamp > window_start);
        if hits.len() >= max_requests as usize {
            return false;
        }

        hits.push(now);
        true
    }

    /// Drop keys with no hits newer than `max_age_seconds`
    pub fn cleanup(&mut self, max_age_seconds: u64) {
        let cutoff = chrono::Utc::now().timestamp() - max_age_seconds as i64;
        self.requests.retain(|_, timestamps| {
            timestamps.retain(|&timestamp| timestamp > cutoff);
            !timestamps.is_empty()
        });
    }

    pub fn tracked_keys(&self) -> usize {
        self.requests.len()
    }
}

/// Guards the admin scope with a shared API key sent as `X-API-Key`.
/// With no key configured the admin endpoints stay closed.
pub struct AdminKeyMiddleware {
    pub admin_api_key: Option<String>,
}

impl<S> Transform<S, ServiceRequest> for AdminKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminKeyMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminKeyMiddlewareService {
            service: Arc::new(service),
            admin_api_key: self.admin_api_key.clone(),
        }))
    }
}

pub struct AdminKeyMiddlewareService<S> {
    service: Arc<S>,
    admin_api_key: Option<String>,
}

impl<S> Service<ServiceRequest> for AdminKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Arc::clone(&self.service);
        let admin_api_key = self.admin_api_key.clone();

        Box::pin(async move {
            if !req.path().starts_with(ADMIN_PREFIX) {
                return service.call(req).await;
            }

            let expected = match admin_api_key {
                Some(key) => key,
                None => {
                    let response = HttpResponse::Forbidden()
                        .json(serde_json::json!({"error": "Admin API is disabled"}));
                    return Ok(req.into_response(response));
                }
            };

            let provided = req
                .headers()
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string());

            match provided {
                None => {
                    let response = HttpResponse::Unauthorized()
                        .json(serde_json::json!({"error": "Missing admin API key"}));
                    Ok(req.into_response(response))
                }
                Some(key) if keys_match(&key, &expected) => service.call(req).await,
                Some(_) => {
                    let ip = req.connection_info().peer_addr().unwrap_or("unknown").to_string();
                    log::warn!("Rejected admin request to {} from {}", req.path(), ip);
                    let response = HttpResponse::Unauthorized()
                        .json(serde_json::json!({"error": "Invalid admin API key"}));
                    Ok(req.into_response(response))
                }
            }
        })
    }
}

// Compares every byte so the time taken does not leak the matching prefix length
fn keys_match(provided: &str, expected: &str) -> bool {
    let a = provided.as_bytes();
    let b = expected.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// CORS middleware
pub struct CorsMiddleware {
    pub allowed_origins: Vec<String>,
}

impl<S> Transform<S, ServiceRequest> for CorsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsMiddlewareService {
            service: Arc::new(service),
            allowed_origins: self.allowed_origins.clone(),
        }))
    }
}

pub struct CorsMiddlewareService<S> {
    service: Arc<S>,
    allowed_origins: Vec<String>,
}

impl<S> Service<ServiceRequest> for CorsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Arc::clone(&self.service);
        let allowed_origins = self.allowed_origins.clone();

        Box::pin(async move {
            // Answer preflight requests without reaching the routes
            if req.method() == Method::OPTIONS {
                let mut res = req.into_response(HttpResponse::NoContent().finish());
                apply_cors_headers(&mut res, &allowed_origins);
                return Ok(res);
            }

            let mut res = service.call(req).await?;
            apply_cors_headers(&mut res, &allowed_origins);
            Ok(res)
        })
    }
}

fn apply_cors_headers(res: &mut ServiceResponse<BoxBody>, allowed_origins: &[String]) {
    // Get origin before borrowing headers mutably
    let origin_header = res.request().headers().get(header::ORIGIN).cloned();
    let headers = res.headers_mut();

    if let Some(origin) = origin_header {
        if let Ok(origin_str) = origin.to_str() {
            if allowed_origins.iter().any(|o| o == origin_str || o == "*") {
                headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
                headers.insert(header::VARY, header::HeaderValue::from_static("Origin"));
            }
        }
    }

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        header::HeaderValue::from_static("GET, POST, PUT, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        header::HeaderValue::from_static("Content-Type, X-Requested-With, X-API-Key"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        header::HeaderValue::from_static("600"),
    );
}

/// Rate limiting middleware
pub struct RateLimitMiddleware {
    pub store: Arc<Mutex<RateLimitStore>>,
    pub max_requests: u32,
    pub window_seconds: u64,
    /// Only a key matching this one earns its own bucket
    pub admin_api_key: Option<String>,
}

impl<S> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Arc::new(service),
            store: Arc::clone(&self.store),
            max_requests: self.max_requests,
            window_seconds: self.window_seconds,
            admin_api_key: self.admin_api_key.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Arc<S>,
    store: Arc<Mutex<RateLimitStore>>,
    max_requests: u32,
    window_seconds: u64,
    admin_api_key: Option<String>,
}

impl<S> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Arc::clone(&self.service);
        let store = Arc::clone(&self.store);
        let max_requests = self.max_requests;
        let window_seconds = self.window_seconds;
        let admin_api_key = self.admin_api_key.clone();

        Box::pin(async move {
            let ip = req.connection_info().peer_addr()
                .unwrap_or("unknown")
                .to_string();
            let api_key = req
                .headers()
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok());
            let key = rate_limit_key(api_key, admin_api_key.as_deref(), &ip);

            let allowed = {
                let mut store = store.lock().await;
                store.is_allowed(&key, max_requests, window_seconds)
            };
            if !allowed {
                let response = HttpResponse::TooManyRequests()
                    .json(serde_json::json!({"error": "Rate limit exceeded. Please try again later."}));
                return Ok(req.into_response(response));
            }

            service.call(req).await
        })
    }
}

/// Requests are counted per peer address. A verified admin key gets a
/// separate bucket on that address; any other key is ignored.
pub fn rate_limit_key(api_key: Option<&str>, admin_api_key: Option<&str>, ip: &str) -> String {
    match (api_key, admin_api_key) {
        (Some(key), Some(expected)) if keys_match(key, expected) => format!("admin|ip:{}", ip),
        _ => ip.to_string(),
    }
}

/// Request size limiting middleware
pub struct RequestSizeLimitMiddleware {
    pub max_size: usize,
}

impl<S> Transform<S, ServiceRequest> for RequestSizeLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestSizeLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestSizeLimitMiddlewareService {
            service: Arc::new(service),
            max_size: self.max_size,
        }))
    }
}

pub struct RequestSizeLimitMiddlewareService<S> {
    service: Arc<S>,
    max_size: usize,
}

impl<S> Service<ServiceRequest> for RequestSizeLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Arc::clone(&self.service);
        let max_size = self.max_size;

        Box::pin(async move {
            // Check Content-Length header
            if let Some(content_length) = req.headers().get("content-length") {
                if let Ok(length_str) = content_length.to_str() {
                    if let Ok(length) = length_str.parse::<usize>() {
                        if length > max_size {
                            let response = HttpResponse::PayloadTooLarge()
                                .json(serde_json::json!({"error": format!("Request size {} exceeds maximum allowed size {}", length, max_size)}));
                            return Ok(req.into_response(response));
                        }
                    }
                }
            }

            service.call(req).await
        })
    }
}

/// Security headers middleware
pub struct SecurityHeadersMiddleware;

impl<S> Transform<S, ServiceRequest> for SecurityHeadersMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityHeadersMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityHeadersMiddlewareService {
            service: Arc::new(service),
        }))
    }
}

pub struct SecurityHeadersMiddlewareService<S> {
    service: Arc<S>,
}

impl<S> Service<ServiceRequest> for SecurityHeadersMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Arc::clone(&self.service);

        Box::pin(async move {
            let mut res = service.call(req).await?;

            let headers = res.headers_mut();

            // Security headers
            headers.insert(
                header::X_CONTENT_TYPE_OPTIONS,
                header::HeaderValue::from_static("nosniff"),
            );

            headers.insert(
                header::X_FRAME_OPTIONS,
                header::HeaderValue::from_static("DENY"),
            );

            headers.insert(
                header::X_XSS_PROTECTION,
                header::HeaderValue::from_static("1; mode=block"),
            );

            headers.insert(
                header::STRICT_TRANSPORT_SECURITY,
                header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
            );

            headers.insert(
                header::REFERRER_POLICY,
                header::HeaderValue::from_static("strict-origin-when-cross-origin"),
            );

            Ok(res)
        })
    }
}

/// Logging middleware
pub struct LoggingMiddleware;

impl<S> Transform<S, ServiceRequest> for LoggingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggingMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggingMiddlewareService {
            service: Arc::new(service),
        }))
    }
}

pub struct LoggingMiddlewareService<S> {
    service: Arc<S>,
}

impl<S> Service<ServiceRequest> for LoggingMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Arc::clone(&self.service);
        let start_time = std::time::Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();
        let remote_addr = req.connection_info().peer_addr().unwrap_or("unknown").to_string();

        Box::pin(async move {
            let result = service.call(req).await;
            let duration = start_time.elapsed();

            match &result {
                Ok(res) => {
                    log::info!(
                        "Request completed: {} {} {} {}ms from {}",
                        method, uri, res.status().as_u16(), duration.as_millis(), remote_addr
                    );
                }
                Err(err) => {
                    log::error!(
                        "Request failed: {} {} {} {}ms from {}",
                        method, uri, err, duration.as_millis(), remote_addr
                    );
                }
            }

            result
        })
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;

    #[test]
    fn rate_limit_store_enforces_window() {
        let mut store = RateLimitStore::new();
        assert!(store.is_allowed_at("ip", 2, 60, 1_000));
        assert!(store.is_allowed_at("ip", 2, 60, 1_001));
        assert!(!store.is_allowed_at("ip", 2, 60, 1_002));
        // the first hits have aged out
        assert!(store.is_allowed_at("ip", 2, 60, 1_062));
        assert!(store.is_allowed_at("other", 2, 60, 1_002));
    }

    #[test]
    fn cleanup_forgets_idle_clients() {
        let mut store = RateLimitStore::new();
        store.is_allowed_at("stale", 5, 60, 0);
        store.is_allowed("fresh", 5, 60);
        store.cleanup(3600);
        assert_eq!(store.tracked_keys(), 1);
    }

    #[test]
    fn rate_limit_key_ignores_unverified_keys() {
        assert_eq!(rate_limit_key(None, Some("s3cret"), "10.0.0.1"), "10.0.0.1");
        assert_eq!(rate_limit_key(Some("junk"), Some("s3cret"), "10.0.0.1"), "10.0.0.1");
        assert_eq!(rate_limit_key(Some("junk"), None, "10.0.0.1"), "10.0.0.1");
        assert_eq!(
            rate_limit_key(Some("s3cret"), Some("s3cret"), "10.0.0.1"),
            "admin|ip:10.0.0.1"
        );
    }

    #[test]
    fn keys_match_requires_exact_key() {
        assert!(keys_match("secret", "secret"));
        assert!(!keys_match("secreT", "secret"));
        assert!(!keys_match("secret-longer", "secret"));
    }
}
