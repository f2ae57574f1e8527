use std::sync::Arc;
use uuid::Uuid;

/// Mask sensitive values partially (e.g., emails, phone numbers, gateway references)
pub fn mask_sensitive(value: &str) -> String {
    if value.is_empty() {
        return "".to_string();
    }

    // If it looks like an email, mask local part
    if let Some(idx) = value.find('@') {
        let (local, domain) = value.split_at(idx);
        let domain = &domain[1..];
        let visible = if local.chars().count() <= 2 { 1 } else { 2 };
        let shown: String = local.chars().take(visible).collect();
        return format!("{}***@{}", shown, domain);
    }

    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return format!("{}***", chars[0]);
    }

    let start: String = chars[..4].iter().collect();
    let end: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", start, end)
}

/// Truncate string to maximum length in characters
pub fn truncate_string(input: &str, max_len: usize) -> String {
    if input.chars().count() <= max_len {
        input.to_string()
    } else {
        let kept: String = input.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// ID validation
pub fn validate_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| "Invalid UUID format".to_string())
}

/// Logging helpers
pub mod logging {
    use log::LevelFilter;

    pub fn level_from_string(level: &str) -> LevelFilter {
        match level.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        }
    }

    /// Start flexi_logger writing to `directory` and stdout, falling back to env_logger.
    /// The returned handle must be kept alive for file output to be flushed.
    pub fn init(level: &str, directory: &str) -> Option<flexi_logger::LoggerHandle> {
        let logger = match flexi_logger::Logger::try_with_str(level) {
            Ok(logger) => logger,
            Err(_) => {
                init_env_logger(level);
                return None;
            }
        };

        let file_spec = flexi_logger::FileSpec::default()
            .directory(directory)
            .suppress_timestamp();
        match logger
            .log_to_file(file_spec)
            .duplicate_to_stdout(flexi_logger::Duplicate::Info)
            .start()
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                eprintln!("file logging unavailable ({}), using stderr", e);
                init_env_logger(level);
                None
            }
        }
    }

    /// Plain stderr logging, used by the scripts
    pub fn init_env_logger(level: &str) {
        let _ = env_logger::builder()
            .filter_level(level_from_string(level))
            .format_timestamp_secs()
            .try_init();
    }
}

/// Error handling utilities
pub mod error {
    use actix_web::http::StatusCode;

    #[derive(Debug, thiserror::Error)]
    #[error("{message}")]
    pub struct AppError {
        pub message: String,
        pub status_code: u16,
    }

    impl AppError {
        pub fn new(message: impl Into<String>, status_code: u16) -> Self {
            Self {
                message: message.into(),
                status_code,
            }
        }

        pub fn forbidden(message: impl Into<String>) -> Self {
            Self::new(message, 403)
        }

        pub fn not_found(message: impl Into<String>) -> Self {
            Self::new(message, 404)
        }

        pub fn conflict(message: impl Into<String>) -> Self {
            Self::new(message, 409)
        }

        pub fn internal(message: impl Into<String>) -> Self {
            Self::new(message, 500)
        }

        pub fn is_internal(&self) -> bool {
            self.status_code >= 500
        }

        pub fn status(&self) -> StatusCode {
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }

    impl From<Box<dyn std::error::Error + Send + Sync>> for AppError {
        fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
            Self::internal(err.to_string())
        }
    }
}

/// Response helpers
pub mod response {
    use actix_web::HttpResponse;
    use serde::Serialize;

    pub fn json_response<T: Serialize>(data: T, status: u16) -> HttpResponse {
        match actix_web::http::StatusCode::from_u16(status) {
            Ok(code) => HttpResponse::build(code)
                .content_type("application/json")
                .json(data),
            Err(_) => HttpResponse::build(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
                .content_type("application/json")
                .json(serde_json::json!({"error": "Invalid status code"})),
        }
    }

    pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
        json_response(data, 200)
    }

    pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
        json_response(data, 201)
    }

    pub fn error_response(message: &str, status: u16) -> HttpResponse {
        json_response(serde_json::json!({"error": message}), status)
    }

    pub fn validation_error_response(errors: Vec<String>) -> HttpResponse {
        json_response(serde_json::json!({"errors": errors}), 400)
    }
}

/// Log internal error details to database and to logger, return the inserted error ID.
pub async fn log_internal_error(
    db: Arc<crate::database::DatabaseService>,
    severity: &str,
    category: &str,
    message: &str,
    details: Option<serde_json::Value>,
) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
    let sanitized_details = details.map(sanitize_details);

    log::error!(
        "[{}] {}: {} - details: {:?}",
        severity,
        category,
        message,
        sanitized_details
    );

    let id = db
        .insert_error_log(severity, category, message, sanitized_details)
        .await?;
    Ok(id)
}

/// Mask commonly sensitive keys and bound the size of free-form details
pub fn sanitize_details(details: serde_json::Value) -> serde_json::Value {
    match details {
        serde_json::Value::Object(mut map) => {
            for key in ["email", "phone", "gateway_reference", "card_number", "authorization"] {
                if let Some(v) = map.get_mut(key) {
                    if let Some(s) = v.as_str() {
                        *v = serde_json::Value::String(mask_sensitive(s));
                    }
                }
            }
            serde_json::Value::Object(map)
        }
        other => serde_json::Value::String(truncate_string(&other.to_string(), 1024)),
    }
}
