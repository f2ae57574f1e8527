use actix_web::{web, App, HttpServer, middleware as actix_middleware};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration};

use delivery_marketplace::config::AppConfig;
use delivery_marketplace::database::DatabaseService;
use delivery_marketplace::handlers;
use delivery_marketplace::middleware::*;
use delivery_marketplace::services::{
    AddressService, CatalogService, OrderService, PaymentService, SupportService, UserService,
    VendorService,
};
use delivery_marketplace::utils;
use dotenvy::dotenv;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment from .env (if present)
    let _ = dotenv();

    let config = AppConfig::from_env().map_err(|e| startup_error("Failed to load configuration", e))?;

    // Keep the handle alive for the lifetime of the server so file output is flushed
    let _logger = utils::logging::init(&config.logging.level, &config.logging.directory);

    log::info!("Starting delivery marketplace API v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Server: {}:{}", config.server.host, config.server.port);
    log::info!("Workers: {}", config.server.workers);
    if config.security.admin_api_key.is_none() {
        log::warn!("ADMIN_API_KEY is not set; admin endpoints are disabled");
    }

    let db_service = Arc::new(
        DatabaseService::new(&config.database)
            .await
            .map_err(|e| startup_error("Failed to initialize database", e))?,
    );
    log::info!("Database: Connected to PostgreSQL");

    if let Err(e) = db_service.init_schema().await {
        log::error!("Failed to initialize DB schema: {}", e);
    } else {
        log::info!("DB schema ensured");
    }

    let rate_limit_store = Arc::new(Mutex::new(RateLimitStore::new()));

    let address_service = Arc::new(AddressService::new(Arc::clone(&db_service)));
    let payment_service = Arc::new(PaymentService::new(
        Arc::clone(&db_service),
        config.marketplace.default_currency.clone(),
    ));
    let catalog_service = Arc::new(CatalogService::new(Arc::clone(&db_service)));
    let vendor_service = Arc::new(VendorService::new(Arc::clone(&db_service)));
    let support_service = Arc::new(SupportService::new(Arc::clone(&db_service)));
    let order_service = Arc::new(OrderService::new(Arc::clone(&db_service)));
    let user_service = Arc::new(UserService::new(Arc::clone(&db_service)));

    println!("🚀 Delivery marketplace API started!");
    println!("📍 Local access: http://{}:{}", config.server.host, config.server.port);
    println!("📍 Health check: http://{}:{}/health", config.server.host, config.server.port);
    println!("📝 Press Ctrl+C to stop the server");
    println!();

    // Forget idle rate-limit clients once an hour
    let store_for_bg = Arc::clone(&rate_limit_store);
    let window = config.security.rate_limit_window_seconds;
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            let mut store = store_for_bg.lock().await;
            store.cleanup(window.max(3600));
            log::debug!("Rate limit store holds {} clients", store.tracked_keys());
        }
    });

    HttpServer::new(move || {
        App::new()
            // Shared data
            .app_data(web::Data::new(Arc::clone(&db_service)))
            .app_data(web::Data::new(Arc::clone(&address_service)))
            .app_data(web::Data::new(Arc::clone(&payment_service)))
            .app_data(web::Data::new(Arc::clone(&catalog_service)))
            .app_data(web::Data::new(Arc::clone(&vendor_service)))
            .app_data(web::Data::new(Arc::clone(&support_service)))
            .app_data(web::Data::new(Arc::clone(&order_service)))
            .app_data(web::Data::new(Arc::clone(&user_service)))

            // Custom middleware (applied before compression to work with original body types)
            .wrap(AdminKeyMiddleware {
                admin_api_key: config.security.admin_api_key.clone(),
            })
            .wrap(SecurityHeadersMiddleware)
            .wrap(LoggingMiddleware)
            .wrap(RequestSizeLimitMiddleware {
                max_size: config.security.max_request_size_bytes,
            })
            .wrap(RateLimitMiddleware {
                store: Arc::clone(&rate_limit_store),
                max_requests: config.security.rate_limit_requests,
                window_seconds: config.security.rate_limit_window_seconds,
                admin_api_key: config.security.admin_api_key.clone(),
            })
            .wrap(CorsMiddleware {
                allowed_origins: config.security.cors_allowed_origins.clone(),
            })

            // Actix built-in middleware (applied after custom middleware to avoid body type conflicts)
            .wrap(actix_middleware::Compress::default())

            .configure(handlers::configure)
    })
    .bind((config.server.host.clone(), config.server.port))?
    .workers(config.server.workers)
    .keep_alive(std::time::Duration::from_secs(config.server.keep_alive_seconds))
    .client_request_timeout(std::time::Duration::from_secs(config.server.client_timeout_seconds))
    .client_disconnect_timeout(std::time::Duration::from_secs(config.server.client_shutdown_seconds))
    .max_connections(config.server.max_connections)
    .run()
    .await
}
