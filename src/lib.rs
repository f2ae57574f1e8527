pub mod config;
pub mod constants;
pub mod database;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Note: avoid glob re-exports to prevent ambiguous symbol re-exports
// Consumers should reference items through their module paths, e.g.:
// `crate::models::Vendor` or `crate::dto::PaymentRequest`.
