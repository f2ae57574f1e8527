use dotenvy::dotenv;

use delivery_marketplace::config::DatabaseConfig;
use delivery_marketplace::constants::vendor_defaults::VENDOR_TYPES;
use delivery_marketplace::database::DatabaseService;
use delivery_marketplace::utils;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = dotenv();
    utils::logging::init_env_logger("info");

    let config = DatabaseConfig::from_env()?;
    let db = DatabaseService::new(&config).await?;

    let inserted = db.seed_vendor_types(VENDOR_TYPES).await?;
    println!(
        "seeded {} vendor types ({} already present)",
        inserted,
        (VENDOR_TYPES.len() as u64).saturating_sub(inserted)
    );

    for vendor_type in db.list_vendor_types(false).await? {
        println!(
            "  {:<18} {:<20} active={}",
            vendor_type.slug, vendor_type.name, vendor_type.is_active
        );
    }

    Ok(())
}
