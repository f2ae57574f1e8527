use clap::Parser;
use dotenvy::dotenv;
use uuid::Uuid;

use delivery_marketplace::config::DatabaseConfig;
use delivery_marketplace::database::DatabaseService;
use delivery_marketplace::utils;

#[derive(Parser)]
#[command(name = "test_driver_orders")]
#[command(about = "Look up the orders assigned to a driver.")]
struct Args {
    /// Driver to inspect; the first registered driver when omitted
    #[arg(short, long)]
    driver_id: Option<Uuid>,
    #[arg(short, long, default_value_t = 20)]
    limit: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = dotenv();
    utils::logging::init_env_logger("warn");
    let args = Args::parse();

    let config = DatabaseConfig::from_env()?;
    let db = DatabaseService::new(&config).await?;

    let driver = match args.driver_id {
        Some(id) => db.get_driver(&id).await?,
        None => db.first_driver().await?,
    };
    let driver = match driver {
        Some(d) => d,
        None => {
            println!("no driver found");
            return Ok(());
        }
    };

    println!(
        "driver {} (user {}) vehicle={} available={}",
        driver.id, driver.user_id, driver.vehicle_type, driver.is_available
    );

    let total = db.count_orders_by_driver(&driver.id).await?;
    let orders = db.orders_by_driver(&driver.id, args.limit.max(1), 0).await?;
    println!("orders assigned: {} (showing {})", total, orders.len());
    for order in orders {
        println!(
            "  {}  {:<16} {:>10.2}  {}",
            order.order_number,
            order.status.as_str(),
            order.total_amount,
            order.created_at.to_rfc3339()
        );
    }

    Ok(())
}
