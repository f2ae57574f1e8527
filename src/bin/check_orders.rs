use clap::Parser;
use dotenvy::dotenv;

use delivery_marketplace::config::DatabaseConfig;
use delivery_marketplace::database::DatabaseService;
use delivery_marketplace::utils;

#[derive(Parser)]
#[command(name = "check_orders")]
#[command(about = "Print the order count and the most recent orders.")]
struct Args {
    /// How many recent orders to list
    #[arg(short, long, default_value_t = 10)]
    limit: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = dotenv();
    utils::logging::init_env_logger("warn");
    let args = Args::parse();

    let config = DatabaseConfig::from_env()?;
    let db = DatabaseService::new(&config).await?;

    let total = db.count_orders().await?;
    println!("orders rows: {}", total);
    if total == 0 {
        return Ok(());
    }

    let orders = db.recent_orders(args.limit.max(1)).await?;
    println!("latest {} orders:", orders.len());
    for order in orders {
        let driver = order
            .driver_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let method = order.payment_method.map(|m| m.as_str()).unwrap_or("-");
        println!(
            "  {}  {:<16} {:>10.2}  {:<7} driver={}  {}",
            order.order_number,
            order.status.as_str(),
            order.total_amount,
            method,
            driver,
            order.created_at.to_rfc3339()
        );
    }

    Ok(())
}
