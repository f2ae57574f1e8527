use clap::Parser;
use dotenvy::dotenv;

use delivery_marketplace::config::DatabaseConfig;
use delivery_marketplace::constants::UserRole;
use delivery_marketplace::database::DatabaseService;
use delivery_marketplace::dto::SortOrder;
use delivery_marketplace::utils;

#[derive(Parser)]
#[command(name = "check_users")]
#[command(about = "Print user counts per role and list users of one role.")]
struct Args {
    /// Role to list (customer, vendor, driver, admin)
    #[arg(short, long, default_value = "driver", value_parser = parse_role)]
    role: UserRole,
    #[arg(short, long, default_value_t = 20)]
    limit: i64,
}

fn parse_role(value: &str) -> Result<UserRole, String> {
    UserRole::ALL
        .iter()
        .copied()
        .find(|role| role.as_str() == value)
        .ok_or_else(|| format!("unknown role '{}'", value))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = dotenv();
    utils::logging::init_env_logger("warn");
    let args = Args::parse();

    let config = DatabaseConfig::from_env()?;
    let db = DatabaseService::new(&config).await?;

    println!("users per role:");
    for entry in db.user_counts_by_role().await? {
        println!("  {:<9} {}", entry.role.as_str(), entry.count);
    }

    let users = db
        .users_by_role(Some(args.role), None, SortOrder::Desc, args.limit.max(1), 0)
        .await?;
    if users.is_empty() {
        println!("no users with role '{}'", args.role.as_str());
        return Ok(());
    }

    println!("{} users:", args.role.as_str());
    for user in users {
        println!(
            "  {}  {:<24} {:<32} active={}",
            user.id,
            utils::truncate_string(&user.name, 24),
            utils::mask_sensitive(&user.email),
            user.is_active
        );
    }

    Ok(())
}
