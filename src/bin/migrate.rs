use dotenvy::dotenv;
use glob::glob;
use std::fs;
use tokio_postgres::NoTls;

/// `migrations/V12__orders.sql` -> 12
fn migration_version(file: &str) -> u64 {
    std::path::Path::new(file)
        .file_name()
        .and_then(|s| s.to_str())
        .and_then(|name| name.strip_prefix('V'))
        .and_then(|rest| rest.split("__").next())
        .and_then(|v| v.parse().ok())
        .unwrap_or(u64::MAX)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = dotenv();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL must be set in environment")?;
    let pattern = format!(
        "{}/V*.sql",
        std::env::var("MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string())
    );

    // Connect using tokio-postgres's simple connection string format
    let (mut client, connection) = tokio_postgres::connect(&database_url, NoTls).await?;

    // Spawn the connection handling task
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("connection error: {}", e);
        }
    });

    // Ensure schema_migrations table exists
    client.execute(
        "\
        CREATE TABLE IF NOT EXISTS schema_migrations (\
            version VARCHAR(50) PRIMARY KEY,\
            description TEXT,\
            installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()\
        )",
        &[],
    ).await?;

    // Find migration files V*.sql in migrations/
    let mut migrations: Vec<String> = Vec::new();
    for path in glob(&pattern)?.flatten() {
        migrations.push(path.to_string_lossy().to_string());
    }

    // Flyway-style names: order by the numeric version, not the string
    migrations.sort_by_key(|file| (migration_version(file), file.clone()));

    if migrations.is_empty() {
        println!("No migration files match {}", pattern);
        return Ok(());
    }

    for file in migrations {
        let name = std::path::Path::new(&file)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(&file)
            .to_string();

        // Check if applied
        let row = client
            .query_opt("SELECT version FROM schema_migrations WHERE version = $1", &[&name])
            .await?;

        if row.is_some() {
            println!("Skipping already-applied migration: {}", name);
            continue;
        }

        println!("Applying migration: {}", name);
        let sql = fs::read_to_string(&file)?;

        // Execute the SQL in a single transaction
        let txn = client.transaction().await?;
        txn.batch_execute(&sql).await?;
        txn.execute(
            "INSERT INTO schema_migrations (version, description) VALUES ($1, $2)",
            &[&name, &name],
        ).await?;
        txn.commit().await?;

        println!("Applied: {}", name);
    }

    println!("Migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::migration_version;

    #[test]
    fn orders_versions_numerically() {
        assert_eq!(migration_version("migrations/V1__initial_schema.sql"), 1);
        assert_eq!(migration_version("migrations/V12__orders.sql"), 12);
        assert_eq!(migration_version("migrations/notes.sql"), u64::MAX);
    }
}
