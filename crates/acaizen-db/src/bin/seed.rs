//! # Sample Catalog Seeder
//!
//! Populates a database with the starter catalog, the default store
//! configuration and the default admin account.
//!
//! ## Usage
//! ```bash
//! cargo run -p acaizen-db --bin seed
//!
//! # Specify database path
//! cargo run -p acaizen-db --bin seed -- --db ./data/acaizen.db
//! ```

use acaizen_db::seed::seed_sample_catalog;
use acaizen_db::{Database, DbConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Açaízen POS sample data seeder
#[derive(Debug, Parser)]
#[command(name = "seed", version)]
struct Args {
    /// Database file path
    #[arg(short, long, default_value = "./acaizen_dev.db")]
    db: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    println!("🌱 Açaízen POS Seed");
    println!("===================");
    println!("Database: {}", args.db);
    println!();

    let db = Database::new(DbConfig::new(&args.db)).await?;
    println!("✓ Connected to database, migrations applied");

    let config = db.store_config().get_or_init().await?;
    println!("✓ Store: {}", config.store_name);

    if db.users().ensure_default_admin().await? {
        println!("✓ Default admin account created");
    }

    match seed_sample_catalog(&db).await? {
        Some(summary) => println!(
            "✓ Created {} categories, {} products, {} addons",
            summary.categories, summary.products, summary.addons
        ),
        None => {
            println!("⚠ Catalog already has data, skipping sample products.");
            println!("  Delete the database file to regenerate.");
        }
    }

    db.close().await;
    println!();
    println!("✓ Seed complete!");
    Ok(())
}
