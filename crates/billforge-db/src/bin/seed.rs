//! # Seed Data Generator
//!
//! Populates the database with sample products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p billforge-db --bin seed
//!
//! # Specify database path
//! cargo run -p billforge-db --bin seed -- --db ./data/billforge.db
//! ```
//!
//! Repository-level tracing is enabled; control verbosity with
//! `RUST_LOG` (e.g. `RUST_LOG=debug`).

use std::env;

use billforge_core::types::{NewProduct, ProductKey};
use billforge_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// Sample catalog: (name, weight, quantity, cost ₹, selling ₹).
const SAMPLE_PRODUCTS: &[(&str, Option<&str>, i64, i64, i64)] = &[
    ("Rice", Some("5kg"), 10, 400, 500),
    ("Rice", Some("1kg"), 40, 85, 110),
    ("Atta", Some("10kg"), 15, 380, 450),
    ("Sugar", Some("1kg"), 60, 38, 45),
    ("Cooking Oil", Some("1L"), 25, 130, 160),
    ("Tea", Some("250g"), 30, 110, 140),
    ("Salt", Some("1kg"), 80, 18, 25),
    ("Dal Chana", Some("1kg"), 35, 140, 170),
    ("Ghee", Some("500ml"), 12, 450, 550),
    ("Biscuits", None, 100, 20, 30),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./billforge_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("billforge Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./billforge_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("billforge Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding products...");

    let catalog = db.catalog();
    let mut seeded = 0;

    for &(name, weight, quantity, cost_rupees, selling_rupees) in SAMPLE_PRODUCTS {
        let new = NewProduct {
            key: ProductKey::new(name, weight),
            quantity,
            cost_price_cents: cost_rupees * 100,
            selling_price_cents: selling_rupees * 100,
        };

        match catalog.create(&new).await {
            Ok(product) => {
                println!("  + {} (stock {})", product.full_name, product.quantity);
                seeded += 1;
            }
            Err(e) => eprintln!("  ! failed to seed {}: {}", new.key.full_name(), e),
        }
    }

    println!();
    println!("✓ Seeded {} products", seeded);

    Ok(())
}
