//! # Seed Data Generator
//!
//! Populates the ledger database with a realistic atelier material catalog
//! for development, plus a sample goods receipt and a draft count.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p atelier-db --bin seed
//!
//! # Limit the number of materials
//! cargo run -p atelier-db --bin seed -- --count 30
//!
//! # Specify database path
//! cargo run -p atelier-db --bin seed -- --db ./data/ledger.db
//! ```
//!
//! ## Generated Data
//! - Materials across fabric / trim / packaging, each with a unit, a unit
//!   cost, an opening on-hand and a reorder threshold
//! - One entry movement (a supplier goods receipt with three lines)
//! - One draft inventory count over the first few materials

use chrono::Utc;
use std::env;
use tracing::warn;

use atelier_core::{
    Material, MaterialKind, MaterialRef, Money, NewInventoryCount, NewInventoryLine, NewMovement,
    NewMovementLine, MovementDirection, Quantity,
};
use atelier_db::repository::material::generate_material_id;
use atelier_db::{Database, DbConfig};

/// Material catalog: (kind, name, unit, unit cost cents, on-hand units,
/// threshold units, storage location).
const CATALOG: &[(MaterialKind, &str, &str, i64, i64, i64, &str)] = &[
    (MaterialKind::Fabric, "Denim 12oz indigo", "m", 1450, 80, 20, "Rack A1"),
    (MaterialKind::Fabric, "Denim 10oz black", "m", 1320, 45, 20, "Rack A1"),
    (MaterialKind::Fabric, "Cotton poplin white", "m", 620, 120, 30, "Rack A2"),
    (MaterialKind::Fabric, "Cotton poplin navy", "m", 640, 95, 30, "Rack A2"),
    (MaterialKind::Fabric, "Linen natural", "m", 1780, 35, 15, "Rack A3"),
    (MaterialKind::Fabric, "Wool flannel grey", "m", 2450, 22, 10, "Rack A3"),
    (MaterialKind::Fabric, "Viscose lining beige", "m", 410, 150, 40, "Rack B1"),
    (MaterialKind::Fabric, "Silk charmeuse ivory", "m", 3900, 12, 8, "Rack B1"),
    (MaterialKind::Trim, "Zipper YKK 18cm brass", "pc", 85, 400, 100, "Drawer C1"),
    (MaterialKind::Trim, "Zipper YKK 60cm nylon", "pc", 120, 180, 50, "Drawer C1"),
    (MaterialKind::Trim, "Button horn 20mm", "pc", 45, 900, 200, "Drawer C2"),
    (MaterialKind::Trim, "Button corozo 15mm", "pc", 38, 650, 200, "Drawer C2"),
    (MaterialKind::Trim, "Thread poly 5000m white", "cone", 310, 40, 12, "Drawer C3"),
    (MaterialKind::Trim, "Thread poly 5000m black", "cone", 310, 34, 12, "Drawer C3"),
    (MaterialKind::Trim, "Elastic 25mm", "m", 28, 300, 80, "Drawer C4"),
    (MaterialKind::Trim, "Interfacing fusible", "m", 190, 60, 25, "Rack B2"),
    (MaterialKind::Packaging, "Polybag 30x40", "pc", 6, 2000, 500, "Shelf D1"),
    (MaterialKind::Packaging, "Hang tag kraft", "pc", 12, 1500, 400, "Shelf D1"),
    (MaterialKind::Packaging, "Shipping box M", "pc", 95, 120, 40, "Shelf D2"),
    (MaterialKind::Other, "Pattern paper roll", "roll", 850, 6, 2, "Shelf D3"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = CATALOG.len();
    let mut db_path = String::from("./atelier_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(CATALOG.len());
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Atelier Ledger Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of materials to generate (default: all)");
                println!("  -d, --db <PATH>    Database file path (default: ./atelier_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Atelier Ledger Seed Data Generator");
    println!("=====================================");
    println!("Database:  {}", db_path);
    println!("Materials: {}", count.min(CATALOG.len()));
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");
    println!("  Location mode: {:?}", db.location_mode());

    // Check existing materials
    let existing = db.materials().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} materials", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Seed the material registry
    println!();
    println!("Seeding materials...");

    let mut ids: Vec<(String, String, String)> = Vec::new();
    let now = Utc::now();

    for (kind, name, unit, cost, on_hand, threshold, location) in
        CATALOG.iter().take(count)
    {
        let material = Material {
            id: generate_material_id(),
            name: name.to_string(),
            kind: *kind,
            code: None,
            unit: unit.to_string(),
            unit_cost: Money::from_cents(*cost),
            on_hand: Quantity::from_units(*on_hand),
            reorder_threshold: Quantity::from_units(*threshold),
            storage_location: Some(location.to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = db.materials().insert(&material).await {
            warn!(name = %material.name, error = %e, "Failed to insert material");
            continue;
        }

        ids.push((material.id, material.name, material.unit));
    }

    println!("✓ Seeded {} materials", ids.len());

    // A sample goods receipt in the movement journal
    if ids.len() >= 3 {
        let lines = ids
            .iter()
            .take(3)
            .map(|(id, name, unit)| NewMovementLine {
                material: MaterialRef::known(id.clone(), name.clone()),
                quantity: Quantity::from_units(10),
                unit: unit.clone(),
                unit_cost: Money::from_cents(1000),
                storage_location: None,
            })
            .collect();

        let movement = db
            .movements()
            .record(NewMovement {
                direction: MovementDirection::Entry,
                source: Some("Supplier: Millbrook Textiles".to_string()),
                document: Some("DN-4471".to_string()),
                effective_date: now.date_naive(),
                notes: Some("Opening goods receipt (seed)".to_string()),
                lines,
            })
            .await?;

        println!("✓ Recorded sample entry movement {}", movement.id);
    }

    // A draft inventory count over the first few materials
    if ids.len() >= 2 {
        let lines = ids
            .iter()
            .take(2)
            .map(|(id, name, unit)| NewInventoryLine {
                material: MaterialRef::known(id.clone(), name.clone()),
                unit: unit.clone(),
                counted_qty: Quantity::from_units(9),
            })
            .collect();

        let draft = db
            .inventory_counts()
            .create_draft(NewInventoryCount {
                count_date: now.date_naive(),
                notes: Some("Seed draft count".to_string()),
                lines,
            })
            .await?;

        println!("✓ Created draft inventory count {}", draft.number);
    }

    // Show what the low-stock report says about the seeded registry
    let low = db.reconciliation().low_stock().await?;
    println!();
    println!("Low-stock materials: {}", low.len());
    for material in &low {
        println!(
            "  {} — {} {} (threshold {})",
            material.name, material.on_hand, material.unit, material.reorder_threshold
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
