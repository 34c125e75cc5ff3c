//! # Seed Data Generator
//!
//! Populates the database with a demo menu and restaurant settings.
//!
//! ## Usage
//! ```bash
//! # Seed ./tavola_dev.db with a 0.30 packaging fee
//! cargo run -p tavola-db --bin seed
//!
//! # Custom database and fee
//! cargo run -p tavola-db --bin seed -- --db ./data/tavola.db --box-fee 0.5
//! ```
//!
//! ## Generated Menu
//! - Pizzas with a size option (override) and toppings (add)
//! - Pasta dishes, one on promotion
//! - Drinks exempt from the packaging fee

use chrono::Utc;
use std::env;
use tavola_core::{Amount, OptionChoice, PricingMode, Product, ProductOption, RestaurantSettings};
use tavola_db::repository::product::generate_product_id;
use tavola_db::repository::settings::generate_settings_id;
use tavola_db::{Database, DbConfig};

/// (sku, name, price)
const PIZZAS: &[(&str, &str, f64)] = &[
    ("PIZ-MARG", "Margherita", 8.5),
    ("PIZ-DIAV", "Diavola", 9.5),
    ("PIZ-4FOR", "Quattro Formaggi", 10.0),
    ("PIZ-CAPR", "Capricciosa", 10.5),
];

/// (sku, name, price, promotion price)
const PASTA: &[(&str, &str, f64, Option<f64>)] = &[
    ("PAS-CARB", "Spaghetti Carbonara", 11.0, None),
    ("PAS-AMAT", "Bucatini Amatriciana", 10.5, Some(8.0)),
    ("PAS-PEST", "Trofie al Pesto", 9.5, None),
];

/// (sku, name, price)
const DRINKS: &[(&str, &str, f64)] = &[
    ("DRK-WATR", "Still Water 50cl", 1.5),
    ("DRK-COLA", "Cola 33cl", 2.5),
    ("DRK-BEER", "Lager 33cl", 3.5),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./tavola_dev.db");
    let mut box_fee: f64 = 0.3;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--box-fee" | "-f" => {
                if i + 1 < args.len() {
                    box_fee = args[i + 1].parse().unwrap_or(0.3);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tavola Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./tavola_dev.db)");
                println!("  -f, --box-fee <AMOUNT> Packaging fee per unit (default: 0.3)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tavola Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Box fee:  {}", Amount::new(box_fee));
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let now = Utc::now();
    db.settings()
        .insert(&RestaurantSettings {
            id: generate_settings_id(),
            name: "Tavola Demo".to_string(),
            box_fee: Some(Amount::new(box_fee)),
            is_active: true,
            is_primary: true,
            created_at: now,
            updated_at: now,
        })
        .await?;
    println!("✓ Restaurant settings created");

    let mut generated = 0;
    for product in menu() {
        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.sku, e);
            continue;
        }
        println!("  {:<10} {:<24} {}", product.sku, product.name, product.base_price());
        generated += 1;
    }

    println!();
    println!("✓ Seeded {} products", generated);

    Ok(())
}

/// Builds the demo menu.
fn menu() -> Vec<Product> {
    let pizzas = PIZZAS.iter().map(|(sku, name, price)| Product {
        options: vec![
            ProductOption {
                name: "size".to_string(),
                pricing_mode: PricingMode::Override,
                choices: vec![
                    choice("S", price - 1.5),
                    choice("M", *price),
                    choice("L", price + 3.0),
                ],
            },
            ProductOption {
                name: "topping".to_string(),
                pricing_mode: PricingMode::Add,
                choices: vec![
                    choice("mozzarella", 1.5),
                    choice("prosciutto", 2.0),
                    choice("funghi", 1.0),
                ],
            },
        ],
        ..product(sku, name, *price)
    });

    let pasta = PASTA.iter().map(|(sku, name, price, promo)| Product {
        is_promotion: promo.is_some(),
        promotion_price: promo.map(Amount::new),
        ..product(sku, name, *price)
    });

    let drinks = DRINKS.iter().map(|(sku, name, price)| Product {
        disable_box_fee: true,
        ..product(sku, name, *price)
    });

    pizzas.chain(pasta).chain(drinks).collect()
}

fn product(sku: &str, name: &str, price: f64) -> Product {
    Product {
        id: generate_product_id(),
        sku: sku.to_string(),
        name: name.to_string(),
        price: Amount::new(price),
        is_promotion: false,
        promotion_price: None,
        disable_box_fee: false,
        options: Vec::new(),
    }
}

fn choice(code: &str, price: f64) -> OptionChoice {
    OptionChoice {
        code: code.to_string(),
        price: Amount::new(price),
    }
}
