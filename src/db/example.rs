//! Demo database seeding.
//!
//! Builds the sample customers/products/orders dataset used by the CLI when
//! the target database file does not exist yet.

use std::path::Path;

use chrono::{Duration, Utc};
use rand::Rng;
use rusqlite::{params, Connection};

use crate::types::Result;

/// Create the example database with sample data.
///
/// Three tables: `customers` (8 rows), `products` (10 rows), and `orders`
/// (50 rows with randomized quantities and order dates over the trailing 90
/// days).
pub fn create_example_database(db_path: &Path) -> Result<()> {
    let conn = Connection::open(db_path)?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS customers (
            customer_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            city TEXT,
            country TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE IF NOT EXISTS products (
            product_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT,
            price REAL NOT NULL,
            stock INTEGER DEFAULT 0
        );
        CREATE TABLE IF NOT EXISTS orders (
            order_id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER,
            product_id INTEGER,
            quantity INTEGER NOT NULL,
            total_amount REAL NOT NULL,
            order_date TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (customer_id) REFERENCES customers (customer_id),
            FOREIGN KEY (product_id) REFERENCES products (product_id)
        );",
    )?;

    let customers: [(&str, &str, &str, &str); 8] = [
        ("Alice Johnson", "alice@example.com", "New York", "USA"),
        ("Bob Smith", "bob@example.com", "London", "UK"),
        ("Charlie Brown", "charlie@example.com", "Toronto", "Canada"),
        ("Diana Prince", "diana@example.com", "Paris", "France"),
        ("Eve Wilson", "eve@example.com", "Sydney", "Australia"),
        ("Frank Miller", "frank@example.com", "Berlin", "Germany"),
        ("Grace Lee", "grace@example.com", "Tokyo", "Japan"),
        ("Henry Davis", "henry@example.com", "Mumbai", "India"),
    ];
    for (name, email, city, country) in customers {
        conn.execute(
            "INSERT INTO customers (name, email, city, country) VALUES (?1, ?2, ?3, ?4)",
            params![name, email, city, country],
        )?;
    }

    let products: [(&str, &str, f64, i64); 10] = [
        ("Laptop", "Electronics", 999.99, 50),
        ("Smartphone", "Electronics", 699.99, 100),
        ("Headphones", "Electronics", 149.99, 200),
        ("Desk Chair", "Furniture", 299.99, 30),
        ("Standing Desk", "Furniture", 599.99, 20),
        ("Coffee Maker", "Appliances", 89.99, 75),
        ("Blender", "Appliances", 59.99, 60),
        ("Book - Python Programming", "Books", 39.99, 150),
        ("Book - Data Science", "Books", 44.99, 120),
        ("Wireless Mouse", "Electronics", 29.99, 300),
    ];
    for (name, category, price, stock) in products {
        conn.execute(
            "INSERT INTO products (name, category, price, stock) VALUES (?1, ?2, ?3, ?4)",
            params![name, category, price, stock],
        )?;
    }

    let mut rng = rand::thread_rng();
    let base_date = Utc::now() - Duration::days(90);

    for _ in 0..50 {
        let customer_id: i64 = rng.gen_range(1..=8);
        let product_id: i64 = rng.gen_range(1..=10);
        let quantity: i64 = rng.gen_range(1..=5);

        let price: f64 = conn.query_row(
            "SELECT price FROM products WHERE product_id = ?1",
            [product_id],
            |row| row.get(0),
        )?;
        let total_amount = price * quantity as f64;

        let order_date = (base_date + Duration::days(rng.gen_range(0..=90)))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        conn.execute(
            "INSERT INTO orders (customer_id, product_id, quantity, total_amount, order_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![customer_id, product_id, quantity, total_amount, order_date],
        )?;
    }

    tracing::info!(db = %db_path.display(), "created example database");
    Ok(())
}
