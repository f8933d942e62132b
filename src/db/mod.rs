//! SQLite access: the query tool surface and demo database seeding.

pub mod example;
pub mod executor;

pub use example::create_example_database;
pub use executor::{execute_sql, execute_sql_for_viz, list_tables};
