//! Defines the traits for interacting with the application's database and
//! the startup initialization routine.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{Error, stores::sqlite::SQLiteTransactionStore, transaction::TransactionType};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create the table for the model if it does not already exist.
    ///
    /// Implementations must never drop or modify existing data.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    /// The type that the row is mapped to.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the
    /// table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the
    /// corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, with the first column starting at
    /// `offset`.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the
    /// corresponding rust type, or if an invalid column index was used.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Create the tables for the domain models in the database held by `connection`,
/// and seed an empty transaction table with sample data.
///
/// Both steps are idempotent: existing tables and rows are left untouched, so
/// restarting the server against a populated database inserts nothing.
///
/// # Errors
/// Returns an error if the tables could not be created or the sample data
/// could not be inserted.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    SQLiteTransactionStore::create_table(connection)?;
    seed_sample_data(connection)?;

    Ok(())
}

/// Insert a small set of illustrative transactions, but only into an empty
/// table.
fn seed_sample_data(connection: &Connection) -> Result<(), Error> {
    let count: i64 =
        connection.query_row("SELECT COUNT(id) FROM \"transaction\"", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(());
    }

    tracing::info!("transaction table is empty, inserting sample data");

    let sample_data = [
        (1000.0, "Monthly Salary", "Salary", TransactionType::Income),
        (50.0, "Groceries", "Food", TransactionType::Expense),
        (30.0, "Uber ride", "Transport", TransactionType::Expense),
        (200.0, "Freelance work", "Other", TransactionType::Income),
    ];

    let now = OffsetDateTime::now_utc();
    let mut statement = connection.prepare(
        "INSERT INTO \"transaction\" (amount, description, category, type, date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;

    for (amount, description, category, transaction_type) in sample_data {
        statement.execute((amount, description, category, transaction_type, now))?;
    }

    Ok(())
}
