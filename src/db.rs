/*! This module defines the traits for mapping the app's models to the SQLite database. */

use rusqlite::{Connection, Row, Transaction as SqlTransaction};

use crate::{Error, stores::SQLiteSaleStore};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create the table (and its indexes) for the model if they do not exist.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    /// The type the row is converted into.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains the selected columns in the
    /// order the implementer documents.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if
    /// an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, reading columns starting at `offset`.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if
    /// an invalid column index was used.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Create the tables for the app's models and register the SQL functions
/// their queries use.
///
/// Safe to call on a database that has already been initialized, and must be
/// called once on every new connection.
///
/// # Errors
/// Returns an [Error::StoreUnavailable] if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    SQLiteSaleStore::register_functions(connection)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    SQLiteSaleStore::create_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
