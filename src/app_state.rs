//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize, pagination::PaginationConfig, stores::SQLiteSaleStore};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The store holding the sale records.
    pub sale_store: SQLiteSaleStore,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// The URL of the JSON feed the database is seeded from.
    pub feed_url: String,

    /// The client used to download the seed feed.
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        pagination_config: PaginationConfig,
        feed_url: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            sale_store: SQLiteSaleStore::new(connection),
            pagination_config,
            feed_url: feed_url.to_owned(),
            http_client: reqwest::Client::new(),
        })
    }
}
