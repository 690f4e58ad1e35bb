//! Seeds the sale store from the third-party JSON feed.

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, SQLiteSaleStore,
    sales::NewSale,
    stores::ImportSales,
};

/// The state needed for seeding the database.
#[derive(Debug, Clone)]
pub struct SeedState {
    /// The store to insert the sales into.
    pub sale_store: SQLiteSaleStore,
    /// Where to download the feed from.
    pub feed_url: String,
    /// The client to download the feed with.
    pub http_client: reqwest::Client,
}

impl FromRef<AppState> for SeedState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            sale_store: state.sale_store.clone(),
            feed_url: state.feed_url.clone(),
            http_client: state.http_client.clone(),
        }
    }
}

/// The response to a successful seed.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SeedResponse {
    /// A human readable status message.
    pub message: String,
    /// How many sales were inserted.
    pub inserted: usize,
}

/// Download the seed feed and insert every valid sale into the store.
///
/// Every call appends: seeding twice stores each sale twice.
pub async fn initialize_sales(
    State(state): State<SeedState>,
) -> Result<Json<SeedResponse>, Error> {
    let sales = fetch_feed(&state.http_client, &state.feed_url)
        .await
        .inspect_err(|error| {
            tracing::error!("could not fetch feed {}: {error}", state.feed_url);
        })?;

    let sale_store = state.sale_store.clone();
    let inserted = tokio::task::spawn_blocking(move || sale_store.import(sales)).await??;
    tracing::info!("Inserted {inserted} sales from {}", state.feed_url);

    Ok(Json(SeedResponse {
        message: "Database initialized successfully!".to_owned(),
        inserted,
    }))
}

/// Download the feed at `url` and parse it with [parse_feed].
///
/// # Errors
/// Returns [Error::FeedUnavailable] if the request fails or the server
/// responds with an error status, or [Error::InvalidFeed] if the body is not
/// a list of sales.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<Vec<NewSale>, Error> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    parse_feed(&body)
}

/// Parse a JSON list of sales, dropping any sale with a negative or
/// non-finite price.
///
/// # Errors
/// Returns [Error::InvalidFeed] if `text` is not a JSON list of sales.
pub fn parse_feed(text: &str) -> Result<Vec<NewSale>, Error> {
    let sales: Vec<NewSale> =
        serde_json::from_str(text).map_err(|error| Error::InvalidFeed(error.to_string()))?;
    let total = sales.len();

    let valid_sales: Vec<NewSale> = sales
        .into_iter()
        .filter(|sale| sale.price.is_finite() && sale.price >= 0.0)
        .collect();

    if valid_sales.len() < total {
        tracing::warn!(
            "Skipped {} of {total} sales with an invalid price",
            total - valid_sales.len()
        );
    }

    Ok(valid_sales)
}
