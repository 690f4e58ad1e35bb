//! A small service for a product-sale transactions dashboard.
//!
//! Sale records are seeded from a third-party JSON feed into a SQLite
//! database. The service then answers month-scoped queries over those records:
//! a paginated, searchable transaction list, summary statistics, a fixed
//! price-bucket histogram and a per-category breakdown.
//!
//! The query functions in [sales] take the record store as an explicit
//! parameter, so they work the same against [SQLiteSaleStore] and the
//! in-memory [MemorySaleStore].

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod db;
mod endpoints;
mod error;
mod logging;
mod pagination;
mod routing;
pub mod sales;
mod seed;
mod stores;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use endpoints::DEFAULT_FEED_URL;
pub use error::{Error, SubQuery};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use seed::{fetch_feed, parse_feed};
pub use stores::{
    BucketCount, ImportSales, MemorySaleStore, SQLiteSaleStore, SalePage, SaleQuery, SaleStore,
    SaleTotals,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
