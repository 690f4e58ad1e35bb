//! Defines the app level error type and its conversion to JSON error responses.

use std::fmt::Display;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The sub-queries that make up a combined month query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubQuery {
    /// The paginated transaction list.
    Transactions,
    /// The sale totals and sold/unsold counts.
    Statistics,
    /// The price-bucket histogram.
    Histogram,
    /// The per-category counts.
    Categories,
}

impl Display for SubQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SubQuery::Transactions => "transactions",
            SubQuery::Statistics => "statistics",
            SubQuery::Histogram => "bar chart",
            SubQuery::Categories => "pie chart",
        };

        write!(f, "{name}")
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The caller asked for a month, year or page size that does not exist.
    ///
    /// This is a caller error and should not be retried with the same input.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// The record store could not be reached or failed while running a query.
    ///
    /// The string holds the underlying error and should only be logged on the
    /// server. No retry is attempted.
    #[error("the sale store is unavailable: {0}")]
    StoreUnavailable(String),

    /// One of the sub-queries of a combined query failed.
    #[error("the {query} query failed: {source}")]
    SubQueryFailed {
        /// The sub-query that failed.
        query: SubQuery,
        /// Why it failed.
        source: Box<Error>,
    },

    /// The seed feed could not be downloaded.
    #[error("could not fetch the seed feed: {0}")]
    FeedUnavailable(String),

    /// The seed feed was downloaded but is not a list of sale records.
    #[error("the seed feed is invalid: {0}")]
    InvalidFeed(String),

    /// A blocking store task panicked or was cancelled before it finished.
    #[error("a background task failed: {0}")]
    TaskFailed(String),

    /// The requested resource was not found.
    #[error("not found")]
    NotFound,
}

impl Error {
    /// Tag the error with the sub-query of a combined query that produced it.
    pub fn in_sub_query(self, query: SubQuery) -> Self {
        Error::SubQueryFailed {
            query,
            source: Box::new(self),
        }
    }

    /// The HTTP status code the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidSelector(_) => StatusCode::BAD_REQUEST,
            Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::SubQueryFailed { source, .. } => source.status_code(),
            Error::FeedUnavailable(_) | Error::InvalidFeed(_) => StatusCode::BAD_GATEWAY,
            Error::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// The message that is safe to show to the client.
    ///
    /// Store errors can contain SQL, so their details stay in the server logs.
    fn client_message(&self) -> String {
        match self {
            Error::StoreUnavailable(_) => {
                "the sale store is unavailable, check the server logs for more details".to_owned()
            }
            Error::TaskFailed(_) => {
                "an internal error occurred, check the server logs for more details".to_owned()
            }
            Error::SubQueryFailed { query, source } => {
                format!("the {query} query failed: {}", source.client_message())
            }
            error => error.to_string(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::StoreUnavailable(value.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        tracing::error!("a blocking task did not finish: {}", value);
        Error::TaskFailed(value.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Error::InvalidFeed(value.to_string())
        } else {
            Error::FeedUnavailable(value.to_string())
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        (status_code, Json(json!({ "error": self.client_message() }))).into_response()
    }
}
