//! Application router configuration.

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, Error, endpoints,
    sales::handlers::{
        get_bar_chart, get_combined_data, get_pie_chart, get_statistics, get_transactions,
    },
    seed::initialize_sales,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::INITIALIZE, get(initialize_sales))
        .route(endpoints::TRANSACTIONS, get(get_transactions))
        .route(endpoints::STATISTICS, get(get_statistics))
        .route(endpoints::BAR_CHART, get(get_bar_chart))
        .route(endpoints::PIE_CHART, get(get_pie_chart))
        .route(endpoints::COMBINED_DATA, get(get_combined_data))
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{AppState, PaginationConfig, endpoints, sales::StatisticsSummary};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            PaginationConfig::default(),
            "http://127.0.0.1:9/feed.json",
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn unknown_route_returns_not_found() {
        let server = get_test_server();

        let response = server.get("/api/does-not-exist").await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({"error": "not found"}));
    }

    #[tokio::test]
    async fn empty_database_returns_empty_statistics() {
        let server = get_test_server();

        let response = server
            .get(endpoints::STATISTICS)
            .add_query_param("month", 3)
            .add_query_param("year", 2022)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<StatisticsSummary>(),
            StatisticsSummary::default()
        );
    }

    #[tokio::test]
    async fn empty_database_returns_zero_filled_histogram() {
        let server = get_test_server();

        let response = server
            .get(endpoints::BAR_CHART)
            .add_query_param("month", 3)
            .add_query_param("year", 2022)
            .await;

        response.assert_status_ok();
        let buckets = response.json::<Vec<serde_json::Value>>();
        assert_eq!(buckets.len(), 10);
        assert!(buckets.iter().all(|bucket| bucket["count"] == 0));
    }

    #[tokio::test]
    async fn cors_headers_are_set() {
        let server = get_test_server();

        let response = server
            .get(endpoints::PIE_CHART)
            .add_query_param("month", 3)
            .add_header("origin", "http://localhost:3000")
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }
}
