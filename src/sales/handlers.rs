//! JSON route handlers for the month-scoped sale queries.

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error, PaginationConfig, SQLiteSaleStore,
    sales::{
        CategoryCount, CombinedResult, HistogramBucket, MonthSelector, StatisticsSummary,
        TransactionPage, compute_category_breakdown, compute_combined, compute_histogram,
        compute_statistics, filter_by_month, list_transactions, run_blocking,
    },
};

/// The state needed by the sale query handlers.
#[derive(Debug, Clone)]
pub struct SalesState {
    /// The store to query.
    pub sale_store: SQLiteSaleStore,
    /// The default page and page size.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for SalesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            sale_store: state.sale_store.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters that select a month.
#[derive(Debug, Deserialize)]
pub struct MonthParams {
    /// The month, 1 to 12. Required.
    pub month: Option<u8>,
    /// The year. Defaults to the current year (UTC).
    pub year: Option<i32>,
}

/// The query parameters for a page of transactions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
    /// The month, 1 to 12. Required.
    pub month: Option<u8>,
    /// The year. Defaults to the current year (UTC).
    pub year: Option<i32>,
    /// The page number, starting at 1.
    pub page: Option<i64>,
    /// The maximum number of transactions per page.
    pub per_page: Option<u64>,
    /// Text to search titles, descriptions and prices for.
    pub search: Option<String>,
}

/// Get a page of the selected month's transactions.
pub async fn get_transactions(
    State(state): State<SalesState>,
    params: Result<Query<TransactionParams>, QueryRejection>,
) -> Result<Json<TransactionPage>, Error> {
    let Query(params) = params.map_err(invalid_query)?;
    let date_range = filter_by_month(month_selector(params.month, params.year)?)?;
    let page = params.page.unwrap_or(state.pagination_config.default_page);
    let page_size = params
        .per_page
        .unwrap_or(state.pagination_config.default_page_size);
    let search = params.search;

    run_blocking(&state.sale_store, move |store| {
        list_transactions(store, date_range, search.as_deref(), page, page_size)
    })
    .await
    .map(Json)
}

/// Get the total sale amount and sold/unsold counts for the selected month.
pub async fn get_statistics(
    State(state): State<SalesState>,
    params: Result<Query<MonthParams>, QueryRejection>,
) -> Result<Json<StatisticsSummary>, Error> {
    let Query(params) = params.map_err(invalid_query)?;
    let date_range = filter_by_month(month_selector(params.month, params.year)?)?;

    run_blocking(&state.sale_store, move |store| {
        compute_statistics(store, date_range)
    })
    .await
    .map(Json)
}

/// Get the price histogram for the selected month.
pub async fn get_bar_chart(
    State(state): State<SalesState>,
    params: Result<Query<MonthParams>, QueryRejection>,
) -> Result<Json<Vec<HistogramBucket>>, Error> {
    let Query(params) = params.map_err(invalid_query)?;
    let date_range = filter_by_month(month_selector(params.month, params.year)?)?;

    run_blocking(&state.sale_store, move |store| {
        compute_histogram(store, date_range)
    })
    .await
    .map(Json)
}

/// Get the per-category counts for the selected month.
pub async fn get_pie_chart(
    State(state): State<SalesState>,
    params: Result<Query<MonthParams>, QueryRejection>,
) -> Result<Json<Vec<CategoryCount>>, Error> {
    let Query(params) = params.map_err(invalid_query)?;
    let date_range = filter_by_month(month_selector(params.month, params.year)?)?;

    run_blocking(&state.sale_store, move |store| {
        compute_category_breakdown(store, date_range)
    })
    .await
    .map(Json)
}

/// Get the transactions, statistics, bar chart and pie chart for the
/// selected month in one response.
///
/// Accepts `page` and `perPage` like [get_transactions], but not `search`.
pub async fn get_combined_data(
    State(state): State<SalesState>,
    params: Result<Query<TransactionParams>, QueryRejection>,
) -> Result<Json<CombinedResult>, Error> {
    let Query(params) = params.map_err(invalid_query)?;
    let selector = month_selector(params.month, params.year)?;

    compute_combined(
        &state.sale_store,
        selector,
        params.page.unwrap_or(state.pagination_config.default_page),
        params
            .per_page
            .unwrap_or(state.pagination_config.default_page_size),
    )
    .await
    .map(Json)
}

/// Build the selector, reading the current year only when `year` is missing.
fn month_selector(month: Option<u8>, year: Option<i32>) -> Result<MonthSelector, Error> {
    let month = month.ok_or_else(|| {
        Error::InvalidSelector("the query parameter `month` is required".to_owned())
    })?;
    let year = year.unwrap_or_else(|| OffsetDateTime::now_utc().year());

    Ok(MonthSelector::new(year, month))
}

fn invalid_query(rejection: QueryRejection) -> Error {
    Error::InvalidSelector(rejection.body_text())
}
