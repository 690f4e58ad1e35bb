//! The month-scoped sale queries.
//!
//! Every function here is a pure function of the store's contents and its
//! parameters. None of them read the clock or hold state between calls.

use serde::{Deserialize, Serialize};

use crate::{
    Error, SubQuery,
    sales::{DateRange, MonthSelector, PRICE_BUCKETS, SaleRecord, filter_by_month},
    stores::{SalePage, SaleQuery, SaleStore},
};

/// One page of the transaction list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    /// The sales on this page, ordered by ID.
    pub records: Vec<SaleRecord>,
    /// The requested page number, starting at 1.
    pub page: i64,
    /// The maximum number of sales per page.
    pub page_size: u64,
    /// The number of sales that matched, across all pages.
    pub total_count: u64,
    /// The number of pages needed to show every match.
    pub total_pages: u64,
}

/// The aggregate sale values for a month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    /// The sum of sale prices.
    pub total_sale: f64,
    /// The number of products that sold.
    pub total_sold_items: u64,
    /// The number of products that did not sell.
    pub total_not_sold_items: u64,
}

/// The number of sales in one price bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBucket {
    /// The bucket label, e.g. "101-200".
    pub price_range: &'static str,
    /// The number of sales in the bucket.
    pub count: u64,
}

/// The number of sales in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// The category name.
    pub category: String,
    /// The number of sales in the category.
    pub count: u64,
}

/// The four month queries bundled into one response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedResult {
    /// See [list_transactions].
    pub transactions_data: TransactionPage,
    /// See [compute_statistics].
    pub statistics_data: StatisticsSummary,
    /// See [compute_histogram].
    pub bar_chart_data: Vec<HistogramBucket>,
    /// See [compute_category_breakdown].
    pub pie_chart_data: Vec<CategoryCount>,
}

/// List one page of the sales in `date_range`, ordered by ID.
///
/// An empty `search` is the same as no search. A `page` below 1 or past the
/// last page gives an empty page that still reports the true totals.
///
/// # Errors
/// Returns [Error::InvalidSelector] if `page_size` is zero, or the store's
/// error if the query fails.
pub fn list_transactions(
    store: &impl SaleStore,
    date_range: DateRange,
    search: Option<&str>,
    page: i64,
    page_size: u64,
) -> Result<TransactionPage, Error> {
    check_page_size(page_size)?;

    let (limit, offset) = match u64::try_from(page) {
        Ok(page) if page >= 1 => (page_size, (page - 1).saturating_mul(page_size)),
        _ => (0, 0),
    };

    let SalePage {
        records,
        total_count,
    } = store.get_page(&SaleQuery {
        date_range,
        search: search.filter(|text| !text.is_empty()),
        limit,
        offset,
    })?;

    Ok(TransactionPage {
        records,
        page,
        page_size,
        total_count,
        total_pages: total_count.div_ceil(page_size),
    })
}

/// Sum the sale prices in `date_range` and count the sold and unsold products.
///
/// # Errors
/// Returns the store's error if the query fails.
pub fn compute_statistics(
    store: &impl SaleStore,
    date_range: DateRange,
) -> Result<StatisticsSummary, Error> {
    let totals = store.get_totals(date_range)?;

    Ok(StatisticsSummary {
        total_sale: totals.total_sale,
        total_sold_items: totals.sold_count,
        total_not_sold_items: totals.not_sold_count,
    })
}

/// Count the sales in `date_range` per price bucket.
///
/// Always returns every bucket in [PRICE_BUCKETS] order, with a count of zero
/// for buckets without sales.
///
/// # Errors
/// Returns the store's error if the query fails.
pub fn compute_histogram(
    store: &impl SaleStore,
    date_range: DateRange,
) -> Result<Vec<HistogramBucket>, Error> {
    let mut histogram: Vec<HistogramBucket> = PRICE_BUCKETS
        .iter()
        .map(|bucket| HistogramBucket {
            price_range: bucket.label,
            count: 0,
        })
        .collect();

    for bucket_count in store.count_by_price_bucket(date_range, &PRICE_BUCKETS)? {
        if let Some(entry) = histogram.get_mut(bucket_count.bucket) {
            entry.count += bucket_count.count;
        }
    }

    Ok(histogram)
}

/// Count the sales in `date_range` per category.
///
/// Only categories with at least one sale are included.
///
/// # Errors
/// Returns the store's error if the query fails.
pub fn compute_category_breakdown(
    store: &impl SaleStore,
    date_range: DateRange,
) -> Result<Vec<CategoryCount>, Error> {
    store.count_by_category(date_range)
}

/// Run all four month queries for `selector` and bundle the results.
///
/// Each query runs as its own task on tokio's blocking thread pool, so the
/// queries do not depend on each other and the async runtime is never blocked.
/// The transaction list is not filtered by a search.
///
/// # Errors
/// Returns [Error::InvalidSelector] if the selector or page size is invalid.
/// If a query fails, returns [Error::SubQueryFailed] naming the first failed
/// query in the order transactions, statistics, histogram, categories.
pub async fn compute_combined<S>(
    store: &S,
    selector: MonthSelector,
    page: i64,
    page_size: u64,
) -> Result<CombinedResult, Error>
where
    S: SaleStore + Clone + 'static,
{
    let date_range = filter_by_month(selector)?;
    check_page_size(page_size)?;

    let (transactions, statistics, histogram, categories) = tokio::join!(
        run_blocking(store, move |store| {
            list_transactions(store, date_range, None, page, page_size)
        }),
        run_blocking(store, move |store| compute_statistics(store, date_range)),
        run_blocking(store, move |store| compute_histogram(store, date_range)),
        run_blocking(store, move |store| {
            compute_category_breakdown(store, date_range)
        }),
    );

    Ok(CombinedResult {
        transactions_data: transactions.map_err(|error| error.in_sub_query(SubQuery::Transactions))?,
        statistics_data: statistics.map_err(|error| error.in_sub_query(SubQuery::Statistics))?,
        bar_chart_data: histogram.map_err(|error| error.in_sub_query(SubQuery::Histogram))?,
        pie_chart_data: categories.map_err(|error| error.in_sub_query(SubQuery::Categories))?,
    })
}

/// Run `query` against a clone of `store` on tokio's blocking thread pool.
///
/// # Errors
/// Returns the error from `query`, or [Error::TaskFailed] if the task panicked
/// or was cancelled.
pub async fn run_blocking<S, T, F>(store: &S, query: F) -> Result<T, Error>
where
    S: SaleStore + Clone + 'static,
    T: Send + 'static,
    F: FnOnce(&S) -> Result<T, Error> + Send + 'static,
{
    let store = store.clone();

    tokio::task::spawn_blocking(move || query(&store)).await?
}

fn check_page_size(page_size: u64) -> Result<(), Error> {
    if page_size == 0 {
        return Err(Error::InvalidSelector(
            "page size must be at least 1".to_owned(),
        ));
    }

    Ok(())
}
