//! Defines the sale store traits and the query shapes they answer.

use crate::{
    Error,
    sales::{CategoryCount, DateRange, NewSale, PriceBucket, SaleRecord, price_text},
};

/// Answers the four read-only query shapes the month queries need.
///
/// Every method only considers sales whose date falls inside `date_range`;
/// sales without a date never match.
///
/// Implementations must be [Send] and [Sync] so queries can run on tokio's
/// blocking thread pool.
pub trait SaleStore: Send + Sync {
    /// Get one page of sales, ordered by ID and then by insertion order,
    /// along with the number of sales that match `query` before paging.
    fn get_page(&self, query: &SaleQuery) -> Result<SalePage, Error>;

    /// Get the sum of sale prices and the sold/unsold counts.
    fn get_totals(&self, date_range: DateRange) -> Result<SaleTotals, Error>;

    /// Count the sales in each of `buckets`, see
    /// [assign_bucket](crate::sales::assign_bucket).
    ///
    /// Buckets with no sales may be left out.
    fn count_by_price_bucket(
        &self,
        date_range: DateRange,
        buckets: &[PriceBucket],
    ) -> Result<Vec<BucketCount>, Error>;

    /// Count the sales in each category present, ordered by category name.
    fn count_by_category(&self, date_range: DateRange) -> Result<Vec<CategoryCount>, Error>;
}

/// Bulk inserts sales, e.g. from the seed feed.
pub trait ImportSales {
    /// Insert all of `sales` and return how many were inserted.
    ///
    /// Sales are appended: importing the same feed twice stores every sale twice.
    fn import(&self, sales: Vec<NewSale>) -> Result<usize, Error>;
}

/// Defines which sales [SaleStore::get_page] returns.
#[derive(Debug, Clone, Copy)]
pub struct SaleQuery<'a> {
    /// Include sales within this range.
    pub date_range: DateRange,
    /// If set, only include sales whose title, description or price text
    /// contains this text, ignoring case.
    pub search: Option<&'a str>,
    /// The maximum number of sales to return.
    pub limit: u64,
    /// The number of matching sales to skip.
    pub offset: u64,
}

/// One page of sales and the total number of matching sales.
#[derive(Debug, Clone, PartialEq)]
pub struct SalePage {
    /// The sales on the page.
    pub records: Vec<SaleRecord>,
    /// The number of sales that matched the query, ignoring the limit and offset.
    pub total_count: u64,
}

/// The aggregate values over a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SaleTotals {
    /// The sum of sale prices.
    pub total_sale: f64,
    /// The number of sales that sold.
    pub sold_count: u64,
    /// The number of sales that did not sell.
    pub not_sold_count: u64,
}

/// The number of sales in a price bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketCount {
    /// The index of the bucket in the bucket table.
    pub bucket: usize,
    /// The number of sales in the bucket.
    pub count: u64,
}

/// Whether `sale` matches a transaction search for `needle`.
///
/// `needle` must already be lowercased with [str::to_lowercase].
pub(super) fn matches_search(sale: &SaleRecord, needle: &str) -> bool {
    sale.title.to_lowercase().contains(needle)
        || sale.description.to_lowercase().contains(needle)
        || price_text(sale.price).contains(needle)
}
