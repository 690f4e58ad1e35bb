//! Month-scoped queries over product-sale records.
//!
//! - [month] turns a (year, month) selector into a half-open date range.
//! - [histogram] holds the fixed price buckets.
//! - [query] runs the list, statistics, histogram, category and combined
//!   queries against any [SaleStore](crate::SaleStore).
//! - [handlers] exposes the queries as JSON endpoints.

pub mod handlers;
pub mod histogram;
pub mod month;
pub mod query;
mod record;

pub use histogram::{PRICE_BUCKETS, PriceBucket, assign_bucket};
pub use month::{DateRange, MonthSelector, filter_by_month};
pub use query::{
    CategoryCount, CombinedResult, HistogramBucket, StatisticsSummary, TransactionPage,
    compute_category_breakdown, compute_combined, compute_histogram, compute_statistics,
    list_transactions, run_blocking,
};
pub use record::{NewSale, SaleId, SaleRecord, price_text};
