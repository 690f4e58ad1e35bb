//! The API endpoints URIs.

/// The route that seeds the database from the third-party feed.
pub const INITIALIZE: &str = "/api/initialize";
/// The route for a page of a month's transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for a month's sale totals.
pub const STATISTICS: &str = "/api/statistics";
/// The route for a month's price histogram.
pub const BAR_CHART: &str = "/api/bar-chart";
/// The route for a month's category counts.
pub const PIE_CHART: &str = "/api/pie-chart";
/// The route for all of a month's data in one response.
pub const COMBINED_DATA: &str = "/api/combined-data";

/// The third-party feed the database is seeded from by default.
pub const DEFAULT_FEED_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";
