//! The fixed price buckets used by the bar chart.

/// A price range that ends at `upper_bound` (inclusive).
///
/// Each bucket starts just above the previous bucket's upper bound. A bucket
/// with no upper bound catches every price above the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBucket {
    /// The largest price in the bucket, or `None` for an open-ended bucket.
    pub upper_bound: Option<f64>,
    /// The label shown on the chart.
    pub label: &'static str,
}

impl PriceBucket {
    const fn up_to(upper_bound: f64, label: &'static str) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            label,
        }
    }

    /// Whether `price` is no more than this bucket's upper bound.
    pub fn accepts(&self, price: f64) -> bool {
        self.upper_bound.is_none_or(|upper_bound| price <= upper_bound)
    }
}

/// The ten price buckets, in chart order.
pub const PRICE_BUCKETS: [PriceBucket; 10] = [
    PriceBucket::up_to(100.0, "0-100"),
    PriceBucket::up_to(200.0, "101-200"),
    PriceBucket::up_to(300.0, "201-300"),
    PriceBucket::up_to(400.0, "301-400"),
    PriceBucket::up_to(500.0, "401-500"),
    PriceBucket::up_to(600.0, "501-600"),
    PriceBucket::up_to(700.0, "601-700"),
    PriceBucket::up_to(800.0, "701-800"),
    PriceBucket::up_to(900.0, "801-900"),
    PriceBucket {
        upper_bound: None,
        label: "901-above",
    },
];

/// Get the index of the first bucket in `buckets` that accepts `price`.
///
/// Returns `None` only if every bucket has an upper bound below `price`.
pub fn assign_bucket(buckets: &[PriceBucket], price: f64) -> Option<usize> {
    buckets.iter().position(|bucket| bucket.accepts(price))
}

#[cfg(test)]
mod tests {
    use super::{PRICE_BUCKETS, PriceBucket, assign_bucket};

    fn label_for(price: f64) -> &'static str {
        let index = assign_bucket(&PRICE_BUCKETS, price).expect("every price has a bucket");
        PRICE_BUCKETS[index].label
    }

    #[test]
    fn boundary_prices_fall_in_lower_bucket() {
        let want = [
            (100.0, "0-100"),
            (200.0, "101-200"),
            (300.0, "201-300"),
            (400.0, "301-400"),
            (500.0, "401-500"),
            (600.0, "501-600"),
            (700.0, "601-700"),
            (800.0, "701-800"),
            (900.0, "801-900"),
        ];

        for (price, label) in want {
            assert_eq!(label_for(price), label, "price {price}");
        }
    }

    #[test]
    fn prices_just_above_a_boundary_move_up() {
        assert_eq!(label_for(101.0), "101-200");
        assert_eq!(label_for(100.01), "101-200");
        assert_eq!(label_for(900.5), "901-above");
    }

    #[test]
    fn zero_and_large_prices_have_buckets() {
        assert_eq!(label_for(0.0), "0-100");
        assert_eq!(label_for(1_000_000.0), "901-above");
    }

    #[test]
    fn every_price_lands_in_exactly_one_bucket() {
        for cents in (0..120_000).step_by(37) {
            let price = cents as f64 / 100.0;
            let index = assign_bucket(&PRICE_BUCKETS, price).unwrap();

            let lower_bound = index
                .checked_sub(1)
                .and_then(|previous| PRICE_BUCKETS[previous].upper_bound);

            assert!(PRICE_BUCKETS[index].accepts(price));
            assert!(lower_bound.is_none_or(|lower_bound| price > lower_bound));
        }
    }

    #[test]
    fn bounded_table_can_reject_a_price() {
        let buckets = [PriceBucket::up_to(10.0, "cheap")];

        assert_eq!(assign_bucket(&buckets, 10.0), Some(0));
        assert_eq!(assign_bucket(&buckets, 10.5), None);
    }
}
