//! Implements a sale store that keeps its sales in memory.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock, RwLockReadGuard},
};

use crate::{
    Error,
    sales::{CategoryCount, DateRange, NewSale, PriceBucket, SaleRecord, assign_bucket},
    stores::{
        BucketCount, ImportSales, SalePage, SaleQuery, SaleStore, SaleTotals,
        sale::matches_search,
    },
};

/// Stores sales in a [Vec], in insertion order.
///
/// Useful for tests and small data sets; every query scans every sale.
/// Clones share the same sales.
#[derive(Debug, Default, Clone)]
pub struct MemorySaleStore {
    sales: Arc<RwLock<Vec<NewSale>>>,
}

impl MemorySaleStore {
    /// Create a store holding `sales`.
    pub fn new(sales: Vec<NewSale>) -> Self {
        Self {
            sales: Arc::new(RwLock::new(sales)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<NewSale>>, Error> {
        self.sales
            .read()
            .map_err(|error| Error::StoreUnavailable(format!("could not acquire the lock: {error}")))
    }

    /// The dated sales inside `date_range`, in insertion order.
    fn in_range(&self, date_range: DateRange) -> Result<Vec<SaleRecord>, Error> {
        Ok(self
            .read()?
            .iter()
            .filter(|sale| {
                sale.date_of_sale
                    .is_some_and(|date| date_range.contains(date))
            })
            .filter_map(NewSale::to_record)
            .collect())
    }
}

impl SaleStore for MemorySaleStore {
    fn get_page(&self, query: &SaleQuery) -> Result<SalePage, Error> {
        let needle = query.search.map(str::to_lowercase);

        let mut matches: Vec<SaleRecord> = self
            .in_range(query.date_range)?
            .into_iter()
            .filter(|sale| {
                needle
                    .as_deref()
                    .is_none_or(|needle| matches_search(sale, needle))
            })
            .collect();
        // Stable, so sales with the same ID keep their insertion order.
        matches.sort_by_key(|sale| sale.id);

        let total_count = matches.len() as u64;
        let records = matches
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .collect();

        Ok(SalePage {
            records,
            total_count,
        })
    }

    fn get_totals(&self, date_range: DateRange) -> Result<SaleTotals, Error> {
        let totals = self
            .in_range(date_range)?
            .iter()
            .fold(SaleTotals::default(), |mut totals, sale| {
                totals.total_sale += sale.price;
                if sale.sold {
                    totals.sold_count += 1;
                } else {
                    totals.not_sold_count += 1;
                }
                totals
            });

        Ok(totals)
    }

    fn count_by_price_bucket(
        &self,
        date_range: DateRange,
        buckets: &[PriceBucket],
    ) -> Result<Vec<BucketCount>, Error> {
        let mut counts: BTreeMap<usize, u64> = BTreeMap::new();

        for sale in self.in_range(date_range)? {
            if let Some(bucket) = assign_bucket(buckets, sale.price) {
                *counts.entry(bucket).or_insert(0) += 1;
            }
        }

        Ok(counts
            .into_iter()
            .map(|(bucket, count)| BucketCount { bucket, count })
            .collect())
    }

    fn count_by_category(&self, date_range: DateRange) -> Result<Vec<CategoryCount>, Error> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();

        for sale in self.in_range(date_range)? {
            *counts.entry(sale.category).or_insert(0) += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect())
    }
}

impl ImportSales for MemorySaleStore {
    /// # Errors
    /// Returns an [Error::StoreUnavailable] without inserting anything if any
    /// sale has a negative or non-finite price.
    fn import(&self, sales: Vec<NewSale>) -> Result<usize, Error> {
        if let Some(sale) = sales
            .iter()
            .find(|sale| !(sale.price.is_finite() && sale.price >= 0.0))
        {
            return Err(Error::StoreUnavailable(format!(
                "sale {} has an invalid price {}",
                sale.id, sale.price
            )));
        }

        let count = sales.len();

        self.sales
            .write()
            .map_err(|error| Error::StoreUnavailable(format!("could not acquire the lock: {error}")))?
            .extend(sales);

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        Error,
        sales::{MonthSelector, NewSale, PRICE_BUCKETS, filter_by_month},
        stores::{BucketCount, ImportSales, SaleQuery, SaleStore},
    };

    use super::MemorySaleStore;

    fn march_2022() -> crate::sales::DateRange {
        filter_by_month(MonthSelector::new(2022, 3)).unwrap()
    }

    fn all_of(search: Option<&str>) -> SaleQuery<'_> {
        SaleQuery {
            date_range: march_2022(),
            search,
            limit: u64::MAX,
            offset: 0,
        }
    }

    #[test]
    fn page_is_ordered_by_id_then_insertion() {
        let store = MemorySaleStore::new(vec![
            NewSale::new(3, "third", 1.0, "a", datetime!(2022-03-01 0:00 UTC)),
            NewSale::new(1, "first", 1.0, "a", datetime!(2022-03-02 0:00 UTC)),
            NewSale::new(3, "third again", 1.0, "a", datetime!(2022-03-03 0:00 UTC)),
            NewSale::new(2, "second", 1.0, "a", datetime!(2022-03-04 0:00 UTC)),
        ]);

        let page = store.get_page(&all_of(None)).unwrap();

        let titles: Vec<&str> = page.records.iter().map(|sale| sale.title.as_str()).collect();
        assert_eq!(titles, ["first", "second", "third", "third again"]);
        assert_eq!(page.total_count, 4);
    }

    #[test]
    fn undated_and_out_of_range_sales_never_match() {
        let store = MemorySaleStore::new(vec![
            NewSale::new(1, "in", 10.0, "a", datetime!(2022-03-15 0:00 UTC)),
            NewSale::new(2, "undated", 10.0, "a", datetime!(2022-03-15 0:00 UTC)).undated(),
            NewSale::new(3, "april", 10.0, "a", datetime!(2022-04-01 0:00 UTC)),
        ]);

        let page = store.get_page(&all_of(None)).unwrap();
        let totals = store.get_totals(march_2022()).unwrap();

        assert_eq!(page.total_count, 1);
        assert_eq!(page.records[0].title, "in");
        assert_eq!(totals.total_sale, 10.0);
    }

    #[test]
    fn search_matches_title_description_and_price_text() {
        let date = datetime!(2022-03-10 0:00 UTC);
        let store = MemorySaleStore::new(vec![
            NewSale::new(1, "Blue Backpack", 55.0, "bags", date),
            NewSale::new(2, "Mug", 12.0, "home", date).description("holds BACKPACK sized coffee"),
            NewSale::new(3, "Lamp", 329.85, "home", date),
            NewSale::new(4, "Chair", 80.0, "home", date),
        ]);

        let by_text = store.get_page(&all_of(Some("backpack"))).unwrap();
        let by_price = store.get_page(&all_of(Some("9.8"))).unwrap();

        assert_eq!(by_text.total_count, 2);
        assert_eq!(by_price.total_count, 1);
        assert_eq!(by_price.records[0].title, "Lamp");
    }

    #[test]
    fn search_folds_non_ascii_case() {
        let date = datetime!(2022-03-10 0:00 UTC);
        let store = MemorySaleStore::new(vec![
            NewSale::new(1, "ÉCRAN Plat", 199.0, "electronics", date),
            NewSale::new(2, "Mug", 12.0, "home", date).description("Große Tasse"),
        ]);

        let accented = store.get_page(&all_of(Some("écran"))).unwrap();
        let sharp_s = store.get_page(&all_of(Some("GROẞE"))).unwrap();

        assert_eq!(accented.total_count, 1);
        assert_eq!(accented.records[0].id, 1);
        assert_eq!(sharp_s.total_count, 1);
        assert_eq!(sharp_s.records[0].id, 2);
    }

    #[test]
    fn bucket_counts_skip_empty_buckets() {
        let date = datetime!(2022-03-10 0:00 UTC);
        let store = MemorySaleStore::new(vec![
            NewSale::new(1, "a", 100.0, "x", date),
            NewSale::new(2, "b", 100.5, "x", date),
            NewSale::new(3, "c", 150.0, "x", date),
            NewSale::new(4, "d", 5000.0, "x", date),
        ]);

        let got = store
            .count_by_price_bucket(march_2022(), &PRICE_BUCKETS)
            .unwrap();

        assert_eq!(
            got,
            [
                BucketCount { bucket: 0, count: 1 },
                BucketCount { bucket: 1, count: 2 },
                BucketCount { bucket: 9, count: 1 },
            ]
        );
    }

    #[test]
    fn import_rejects_negative_price_atomically() {
        let date = datetime!(2022-03-10 0:00 UTC);
        let store = MemorySaleStore::default();

        let result = store.import(vec![
            NewSale::new(1, "ok", 1.0, "x", date),
            NewSale::new(2, "bad", -1.0, "x", date),
        ]);

        assert!(matches!(result, Err(Error::StoreUnavailable(_))));
        assert_eq!(store.get_page(&all_of(None)).unwrap().total_count, 0);
    }

    #[test]
    fn import_appends() {
        let store = MemorySaleStore::default();
        let sale = NewSale::new(1, "a", 1.0, "x", datetime!(2022-03-10 0:00 UTC));

        store.import(vec![sale.clone()]).unwrap();
        let inserted = store.import(vec![sale]).unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(store.get_page(&all_of(None)).unwrap().total_count, 2);
    }
}
