//! The product-sale record and the shape it is inserted with.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The external identifier of a sale. Not guaranteed to be unique in a store.
pub type SaleId = i64;

/// A product sale as returned by month-scoped queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    /// The identifier from the seed feed.
    pub id: SaleId,
    /// The product name.
    pub title: String,
    /// The product description.
    pub description: String,
    /// The sale price, never negative.
    pub price: f64,
    /// The product category, used as a grouping key.
    pub category: String,
    /// When the sale happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_sale: OffsetDateTime,
    /// Whether the product sold.
    pub sold: bool,
    /// A URI to the product image, passed through unmodified.
    pub image: String,
}

/// A sale record as it arrives from the seed feed.
///
/// The sale date is optional here: records without one are stored but never
/// match a month-scoped query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    /// The identifier from the seed feed.
    pub id: SaleId,
    /// The product name.
    #[serde(default)]
    pub title: String,
    /// The product description.
    #[serde(default)]
    pub description: String,
    /// The sale price.
    pub price: f64,
    /// The product category.
    #[serde(default)]
    pub category: String,
    /// When the sale happened, if known.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_of_sale: Option<OffsetDateTime>,
    /// Whether the product sold.
    #[serde(default)]
    pub sold: bool,
    /// A URI to the product image.
    #[serde(default)]
    pub image: String,
}

impl NewSale {
    /// Create an unsold sale with an empty description and image.
    pub fn new(id: SaleId, title: &str, price: f64, category: &str, date: OffsetDateTime) -> Self {
        Self {
            id,
            title: title.to_owned(),
            description: String::new(),
            price,
            category: category.to_owned(),
            date_of_sale: Some(date),
            sold: false,
            image: String::new(),
        }
    }

    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set whether the product sold.
    pub fn sold(mut self, sold: bool) -> Self {
        self.sold = sold;
        self
    }

    /// Clear the sale date.
    pub fn undated(mut self) -> Self {
        self.date_of_sale = None;
        self
    }

    /// The sale as a [SaleRecord], or `None` if it has no sale date.
    pub fn to_record(&self) -> Option<SaleRecord> {
        let date_of_sale = self.date_of_sale?;

        Some(SaleRecord {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            category: self.category.clone(),
            date_of_sale,
            sold: self.sold,
            image: self.image.clone(),
        })
    }
}

/// The text a price is matched against by a transaction search.
///
/// This is the shortest decimal text that reads back as `price`, without an
/// exponent: `250.0` is `"250"`, `0.00001` is `"0.00001"`. The SQLite store
/// calls this same function from SQL, see
/// [SQLiteSaleStore::register_functions](crate::SQLiteSaleStore::register_functions).
pub fn price_text(price: f64) -> String {
    format!("{price}")
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::{NewSale, price_text};

    #[test]
    fn deserializes_feed_record() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 329.85,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "sold": false,
            "dateOfSale": "2021-11-27T20:29:54+05:30"
        }"#;

        let sale: NewSale = serde_json::from_str(json).unwrap();

        assert_eq!(sale.id, 1);
        assert_eq!(sale.price, 329.85);
        assert_eq!(sale.category, "men's clothing");
        assert_eq!(sale.date_of_sale, Some(datetime!(2021-11-27 20:29:54 +05:30)));
        assert!(!sale.sold);
    }

    #[test]
    fn missing_date_deserializes_as_none() {
        let json = r#"{"id": 2, "title": "Mug", "price": 10}"#;

        let sale: NewSale = serde_json::from_str(json).unwrap();

        assert_eq!(sale.date_of_sale, None);
        assert_eq!(sale.to_record(), None);
    }

    #[test]
    fn record_serializes_with_camel_case_and_rfc3339() {
        let record = NewSale::new(3, "Lamp", 42.5, "home", datetime!(2024-03-10 12:00 UTC))
            .sold(true)
            .to_record()
            .unwrap();

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["dateOfSale"], "2024-03-10T12:00:00Z");
        assert_eq!(json["sold"], true);
        assert_eq!(json["price"], 42.5);
    }

    #[test]
    fn price_text_drops_trailing_zero() {
        assert_eq!(price_text(250.0), "250");
        assert_eq!(price_text(329.85), "329.85");
        assert_eq!(price_text(0.5), "0.5");
        assert_eq!(price_text(0.00001), "0.00001");
        assert_eq!(price_text(1e16), "10000000000000000");
    }
}
