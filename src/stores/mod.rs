//! Contains the traits and implementations for objects that store sale records.

mod memory;
mod sale;

pub mod sqlite;

pub use memory::MemorySaleStore;
pub use sale::{BucketCount, ImportSales, SalePage, SaleQuery, SaleStore, SaleTotals};
pub use sqlite::SQLiteSaleStore;
