//! Contains the SQLite backed stores.

mod sale;

pub use sale::SQLiteSaleStore;
