//! Implements a SQLite backed sale store.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{
    Connection, Row,
    functions::FunctionFlags,
    params_from_iter,
    types::{Type, Value},
};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    sales::{CategoryCount, DateRange, NewSale, PriceBucket, SaleRecord, price_text},
    stores::{BucketCount, ImportSales, SalePage, SaleQuery, SaleStore, SaleTotals},
};

/// The columns read by [MapRow::map_row_with_offset], in order.
const SALE_COLUMNS: &str = "id, title, description, price, category, date_of_sale, sold, image";

/// Lowercases text with Rust's Unicode case mapping. SQLite's own `lower()`
/// only folds ASCII.
const LOWER_FUNCTION: &str = "sale_lower";

/// Formats a price with [price_text] so searches match the in-memory store.
const PRICE_TEXT_FUNCTION: &str = "sale_price_text";

/// Stores sales in the `sale` table of a SQLite database.
///
/// Sale dates are stored as Unix timestamps in milliseconds so that range
/// filters compare integers.
#[derive(Debug, Clone)]
pub struct SQLiteSaleStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteSaleStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// The `sale` table must already exist, see [initialize_db](crate::initialize_db).
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Register the SQL functions the search queries call.
    ///
    /// Functions belong to a connection, so this must run on every connection
    /// the store is given. [initialize_db](crate::initialize_db) does this.
    ///
    /// # Errors
    /// Returns an error if SQLite rejects a function.
    pub fn register_functions(connection: &Connection) -> Result<(), rusqlite::Error> {
        let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

        connection.create_scalar_function(LOWER_FUNCTION, 1, flags, |context| {
            let text: String = context.get(0)?;
            Ok(text.to_lowercase())
        })?;

        connection.create_scalar_function(PRICE_TEXT_FUNCTION, 1, flags, |context| {
            let price: f64 = context.get(0)?;
            Ok(price_text(price))
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::StoreUnavailable("could not acquire the database lock".to_owned())
        })
    }
}

/// Build the `WHERE` clause shared by every query and its parameters.
///
/// The range bounds are always `?1` and `?2`; the search text, if any, is `?3`.
fn where_clause(date_range: DateRange, search: Option<&str>) -> (String, Vec<Value>) {
    let mut where_clause_parts = vec!["date_of_sale >= ?1 AND date_of_sale < ?2".to_owned()];
    let mut query_parameters = vec![
        Value::Integer(to_unix_millis(date_range.start)),
        Value::Integer(to_unix_millis(date_range.end)),
    ];

    if let Some(search) = search {
        let index = query_parameters.len() + 1;
        where_clause_parts.push(format!(
            "(instr({LOWER_FUNCTION}(title), ?{index}) > 0 \
            OR instr({LOWER_FUNCTION}(description), ?{index}) > 0 \
            OR instr({PRICE_TEXT_FUNCTION}(price), ?{index}) > 0)"
        ));
        query_parameters.push(Value::Text(search.to_lowercase()));
    }

    (
        format!("WHERE {}", where_clause_parts.join(" AND ")),
        query_parameters,
    )
}

fn to_unix_millis(date_time: OffsetDateTime) -> i64 {
    (date_time.unix_timestamp_nanos() / 1_000_000) as i64
}

fn to_sql_integer(value: u64) -> Value {
    Value::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

impl SaleStore for SQLiteSaleStore {
    /// Get a page of sales from the database.
    ///
    /// The count and the page are read under the same lock, so they agree
    /// with each other.
    ///
    /// # Errors
    /// This function will return a [Error::StoreUnavailable] if there is an SQL error.
    fn get_page(&self, query: &SaleQuery) -> Result<SalePage, Error> {
        let (where_sql, mut query_parameters) = where_clause(query.date_range, query.search);
        let connection = self.lock()?;

        let total_count: i64 = connection.query_row(
            &format!("SELECT COUNT(*) FROM sale {where_sql}"),
            params_from_iter(query_parameters.iter()),
            |row| row.get(0),
        )?;

        let limit_index = query_parameters.len() + 1;
        query_parameters.push(to_sql_integer(query.limit));
        query_parameters.push(to_sql_integer(query.offset));

        let records = connection
            .prepare(&format!(
                "SELECT {SALE_COLUMNS} FROM sale {where_sql} \
                ORDER BY id ASC, row_id ASC \
                LIMIT ?{limit_index} OFFSET ?{}",
                limit_index + 1
            ))?
            .query_map(params_from_iter(query_parameters.iter()), Self::map_row)?
            .collect::<Result<Vec<SaleRecord>, rusqlite::Error>>()?;

        Ok(SalePage {
            records,
            total_count: total_count as u64,
        })
    }

    /// # Errors
    /// This function will return a [Error::StoreUnavailable] if there is an SQL error.
    fn get_totals(&self, date_range: DateRange) -> Result<SaleTotals, Error> {
        let (where_sql, query_parameters) = where_clause(date_range, None);

        let totals = self.lock()?.query_row(
            &format!(
                "SELECT \
                    COALESCE(SUM(price), 0.0), \
                    COALESCE(SUM(CASE WHEN sold THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN sold THEN 0 ELSE 1 END), 0) \
                FROM sale {where_sql}"
            ),
            params_from_iter(query_parameters.iter()),
            |row| {
                Ok(SaleTotals {
                    total_sale: row.get(0)?,
                    sold_count: row.get::<_, i64>(1)? as u64,
                    not_sold_count: row.get::<_, i64>(2)? as u64,
                })
            },
        )?;

        Ok(totals)
    }

    /// Count sales per bucket with a `CASE` expression built from `buckets`.
    ///
    /// # Errors
    /// This function will return a [Error::StoreUnavailable] if there is an SQL error.
    fn count_by_price_bucket(
        &self,
        date_range: DateRange,
        buckets: &[PriceBucket],
    ) -> Result<Vec<BucketCount>, Error> {
        let (where_sql, mut query_parameters) = where_clause(date_range, None);

        let mut case_parts = vec!["CASE".to_owned()];
        for (index, bucket) in buckets.iter().enumerate() {
            match bucket.upper_bound {
                Some(upper_bound) => {
                    query_parameters.push(Value::Real(upper_bound));
                    case_parts.push(format!(
                        "WHEN price <= ?{} THEN {index}",
                        query_parameters.len()
                    ));
                }
                None => {
                    case_parts.push(format!("ELSE {index}"));
                    break;
                }
            }
        }
        case_parts.push("END".to_owned());
        let case_expression = case_parts.join(" ");

        self.lock()?
            .prepare(&format!(
                "SELECT bucket, COUNT(*) FROM \
                (SELECT {case_expression} AS bucket FROM sale {where_sql}) \
                WHERE bucket IS NOT NULL \
                GROUP BY bucket ORDER BY bucket ASC"
            ))?
            .query_map(params_from_iter(query_parameters.iter()), |row| {
                Ok(BucketCount {
                    bucket: row.get::<_, i64>(0)? as usize,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<BucketCount>, rusqlite::Error>>()
            .map_err(|error| error.into())
    }

    /// # Errors
    /// This function will return a [Error::StoreUnavailable] if there is an SQL error.
    fn count_by_category(&self, date_range: DateRange) -> Result<Vec<CategoryCount>, Error> {
        let (where_sql, query_parameters) = where_clause(date_range, None);

        self.lock()?
            .prepare(&format!(
                "SELECT category, COUNT(*) FROM sale {where_sql} \
                GROUP BY category ORDER BY category ASC"
            ))?
            .query_map(params_from_iter(query_parameters.iter()), |row| {
                Ok(CategoryCount {
                    category: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<CategoryCount>, rusqlite::Error>>()
            .map_err(|error| error.into())
    }
}

impl ImportSales for SQLiteSaleStore {
    /// Insert all of `sales` in a single database transaction.
    ///
    /// # Errors
    /// Returns an [Error::StoreUnavailable] if any insert fails, in which case
    /// no sales are inserted.
    fn import(&self, sales: Vec<NewSale>) -> Result<usize, Error> {
        let connection = self.lock()?;
        let tx = connection.unchecked_transaction()?;
        let mut inserted = 0;

        // Prepare the insert statement once for reuse
        let mut stmt = tx.prepare(
            "INSERT INTO sale (id, title, description, price, category, date_of_sale, sold, image)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;

        for sale in &sales {
            inserted += stmt.execute((
                sale.id,
                &sale.title,
                &sale.description,
                sale.price,
                &sale.category,
                sale.date_of_sale.map(to_unix_millis),
                sale.sold,
                &sale.image,
            ))?;
        }

        drop(stmt);

        tx.commit()?;
        Ok(inserted)
    }
}

impl CreateTable for SQLiteSaleStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS sale (
                row_id INTEGER PRIMARY KEY AUTOINCREMENT,
                id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL CHECK (price >= 0),
                category TEXT NOT NULL,
                date_of_sale INTEGER,
                sold INTEGER NOT NULL,
                image TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS sale_date_of_sale ON sale(date_of_sale);
            CREATE INDEX IF NOT EXISTS sale_category ON sale(category);",
        )
    }
}

impl MapRow for SQLiteSaleStore {
    type ReturnType = SaleRecord;

    /// Expects the columns in [SALE_COLUMNS] with a non-null sale date.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let millis: i64 = row.get(offset + 5)?;
        let date_of_sale =
            OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000).map_err(
                |error| {
                    rusqlite::Error::FromSqlConversionFailure(
                        offset + 5,
                        Type::Integer,
                        Box::new(error),
                    )
                },
            )?;

        Ok(SaleRecord {
            id: row.get(offset)?,
            title: row.get(offset + 1)?,
            description: row.get(offset + 2)?,
            price: row.get(offset + 3)?,
            category: row.get(offset + 4)?,
            date_of_sale,
            sold: row.get(offset + 6)?,
            image: row.get(offset + 7)?,
        })
    }
}
