use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;

use sales_dashboard::{
    DEFAULT_FEED_URL, ImportSales, SQLiteSaleStore, fetch_feed, initialize_db, parse_feed,
};

/// A utility for seeding the sales dashboard database without running the server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database. It is created if it does not exist.
    #[arg(long, short)]
    db_path: PathBuf,

    /// The URL of the JSON feed to download.
    #[arg(long, env = "FEED_URL", default_value = DEFAULT_FEED_URL, conflicts_with = "file")]
    feed_url: String,

    /// Read the feed from a local JSON file instead of downloading it.
    #[arg(long)]
    file: Option<PathBuf>,
}

/// Load the sales feed into a database.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let sales = match &args.file {
        Some(path) => {
            println!("Reading sales from {path:#?}");
            parse_feed(&std::fs::read_to_string(path)?)?
        }
        None => {
            println!("Downloading sales from {}", args.feed_url);
            fetch_feed(&reqwest::Client::new(), &args.feed_url).await?
        }
    };

    println!("Opening database at {:#?}", args.db_path);
    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let sale_store = SQLiteSaleStore::new(Arc::new(Mutex::new(conn)));
    let inserted = sale_store.import(sales)?;

    println!("Inserted {inserted} sales.");

    Ok(())
}
