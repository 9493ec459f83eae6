use crate::process::CleanedRecord;
use anyhow::{bail, Context, Result};
use duckdb::{Connection, ToSql};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, info};

/// Relation every report query reads from.
pub const TRANSACTIONS_TABLE: &str = "transactions";

const CREATE_TRANSACTIONS: &str = "CREATE OR REPLACE TABLE transactions(
    InvoiceNo VARCHAR,
    StockCode VARCHAR,
    Description VARCHAR,
    Quantity BIGINT,
    InvoiceDate TIMESTAMP,
    UnitPrice DOUBLE,
    CustomerID VARCHAR,
    Country VARCHAR,
    TotalPrice DOUBLE,
    Year INTEGER,
    Month INTEGER,
    Day INTEGER,
    DayOfWeek VARCHAR,
    Quarter INTEGER
);";

/// Open a DuckDB database on disk at `path`, creating the file if it doesn't exist.
pub fn open_disk_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open DuckDB at {}", path.display()))?;
    single_threaded(&conn)?;
    Ok(conn)
}

/// Open a DuckDB in‐memory database
pub fn open_mem_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    single_threaded(&conn)?;
    Ok(conn)
}

// One worker keeps float aggregation order, and so rounding, stable run to run.
fn single_threaded(conn: &Connection) -> Result<()> {
    conn.execute_batch("SET threads TO 1;")?;
    Ok(())
}

/// Delete the database at `path` along with its write-ahead log, if present.
pub fn remove_db_files(path: &Path) -> Result<()> {
    let mut wal = path.as_os_str().to_owned();
    wal.push(".wal");
    for file in [path.to_path_buf(), PathBuf::from(wal)] {
        if file.exists() {
            fs::remove_file(&file)
                .with_context(|| format!("Failed to remove {}", file.display()))?;
            debug!(path = %file.display(), "removed previous database file");
        }
    }
    Ok(())
}

/// (Re)create the `transactions` table in the given connection
pub fn setup_transactions_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TRANSACTIONS)?;
    Ok(())
}

/// Insert rows via Appender::append_rows in bulk, using arrays of &dyn ToSql
/// returning elapsed seconds
pub fn insert_transactions(conn: &Connection, data: &[CleanedRecord]) -> Result<f64> {
    let mut appender = conn.appender(TRANSACTIONS_TABLE)?;
    let start = Instant::now();

    appender.append_rows(data.iter().map(|row| {
        [
            &row.invoice_no as &dyn ToSql,
            &row.stock_code as &dyn ToSql,
            &row.description as &dyn ToSql,
            &row.quantity as &dyn ToSql,
            &row.invoice_date as &dyn ToSql,
            &row.unit_price as &dyn ToSql,
            &row.customer_id as &dyn ToSql,
            &row.country as &dyn ToSql,
            &row.total_price as &dyn ToSql,
            &row.year as &dyn ToSql,
            &row.month as &dyn ToSql,
            &row.day as &dyn ToSql,
            &row.day_of_week as &dyn ToSql,
            &row.quarter as &dyn ToSql,
        ]
    }))?;
    appender.flush()?;
    Ok(start.elapsed().as_secs_f64())
}

pub fn transaction_count(conn: &Connection) -> Result<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM transactions;", [], |r| r.get(0))?;
    Ok(n as usize)
}

/// Build the store from scratch at `path` and load every cleaned record into
/// `transactions`. Whatever was at `path` before is deleted first. The open
/// connection is handed back for the report queries.
#[tracing::instrument(level = "info", skip(records, path), fields(path = %path.display(), rows = records.len()))]
pub fn build_store(records: &[CleanedRecord], path: &Path) -> Result<Connection> {
    remove_db_files(path)?;
    let conn = open_disk_db(path)?;
    load_into(&conn, records)?;
    Ok(conn)
}

/// Replace `transactions` in an already open connection with `records`.
pub fn load_into(conn: &Connection, records: &[CleanedRecord]) -> Result<()> {
    setup_transactions_table(conn).context("Failed to create transactions table")?;
    let elapsed = insert_transactions(conn, records).context("Failed to load transactions")?;

    let stored = transaction_count(conn)?;
    if stored != records.len() {
        bail!(
            "transactions holds {} rows after load, expected {}",
            stored,
            records.len()
        );
    }
    info!(rows = stored, elapsed_s = elapsed, "loaded transactions");
    Ok(())
}
