pub mod export;
pub mod render;

use anyhow::{Context, Result};
use duckdb::{types::Value, Connection};
use std::{
    fmt,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{error, info};

pub use export::export_file_name;

/// One cell of a query result.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Int(i128),
    Float(f64),
    Text(String),
}

impl Datum {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Datum::Int(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Integers widen to float so callers need not care which one DuckDB picked.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Int(v) => Some(*v as f64),
            Datum::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Datum::Int(_) | Datum::Float(_))
    }
}

impl From<Value> for Datum {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Datum::Null,
            Value::Boolean(b) => Datum::Text(b.to_string()),
            Value::TinyInt(i) => Datum::Int(i.into()),
            Value::SmallInt(i) => Datum::Int(i.into()),
            Value::Int(i) => Datum::Int(i.into()),
            Value::BigInt(i) => Datum::Int(i.into()),
            Value::HugeInt(i) => Datum::Int(i),
            Value::UTinyInt(i) => Datum::Int(i.into()),
            Value::USmallInt(i) => Datum::Int(i.into()),
            Value::UInt(i) => Datum::Int(i.into()),
            Value::UBigInt(i) => Datum::Int(i.into()),
            Value::Float(f) => Datum::Float(f.into()),
            Value::Double(f) => Datum::Float(f),
            Value::Decimal(d) => Datum::Text(d.to_string()),
            Value::Text(s) => Datum::Text(s),
            other => Datum::Text(format!("{other:?}")),
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => Ok(()),
            Datum::Int(v) => write!(f, "{v}"),
            // plain positional digits, with `.0` on whole numbers so a
            // float column never looks like an integer one
            Datum::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v}.0"),
            Datum::Float(v) => write!(f, "{v}"),
            Datum::Text(s) => f.write_str(s),
        }
    }
}

/// Rows produced by one report query, in the order DuckDB returned them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Datum>>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (`row`, `column`), or `None` if either is out of range.
    pub fn get(&self, row: usize, column: &str) -> Option<&Datum> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }
}

/// Run `sql` and collect every row.
pub fn execute(conn: &Connection, sql: &str) -> Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    // the result schema only exists once the statement has run
    let columns = rows
        .as_ref()
        .map(|s| s.column_names())
        .unwrap_or_default();

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            cells.push(Datum::from(row.get::<_, Value>(i)?));
        }
        out.push(cells);
    }

    Ok(QueryResult { columns, rows: out })
}

/// Executes report queries against one open connection, printing each result
/// and exporting it as CSV next to the others.
pub struct QueryRunner<'a> {
    conn: &'a Connection,
    export_dir: PathBuf,
    default_row_cap: usize,
}

impl<'a> QueryRunner<'a> {
    pub fn new(conn: &'a Connection, export_dir: impl Into<PathBuf>, default_row_cap: usize) -> Self {
        Self {
            conn,
            export_dir: export_dir.into(),
            default_row_cap,
        }
    }

    pub fn export_path(&self, name: &str) -> PathBuf {
        self.export_dir.join(export_file_name(name))
    }

    /// Run one named query. Failures stop here: they are printed and logged,
    /// and the caller gets `None` so the next query can still run.
    pub fn run(&self, name: &str, sql: &str, row_cap: Option<usize>) -> Option<QueryResult> {
        println!("\n{}", "=".repeat(70));
        println!("{name}");
        println!("{}", "=".repeat(70));

        let cap = row_cap.unwrap_or(self.default_row_cap);
        match self.run_inner(name, sql, cap) {
            Ok(result) => Some(result),
            Err(e) => {
                error!(query = name, "query failed: {e:#}");
                println!("❌ Error: {e:#}");
                None
            }
        }
    }

    fn run_inner(&self, name: &str, sql: &str, cap: usize) -> Result<QueryResult> {
        let start = Instant::now();
        let result = execute(self.conn, sql)?;
        info!(
            query = name,
            rows = result.len(),
            elapsed = ?start.elapsed(),
            "query executed"
        );

        print!("{}", render::render(&result, cap));

        let path = self.export_path(name);
        export::write_csv(&result, &path)
            .with_context(|| format!("Failed to export {}", path.display()))?;
        println!("\n✅ Results saved to: {}", display_name(&path));
        Ok(result)
    }
}

// Exports live in the working directory by default; print them bare then.
fn display_name(path: &Path) -> String {
    match path.strip_prefix(".") {
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}
