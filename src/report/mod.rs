pub mod queries;

use crate::{
    config::ReportConfig,
    duck,
    process::{clean_transactions, load_transactions},
    query::QueryRunner,
};
use anyhow::{Context, Result};
use duckdb::Connection;
use std::path::PathBuf;
use tracing::{info, warn};

pub use queries::{report_queries, ReportQuery};

/// What happened to one query of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub name: String,
    /// Row count and export file, or `None` when the query failed.
    pub exported: Option<(usize, PathBuf)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    pub outcomes: Vec<QueryOutcome>,
}

impl ReportSummary {
    pub fn succeeded(&self) -> impl Iterator<Item = &QueryOutcome> {
        self.outcomes.iter().filter(|o| o.exported.is_some())
    }

    pub fn failed(&self) -> impl Iterator<Item = &QueryOutcome> {
        self.outcomes.iter().filter(|o| o.exported.is_none())
    }
}

fn banner(title: &str) {
    println!("{}", "=".repeat(70));
    println!("{title}");
    println!("{}", "=".repeat(70));
}

/// Run `queries` one after another. A failing query is recorded and skipped;
/// it never stops the ones after it.
pub fn run_queries(runner: &QueryRunner<'_>, queries: &[ReportQuery]) -> ReportSummary {
    let mut summary = ReportSummary::default();
    for q in queries {
        let exported = runner
            .run(q.name, &q.sql, q.row_cap)
            .map(|res| (res.len(), runner.export_path(q.name)));
        summary.outcomes.push(QueryOutcome {
            name: q.name.to_string(),
            exported,
        });
    }
    summary
}

/// Ask all ten report questions of an already built store.
pub fn run_report(conn: &Connection, config: &ReportConfig) -> ReportSummary {
    let runner = QueryRunner::new(conn, &config.export_dir, config.default_row_cap);
    let summary = run_queries(&runner, &report_queries(config));

    let failed: Vec<&str> = summary.failed().map(|o| o.name.as_str()).collect();
    if failed.is_empty() {
        info!(queries = summary.outcomes.len(), "report complete");
    } else {
        warn!(?failed, "report complete with failed queries");
    }
    summary
}

/// Load, clean, build the store, run the report, close the store.
///
/// Loader and store errors end the run; query errors do not.
pub fn run_pipeline(config: &ReportConfig) -> Result<ReportSummary> {
    banner("E-COMMERCE SQL ANALYSIS");

    println!("\n1. Loading dataset...");
    let raw = load_transactions(&config.input_path)?;

    println!("2. Cleaning data...");
    let cleaned = clean_transactions(raw);

    println!("\n3. Creating DuckDB database...");
    let conn = duck::build_store(&cleaned, &config.db_path)?;
    println!("   ✅ Database created: {}", config.db_path.display());

    println!();
    banner("EXECUTING SQL QUERIES");
    let summary = run_report(&conn, config);

    conn.close()
        .map_err(|(_, e)| e)
        .context("Failed to close DuckDB connection")?;

    print_closing(&summary, config);
    Ok(summary)
}

fn print_closing(summary: &ReportSummary, config: &ReportConfig) {
    println!();
    banner("SQL ANALYSIS COMPLETE!");
    let ok = summary.succeeded().count();
    if ok == summary.outcomes.len() {
        println!("\n📊 All query results have been saved as CSV files");
    } else {
        println!(
            "\n📊 {} of {} query results have been saved as CSV files",
            ok,
            summary.outcomes.len()
        );
        for o in summary.failed() {
            println!("   ❌ {}", o.name);
        }
    }
    println!("📁 Database: {}", config.db_path.display());
    println!("\nYou can now:");
    println!("  1. Use these CSV files in Tableau for visualization");
    println!("  2. Reference the SQL queries in your resume/portfolio");
    println!("  3. Share the database file for further analysis");
    println!("\n✅ SQL demonstration complete!");
}
