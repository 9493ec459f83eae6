use anyhow::Result;
use retail_report::{run_pipeline, ReportConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    // stdout carries the report itself, so logs go to stderr
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) fixed configuration ──────────────────────────────────────
    let config = ReportConfig::default();
    info!(
        input = %config.input_path.display(),
        db = %config.db_path.display(),
        reference_date = %config.reference_date,
        "configured"
    );

    // ─── 3) load → clean → store → report ────────────────────────────
    let summary = run_pipeline(&config)?;
    info!(
        succeeded = summary.succeeded().count(),
        failed = summary.failed().count(),
        "all done"
    );
    Ok(())
}
