//! stmt-equiv -- statement-pair classifier over newline-delimited JSON.
//!
//! Usage: stmt-equiv < requests.ndjson > responses.ndjson

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only responses.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    stmt_equiv::run_stdio().context("stmt-equiv driver failed")
}
