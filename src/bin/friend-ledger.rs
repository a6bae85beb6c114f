use std::fs::File;

use anyhow::{Context, Result};
use friend_ledger::{
    bin_utils::{ReplayError, Report, Service},
    config::LedgerConfig,
    events::TracingEventSink,
    processor::CommandProcessError,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // stdout carries the report, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut report = Report::Accounts;
    let mut filename = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--audit" => report = Report::Audit,
            _ => filename = Some(arg),
        }
    }
    let filename = filename.context("Expected a file name as the first argument")?;
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;
    let config = LedgerConfig::from_env().context("Invalid ledger configuration")?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        report,
        sink: TracingEventSink,
        config,
        error_printer: Box::new(|line, err| match err {
            ReplayError::Process(CommandProcessError::LedgerErr(err)) if err.is_commit_failure() => {
                tracing::error!(line, %err, "operation failed after validation");
            }
            ReplayError::Process(CommandProcessError::LedgerErr(err)) => {
                // rejected by business rules, not a broken script
                tracing::warn!(line, %err, "operation rejected");
            }
            err => eprintln!("Error at line {line}: {err}"),
        }),
    };
    service.run()
}
