use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;

#[tokio::main]
async fn main() -> ExitCode {
    match sync().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("xref-sync failed: {:#}", e);
            eprintln!("xref-sync: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn sync() -> anyhow::Result<()> {
    let path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: xref-sync <records.json>")?;

    let report = xref_lib::run(&path)
        .await
        .with_context(|| format!("reconciling {}", path.display()))?;

    log::info!(
        "Reconciled {} records: {} inserted, {} updated, {} deleted, {} change log entries",
        report.fetched,
        report.summary.inserted,
        report.summary.updated,
        report.summary.deleted,
        report.summary.logged
    );
    Ok(())
}
