mod records;
mod sheet;

pub use records::{run_add_record, run_from_records};
pub use sheet::run_from_sheet;

use anyhow::Result;
use imgfetch_core::report::BatchReport;

/// Renders a finished run: one summary line (plus failure details) or the
/// full report as JSON for machine consumers.
pub(crate) fn print_report(report: &BatchReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "downloaded: {}  skipped: {}  failed: {}",
        report.succeeded.len(),
        report.skipped.len(),
        report.failed.len()
    );
    for failure in &report.failed {
        println!("  failed {}: {}", failure.url, failure.reason);
    }
    Ok(())
}
