//! `imgfetch from-sheet` – download everything a manifest workbook lists.

use anyhow::{Context, Result};
use imgfetch_core::config::FetchConfig;
use imgfetch_core::service;
use std::path::Path;

use super::print_report;

pub async fn run_from_sheet(file: &Path, root: &Path, cfg: &FetchConfig, json: bool) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let report = service::upload_and_download(&bytes, root, cfg)
        .await
        .context("manifest workbook rejected")?;

    print_report(&report, json)
}
