//! Operations invoked by the serving shell.
//!
//! Both calls are synchronous end-to-end: they return only after every
//! directory batch has joined. Per-URL failures live inside the returned
//! report, never in the `Result`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::FetchConfig;
use crate::error::SheetError;
use crate::manifest;
use crate::orchestrator;
use crate::records::ImageStore;
use crate::report::BatchReport;

/// Parses uploaded workbook bytes and downloads every listed URL into its
/// directory column under `root`. Only an unreadable workbook errors.
pub async fn upload_and_download(
    workbook: &[u8],
    root: &Path,
    cfg: &FetchConfig,
) -> Result<BatchReport, SheetError> {
    let mapping = manifest::mapping_from_workbook_bytes(workbook)?;
    tracing::info!(directories = mapping.len(), "manifest workbook parsed");

    let batches: HashMap<PathBuf, Vec<String>> = mapping
        .into_iter()
        .map(|(dir, urls)| (root.join(dir), urls))
        .collect();

    Ok(orchestrator::run_batches(&batches, cfg).await)
}

/// Downloads the `src` of every stored image record into `output_dir`.
/// Records with an empty `src` are ignored.
pub async fn download_all_from_records(
    store: &ImageStore,
    output_dir: &Path,
    cfg: &FetchConfig,
) -> Result<BatchReport> {
    let records = store.list_records().await?;
    let urls: Vec<String> = records
        .into_iter()
        .map(|r| r.src)
        .filter(|src| !src.is_empty())
        .collect();
    tracing::info!(urls = urls.len(), "image records loaded");

    let batches = HashMap::from([(output_dir.to_path_buf(), urls)]);
    Ok(orchestrator::run_batches(&batches, cfg).await)
}
