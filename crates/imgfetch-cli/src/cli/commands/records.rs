//! `imgfetch from-records` / `add-record` – record-store backed downloads.

use anyhow::Result;
use imgfetch_core::config::FetchConfig;
use imgfetch_core::records::ImageStore;
use imgfetch_core::service;
use std::path::Path;

use super::print_report;

async fn open_store(db: Option<&Path>) -> Result<ImageStore> {
    match db {
        Some(path) => ImageStore::open_at(path).await,
        None => ImageStore::open_default().await,
    }
}

pub async fn run_from_records(
    db: Option<&Path>,
    output_dir: &Path,
    cfg: &FetchConfig,
    json: bool,
) -> Result<()> {
    let store = open_store(db).await?;
    let report = service::download_all_from_records(&store, output_dir, cfg).await?;
    print_report(&report, json)
}

pub async fn run_add_record(
    db: Option<&Path>,
    source_index: Option<i64>,
    tag: Option<&str>,
    url: &str,
) -> Result<()> {
    let store = open_store(db).await?;
    let id = store.add_record(source_index, tag, url).await?;
    println!("record {} added", id);
    Ok(())
}
