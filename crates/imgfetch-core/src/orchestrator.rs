//! Directory-batch download orchestration.
//!
//! Processes one directory at a time: create the directory, dispatch one
//! fetch task per URL, and wait for the whole batch before moving to the
//! next directory. Per-URL failures stay inside their task; a directory
//! that cannot be created fails only its own batch.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use tokio::task::JoinSet;

use crate::config::{FetchConfig, FetchMode};
use crate::error::DownloadError;
use crate::fetch::{self, DownloadRequest};
use crate::report::BatchReport;

/// Downloads every URL of every directory batch. Never fails: the report
/// carries the fate of each URL. Directory order follows map iteration
/// order; URLs within a directory run per `cfg.mode`.
pub async fn run_batches(
    mapping: &HashMap<PathBuf, Vec<String>>,
    cfg: &FetchConfig,
) -> BatchReport {
    let mut report = BatchReport::default();

    for (directory, urls) in mapping {
        if let Err(e) = tokio::fs::create_dir_all(directory).await {
            let err = DownloadError::DirectoryCreation {
                dir: directory.clone(),
                source: e,
            };
            tracing::error!("{err}");
            report.fail_all(urls, &err.to_string());
            continue;
        }

        match cfg.mode {
            FetchMode::Sequential => {
                run_directory_sequential(directory, urls, cfg, &mut report).await
            }
            FetchMode::Concurrent => {
                run_directory_concurrent(directory, urls, cfg, &mut report).await
            }
        }
        tracing::debug!(
            directory = %directory.display(),
            urls = urls.len(),
            "directory batch complete"
        );
    }

    report
}

/// Strictly one in-flight fetch at a time.
async fn run_directory_sequential(
    directory: &Path,
    urls: &[String],
    cfg: &FetchConfig,
    report: &mut BatchReport,
) {
    for url in urls {
        let request = DownloadRequest {
            directory: directory.to_path_buf(),
            url: url.clone(),
        };
        report.record(fetch::fetch_one(request, cfg).await);
    }
}

/// Fan out one task per URL (bounded by `max_in_flight` when set), then
/// drain the join set as a single barrier for the batch.
async fn run_directory_concurrent(
    directory: &Path,
    urls: &[String],
    cfg: &FetchConfig,
    report: &mut BatchReport,
) {
    let cap = cfg.max_in_flight.map(|n| n.max(1)).unwrap_or(usize::MAX);
    let mut queue: VecDeque<&String> = urls.iter().collect();
    let mut join_set = JoinSet::new();

    loop {
        while join_set.len() < cap {
            let Some(url) = queue.pop_front() else {
                break;
            };
            let request = DownloadRequest {
                directory: directory.to_path_buf(),
                url: url.clone(),
            };
            let cfg = cfg.clone();
            join_set.spawn(async move { fetch::fetch_one(request, &cfg).await });
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        match res {
            Ok(outcome) => report.record(outcome),
            // A panicked task loses its outcome; fetch tasks catch their own errors.
            Err(e) => tracing::error!("fetch task join failed: {e}"),
        }
    }
}
