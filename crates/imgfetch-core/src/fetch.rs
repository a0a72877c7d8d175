//! One fetch task: resolve, skip-check, streaming GET, atomic finalize.
//!
//! A fetch task never lets an error escape: every failure becomes a
//! `FetchOutcome::Failed`, so sibling downloads of the same batch keep
//! going. The curl transfer runs on the blocking pool.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::DownloadError;
use crate::resolver;
use crate::storage::{self, PartWriter};

/// One URL bound for one destination directory. Built by the orchestrator,
/// consumed once.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub directory: PathBuf,
    pub url: String,
}

/// What happened to one request.
#[derive(Debug)]
pub enum FetchOutcome {
    Downloaded {
        url: String,
        path: PathBuf,
        bytes: u64,
    },
    SkippedExisting {
        url: String,
        path: PathBuf,
    },
    Failed {
        url: String,
        reason: String,
    },
}

/// Runs one download request to completion.
pub async fn fetch_one(request: DownloadRequest, cfg: &FetchConfig) -> FetchOutcome {
    let target = match resolver::resolve(&request.url, &request.directory) {
        Ok(t) => t,
        Err(err) => {
            tracing::warn!("{err}");
            return FetchOutcome::Failed {
                url: request.url,
                reason: err.to_string(),
            };
        }
    };

    if !cfg.overwrite_existing {
        if let Ok(meta) = tokio::fs::metadata(&target.local_path).await {
            if meta.is_file() {
                tracing::debug!(
                    path = %target.local_path.display(),
                    "file already present, skipping fetch"
                );
                return FetchOutcome::SkippedExisting {
                    url: request.url,
                    path: target.local_path,
                };
            }
        }
    }

    let timeout = cfg.fetch_timeout_secs.map(Duration::from_secs);
    let fetch_url = target.fetch_url.clone();
    let local_path = target.local_path.clone();
    let joined =
        tokio::task::spawn_blocking(move || transfer_to_file(&fetch_url, &local_path, timeout))
            .await;

    match joined {
        Ok(Ok(bytes)) => {
            tracing::info!(
                url = %request.url,
                path = %target.local_path.display(),
                bytes,
                "downloaded"
            );
            FetchOutcome::Downloaded {
                url: request.url,
                path: target.local_path,
                bytes,
            }
        }
        Ok(Err(e)) => {
            let err = DownloadError::Fetch {
                url: request.url.clone(),
                reason: format!("{e:#}"),
            };
            tracing::warn!("{err}");
            FetchOutcome::Failed {
                url: request.url,
                reason: err.to_string(),
            }
        }
        Err(join_err) => {
            tracing::error!(url = %request.url, "fetch task join failed: {join_err}");
            FetchOutcome::Failed {
                url: request.url,
                reason: format!("fetch task join failed: {join_err}"),
            }
        }
    }
}

/// Streams `fetch_url` into `<final_path>.part` and renames on success.
/// A failed transfer removes its part file; no final file appears.
fn transfer_to_file(fetch_url: &str, final_path: &Path, timeout: Option<Duration>) -> Result<u64> {
    let part = storage::part_path(final_path);
    let writer = PartWriter::create(&part)?;

    let streamed = stream_into(fetch_url, &writer, timeout).and_then(|bytes| {
        writer.sync()?;
        Ok(bytes)
    });

    match streamed {
        Ok(bytes) => {
            writer.finalize(final_path)?;
            Ok(bytes)
        }
        Err(e) => {
            writer.discard();
            Err(e)
        }
    }
}

/// Single streaming GET, body appended to `writer`. Returns bytes written.
fn stream_into(fetch_url: &str, writer: &PartWriter, timeout: Option<Duration>) -> Result<u64> {
    let written = Arc::new(AtomicU64::new(0));
    let written_cb = Arc::clone(&written);
    let sink = writer.clone();

    let mut easy = curl::easy::Easy::new();
    easy.url(fetch_url).context("invalid fetch URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    if let Some(limit) = timeout {
        easy.timeout(limit)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.write_function(move |data| match sink.append(data) {
            Ok(()) => {
                written_cb.fetch_add(data.len() as u64, Ordering::Relaxed);
                Ok(data.len())
            }
            Err(e) => {
                tracing::warn!("download write failed: {:#}", e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform().context("GET request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET returned HTTP {}", code);
    }

    Ok(written.load(Ordering::Relaxed))
}
