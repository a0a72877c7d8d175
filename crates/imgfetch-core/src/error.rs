//! Error taxonomy for the download pipeline.
//!
//! Per-URL errors (`MalformedUrl`, `Fetch`) are caught at the fetch-task
//! boundary and recorded in the batch report; they never abort sibling
//! downloads. `DirectoryCreation` aborts only the batch of the directory
//! it names.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// URL could not be parsed, or its path has no usable filename segment.
    #[error("malformed image url `{url}`: {reason}")]
    MalformedUrl { url: String, reason: String },

    /// Destination directory could not be created.
    #[error("failed to create directory `{}`: {source}", dir.display())]
    DirectoryCreation {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network, protocol, or disk failure while fetching one URL.
    #[error("fetch of `{url}` failed: {reason}")]
    Fetch { url: String, reason: String },
}

/// Errors from parsing an uploaded manifest workbook. A workbook without a
/// header row is rejected rather than treated as an empty manifest.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("workbook has no worksheet")]
    NoWorksheet,

    #[error("worksheet has no header row")]
    MissingHeader,
}
