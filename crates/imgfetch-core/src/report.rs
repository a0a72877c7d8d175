//! Per-run outcome report surfaced to the caller.

use serde::Serialize;

use crate::fetch::FetchOutcome;

/// One failed URL and why.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFetch {
    pub url: String,
    pub reason: String,
}

/// Aggregated result of a download run. The caller gets per-URL accounting
/// instead of a bare acknowledgment; a run as a whole never fails.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// URLs whose files were written.
    pub succeeded: Vec<String>,
    /// URLs skipped because their file already existed.
    pub skipped: Vec<String>,
    /// URLs that failed, with the failure reason.
    pub failed: Vec<FailedFetch>,
}

impl BatchReport {
    pub fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Downloaded { url, .. } => self.succeeded.push(url),
            FetchOutcome::SkippedExisting { url, .. } => self.skipped.push(url),
            FetchOutcome::Failed { url, reason } => self.failed.push(FailedFetch { url, reason }),
        }
    }

    /// Marks every URL of a batch failed for one shared reason. Directory
    /// creation failures take this path.
    pub fn fail_all<'a>(&mut self, urls: impl IntoIterator<Item = &'a String>, reason: &str) {
        for url in urls {
            self.failed.push(FailedFetch {
                url: url.clone(),
                reason: reason.to_string(),
            });
        }
    }

    /// Number of URLs accounted for.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped.len() + self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn record_tallies_each_outcome() {
        let mut report = BatchReport::default();
        report.record(FetchOutcome::Downloaded {
            url: "http://x.test/a.png".into(),
            path: PathBuf::from("catA/a.png"),
            bytes: 3,
        });
        report.record(FetchOutcome::SkippedExisting {
            url: "http://x.test/b.png".into(),
            path: PathBuf::from("catA/b.png"),
        });
        report.record(FetchOutcome::Failed {
            url: "nope".into(),
            reason: "malformed".into(),
        });

        assert_eq!(report.succeeded, vec!["http://x.test/a.png".to_string()]);
        assert_eq!(report.skipped, vec!["http://x.test/b.png".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].url, "nope");
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn fail_all_shares_one_reason() {
        let urls = vec!["a".to_string(), "b".to_string()];
        let mut report = BatchReport::default();
        report.fail_all(&urls, "mkdir denied");
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed.iter().all(|f| f.reason == "mkdir denied"));
    }
}
