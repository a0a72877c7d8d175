//! Fetch-URL and local-path resolution for one image URL.
//!
//! Source URLs arrive with their filename segment either percent-encoded or
//! literal, with no marker saying which. The resolver normalizes both: the
//! local path always gets the decoded filename, the outbound fetch URL
//! always gets the encoded one.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::DownloadError;

/// Final fetch URL and local destination derived from one source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub fetch_url: String,
    pub local_path: PathBuf,
}

/// Resolves `url` against a destination `directory`.
///
/// The filename segment is the text after the last `/` of the URL path
/// (query and fragment dropped). If percent-decoding changes the segment,
/// it was already encoded: the decoded form names the local file and the
/// original spelling goes into the fetch URL unchanged. If decoding is a
/// no-op, the segment is literal: it names the local file as written and
/// its percent-encoded form (spaces as `%20`) goes into the fetch URL.
///
/// A literal filename whose `%` runs happen to parse as valid escapes is
/// indistinguishable from an encoded one and takes the encoded branch.
pub fn resolve(url: &str, directory: &Path) -> Result<ResolvedTarget, DownloadError> {
    let parsed = Url::parse(url).map_err(|e| malformed(url, e.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| malformed(url, "no host".to_string()))?;

    let mut origin = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        origin.push(':');
        origin.push_str(&port.to_string());
    }

    let raw_path = raw_path_of(url);
    let Some(slash) = raw_path.rfind('/') else {
        return Err(malformed(url, "no path".to_string()));
    };
    let dir_in_url = &raw_path[..=slash];
    let raw_name = &raw_path[slash + 1..];
    if raw_name.is_empty() {
        return Err(malformed(url, "no filename in path".to_string()));
    }

    let decoded = match urlencoding::decode(raw_name) {
        Ok(d) => d,
        // Decoded bytes that are not UTF-8 cannot name a local file; treat the segment as literal.
        Err(_) => Cow::Borrowed(raw_name),
    };
    let (file_name, fetch_name): (String, Cow<'_, str>) = if decoded.as_ref() != raw_name {
        (decoded.into_owned(), Cow::Borrowed(raw_name))
    } else {
        (raw_name.to_string(), urlencoding::encode(raw_name))
    };

    Ok(ResolvedTarget {
        fetch_url: format!("{origin}{dir_in_url}{fetch_name}"),
        local_path: directory.join(file_name),
    })
}

fn malformed(url: &str, reason: String) -> DownloadError {
    DownloadError::MalformedUrl {
        url: url.to_string(),
        reason,
    }
}

/// The path of `raw` as written: after the authority, cut at `?`/`#`.
///
/// `Url::path()` cannot be used here: parsing percent-encodes literal
/// spaces, which would make every literal segment look pre-encoded.
fn raw_path_of(raw: &str) -> &str {
    let rest = match raw.find("://") {
        Some(i) => &raw[i + 3..],
        None => raw,
    };
    let path = match rest.find('/') {
        Some(i) => &rest[i..],
        None => "",
    };
    match path.find(|c| c == '?' || c == '#') {
        Some(i) => &path[..i],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(url: &str) -> ResolvedTarget {
        resolve(url, Path::new("catA")).expect("resolvable url")
    }

    #[test]
    fn encoded_segment_is_decoded_for_local_path() {
        let t = target("http://x.test/images/a%20b.png");
        assert_eq!(t.fetch_url, "http://x.test/images/a%20b.png");
        assert_eq!(t.local_path, Path::new("catA").join("a b.png"));
    }

    #[test]
    fn literal_segment_is_encoded_for_fetch_url() {
        let t = target("http://x.test/c d.png");
        assert_eq!(t.fetch_url, "http://x.test/c%20d.png");
        assert_eq!(t.local_path, Path::new("catA").join("c d.png"));
    }

    #[test]
    fn plain_ascii_name_passes_through_both_ways() {
        let t = target("https://cdn.x.test/img/photo.png");
        assert_eq!(t.fetch_url, "https://cdn.x.test/img/photo.png");
        assert_eq!(t.local_path, Path::new("catA").join("photo.png"));
    }

    #[test]
    fn literal_unicode_name_is_encoded_for_fetch_url() {
        let t = target("http://x.test/사진.png");
        assert_eq!(t.fetch_url, "http://x.test/%EC%82%AC%EC%A7%84.png");
        assert_eq!(t.local_path, Path::new("catA").join("사진.png"));
    }

    #[test]
    fn encoded_unicode_name_is_decoded_for_local_path() {
        let t = target("http://x.test/%EC%82%AC%EC%A7%84.png");
        assert_eq!(t.fetch_url, "http://x.test/%EC%82%AC%EC%A7%84.png");
        assert_eq!(t.local_path, Path::new("catA").join("사진.png"));
    }

    #[test]
    fn invalid_escape_takes_the_literal_branch() {
        let t = target("http://x.test/100%.png");
        assert_eq!(t.fetch_url, "http://x.test/100%25.png");
        assert_eq!(t.local_path, Path::new("catA").join("100%.png"));
    }

    #[test]
    fn query_and_fragment_are_dropped() {
        let t = target("http://x.test/img/a.png?token=abc#frag");
        assert_eq!(t.fetch_url, "http://x.test/img/a.png");
        assert_eq!(t.local_path, Path::new("catA").join("a.png"));
    }

    #[test]
    fn explicit_port_is_kept() {
        let t = target("http://x.test:8080/a.png");
        assert_eq!(t.fetch_url, "http://x.test:8080/a.png");
    }

    #[test]
    fn directory_segments_are_left_as_written() {
        let t = target("http://x.test/deep/er/path/f.png");
        assert_eq!(t.fetch_url, "http://x.test/deep/er/path/f.png");
        assert_eq!(t.local_path, Path::new("catA").join("f.png"));
    }

    #[test]
    fn rejects_unparseable_and_pathless_urls() {
        assert!(resolve("not a url", Path::new("catA")).is_err());
        assert!(resolve("mailto:someone@x.test", Path::new("catA")).is_err());
        assert!(resolve("http://x.test", Path::new("catA")).is_err());
        assert!(resolve("http://x.test/", Path::new("catA")).is_err());
        assert!(resolve("http://x.test/dir/", Path::new("catA")).is_err());
    }

    #[test]
    fn error_names_the_offending_url() {
        let err = resolve("http://x.test/", Path::new("catA")).unwrap_err();
        assert!(err.to_string().contains("http://x.test/"));
    }
}
