use std::fs;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("feed returned HTTP status {0}")]
    Status(u16),
    #[error("could not read {path}: {reason}")]
    File { path: String, reason: String },
    #[error("built without network support; pass --file or enable the `network` feature")]
    NetworkDisabled,
}

/// Where the raw question feed comes from. The engine only sees the
/// resulting text (or error); retry redrives the same source.
#[derive(Clone, Debug)]
pub enum FeedSource {
    Remote(String),
    File(PathBuf),
}

impl FeedSource {
    pub fn load(&self) -> Result<String, FetchError> {
        match self {
            FeedSource::Remote(url) => fetch_feed(url),
            FeedSource::File(path) => fs::read_to_string(path).map_err(|e| FetchError::File {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FeedSource::Remote(_) => "remote feed".to_string(),
            FeedSource::File(path) => path.display().to_string(),
        }
    }
}

#[cfg(feature = "network")]
pub fn fetch_feed(url: &str) -> Result<String, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(|e| FetchError::Http(e.to_string()))?;
    let response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::Http(e.to_string()))?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status().as_u16()));
    }
    response.text().map_err(|e| FetchError::Http(e.to_string()))
}

#[cfg(not(feature = "network"))]
pub fn fetch_feed(_url: &str) -> Result<String, FetchError> {
    Err(FetchError::NetworkDisabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_reads_contents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bank.csv");
        fs::write(&path, "header\nrow\n").unwrap();
        let text = FeedSource::File(path).load().unwrap();
        assert_eq!(text, "header\nrow\n");
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let err = FeedSource::File(PathBuf::from("/no/such/bank.csv"))
            .load()
            .unwrap_err();
        assert!(matches!(err, FetchError::File { .. }));
        assert!(err.to_string().contains("/no/such/bank.csv"));
    }
}
