//! Fetch a linked file (typically an entry's PDF) to a local path.

use std::fs;
use std::path::Path;

use tracing::info;
use url::Url;

use crate::arxiv::SourceError;
use crate::http::HttpClient;

pub struct FileDownloader {
    http: HttpClient,
}

impl FileDownloader {
    pub fn new() -> Self {
        Self {
            http: HttpClient::new("shelfmark/0.1 (reference catalogue)"),
        }
    }

    /// Download `url` into `dest`. The transfer is a single GET with no
    /// resume or retry; a failed write leaves no partial bookkeeping behind.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<(), SourceError> {
        let bytes = self.http.get_bytes(url).await?;
        fs::write(dest, &bytes)?;
        info!(url, dest = %dest.display(), size = bytes.len(), "file downloaded");
        Ok(())
    }

    /// Suggest a local file name from the URL's last path segment.
    pub fn file_name_for(url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let segment = parsed
            .path_segments()?
            .filter(|s| !s.is_empty())
            .next_back()?
            .to_string();
        if segment.is_empty() {
            None
        } else {
            Some(segment)
        }
    }
}

impl Default for FileDownloader {
    fn default() -> Self {
        Self::new()
    }
}
