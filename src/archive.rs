use std::fs::File;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::TrackerError;

/// What a day's snapshot request produced. A non-success status is ordinary
/// feed behavior (archives only exist for some days), not an error.
#[derive(Debug, Clone)]
pub enum DownloadStatus {
    Saved,
    Unavailable { status: u16 },
}

pub trait SnapshotClient: Send + Sync {
    fn download_snapshot(
        &self,
        date: NaiveDate,
        destination: &Path,
    ) -> Result<DownloadStatus, TrackerError>;
}

#[derive(Clone)]
pub struct HttpSnapshotClient {
    client: Client,
    base_url: String,
}

impl HttpSnapshotClient {
    pub fn new() -> Result<Self, TrackerError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("tcg-pt/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| TrackerError::ArchiveHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| TrackerError::ArchiveHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: "https://tcgcsv.com/archive/tcgplayer".to_string(),
        })
    }

    pub fn new_with_base_url(base_url: String) -> Result<Self, TrackerError> {
        let mut client = Self::new()?;
        client.base_url = base_url;
        Ok(client)
    }

    pub fn snapshot_url(&self, date: NaiveDate) -> String {
        format!("{}/{}", self.base_url, archive_filename(date))
    }
}

impl SnapshotClient for HttpSnapshotClient {
    fn download_snapshot(
        &self,
        date: NaiveDate,
        destination: &Path,
    ) -> Result<DownloadStatus, TrackerError> {
        let url = self.snapshot_url(date);
        let mut response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| TrackerError::ArchiveHttp(err.to_string()))?;

        if !response.status().is_success() {
            return Ok(DownloadStatus::Unavailable {
                status: response.status().as_u16(),
            });
        }

        let mut file =
            File::create(destination).map_err(|err| TrackerError::Filesystem(err.to_string()))?;
        std::io::copy(&mut response, &mut file)
            .map_err(|err| TrackerError::Filesystem(err.to_string()))?;
        Ok(DownloadStatus::Saved)
    }
}

/// The feed names archives `prices-YYYY-MM-DD.ppmd.7z`.
pub fn archive_filename(date: NaiveDate) -> String {
    format!("prices-{}.ppmd.7z", date.format("%Y-%m-%d"))
}
