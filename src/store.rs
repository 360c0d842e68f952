use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;

use crate::domain::{GroupId, PriceRecord, ProductId};
use crate::error::TrackerError;

/// Durable per-day price storage, one JSON file per (group, product, date).
/// Rewrites replace the file wholesale, so identical input yields a
/// byte-identical record.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    root: Utf8PathBuf,
}

impl HistoryStore {
    pub fn new_with_root(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn ensure_root(&self) -> Result<(), TrackerError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| TrackerError::Filesystem(err.to_string()))
    }

    pub fn record_path(
        &self,
        group: &GroupId,
        product: &ProductId,
        date: NaiveDate,
    ) -> Utf8PathBuf {
        self.root
            .join(group.as_str())
            .join(product.as_str())
            .join(format!("{date}.json"))
    }

    pub fn write_record(&self, record: &PriceRecord) -> Result<Utf8PathBuf, TrackerError> {
        let path = self.record_path(&record.group_id, &record.product_id, record.date);
        let content = serde_json::to_vec_pretty(record)
            .map_err(|err| TrackerError::Filesystem(err.to_string()))?;
        write_bytes_atomic(&path, &content)?;
        Ok(path)
    }

    pub fn read_record(
        &self,
        group: &GroupId,
        product: &ProductId,
        date: NaiveDate,
    ) -> Result<PriceRecord, TrackerError> {
        let path = self.record_path(group, product, date);
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| TrackerError::Filesystem(err.to_string()))?;
        serde_json::from_str(&content).map_err(|err| TrackerError::Filesystem(err.to_string()))
    }
}

pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), TrackerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| TrackerError::Filesystem(err.to_string()))?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(tmp_path.as_std_path(), content)
        .map_err(|err| TrackerError::Filesystem(err.to_string()))?;
    fs::rename(tmp_path.as_std_path(), path.as_std_path())
        .map_err(|err| TrackerError::Filesystem(err.to_string()))?;
    Ok(())
}
