use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::archive::{DownloadStatus, SnapshotClient, archive_filename};
use crate::catalog::Catalog;
use crate::config::ResolvedConfig;
use crate::domain::{DateRange, DaySample, GroupId, MissingReason, PriceRecord, PriceSample, ProductId};
use crate::enrich::{EnrichmentStats, enrich_transactions};
use crate::error::TrackerError;
use crate::extract::{ExtractOutcome, Extractor};
use crate::fill::fill_gaps;
use crate::fs_util;
use crate::store::HistoryStore;

#[derive(Debug, Clone, Copy)]
pub struct HistoryOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResult {
    pub group_id: String,
    pub product_id: String,
    pub days: Vec<DayResult>,
    pub written: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayResult {
    pub date: NaiveDate,
    pub market_price: Option<f64>,
    pub filled_price: Option<f64>,
    pub reason: Option<String>,
    pub record_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Clone)]
pub struct App<S: SnapshotClient, E: Extractor> {
    store: HistoryStore,
    snapshots: S,
    extractor: E,
}

impl<S: SnapshotClient, E: Extractor> App<S, E> {
    pub fn new(store: HistoryStore, snapshots: S, extractor: E) -> Self {
        Self {
            store,
            snapshots,
            extractor,
        }
    }

    /// Rebuilds the daily price history for one (group, product) pair over a
    /// date range: fetch each day's archive, fill the gaps, persist one
    /// record per day. A failed day degrades to a missing sample and the
    /// loop always covers the whole range.
    pub fn fetch_history(
        &self,
        range: DateRange,
        group: &GroupId,
        product: &ProductId,
        options: HistoryOptions,
        sink: &dyn ProgressSink,
    ) -> Result<HistoryResult, TrackerError> {
        self.store.ensure_root()?;
        let work_dir = tempfile::Builder::new()
            .prefix("tcg-pt-work")
            .tempdir_in(self.store.root().as_std_path())
            .map_err(|err| TrackerError::Filesystem(err.to_string()))?;

        let mut outcomes = Vec::with_capacity(range.len());
        for date in range.days() {
            sink.event(ProgressEvent {
                message: format!("phase=Fetch; day {date}"),
            });
            let archive_path = work_dir.path().join(archive_filename(date));
            let extract_dir = work_dir.path().join(format!("extract-{date}"));

            let outcome = self.fetch_day(date, group, &archive_path, &extract_dir, product);
            // Cleanup runs after every day, success or failure.
            fs_util::remove_day_artifacts(&archive_path, &extract_dir);
            let outcome = outcome?;
            if let DaySample::Missing(reason) = &outcome {
                tracing::warn!(%date, %reason, "no usable price for day");
            }
            outcomes.push((date, outcome));
        }

        sink.event(ProgressEvent {
            message: "phase=Fill; interpolating gaps".to_string(),
        });
        let samples: Vec<PriceSample> = outcomes
            .iter()
            .map(|(date, outcome)| PriceSample {
                date: *date,
                market_price: outcome.market_price(),
            })
            .collect();
        let filled = fill_gaps(&samples);

        sink.event(ProgressEvent {
            message: "phase=Store; writing records".to_string(),
        });
        let mut days = Vec::with_capacity(filled.len());
        let mut written = 0usize;
        for ((date, outcome), filled_sample) in outcomes.iter().zip(&filled) {
            let record_path = if options.dry_run {
                None
            } else {
                let record = PriceRecord {
                    date: *date,
                    group_id: group.clone(),
                    product_id: product.clone(),
                    market_price: filled_sample.market_price,
                };
                let path = self.store.write_record(&record)?;
                written += 1;
                Some(path.to_string())
            };
            days.push(DayResult {
                date: *date,
                market_price: outcome.market_price(),
                filled_price: filled_sample.market_price,
                reason: match outcome {
                    DaySample::Price(_) => None,
                    DaySample::Missing(reason) => Some(reason.to_string()),
                },
                record_path,
            });
        }

        Ok(HistoryResult {
            group_id: group.to_string(),
            product_id: product.to_string(),
            days,
            written,
        })
    }

    fn fetch_day(
        &self,
        date: NaiveDate,
        group: &GroupId,
        archive_path: &Path,
        extract_dir: &Path,
        product: &ProductId,
    ) -> Result<DaySample, TrackerError> {
        match self.snapshots.download_snapshot(date, archive_path) {
            Ok(DownloadStatus::Saved) => {}
            Ok(DownloadStatus::Unavailable { status }) => {
                return Ok(DaySample::Missing(MissingReason::SnapshotUnavailable {
                    status,
                }));
            }
            // Transport failures are ordinary feed trouble; anything else
            // (filesystem and the like) is a real error and propagates.
            Err(TrackerError::ArchiveHttp(message)) => {
                return Ok(DaySample::Missing(MissingReason::RequestFailed(message)));
            }
            Err(err) => return Err(err),
        }

        match self.extractor.extract(archive_path, extract_dir)? {
            ExtractOutcome::Extracted => {}
            ExtractOutcome::Failed { reason } => {
                return Ok(DaySample::Missing(MissingReason::ExtractionFailed(reason)));
            }
        }

        // Archives expand into a directory named after the date, holding a
        // per-group listing at ./3/{groupId}/prices.
        let listing = extract_dir
            .join(date.to_string())
            .join("3")
            .join(group.as_str())
            .join("prices");
        if !listing.exists() {
            return Ok(DaySample::Missing(MissingReason::ListingAbsent));
        }

        let content = match fs::read_to_string(&listing) {
            Ok(content) => content,
            Err(err) => {
                return Ok(DaySample::Missing(MissingReason::MalformedListing(
                    err.to_string(),
                )));
            }
        };
        Ok(parse_listing(&content, product))
    }

    /// Enriches the configured transaction ledger against the catalog.
    pub fn enrich(
        &self,
        config: &ResolvedConfig,
        sink: &dyn ProgressSink,
    ) -> Result<EnrichmentStats, TrackerError> {
        sink.event(ProgressEvent {
            message: "phase=Resolve; loading catalog".to_string(),
        });
        let catalog = Catalog::load(&config.catalog)?;
        sink.event(ProgressEvent {
            message: "phase=Enrich; matching rows".to_string(),
        });
        enrich_transactions(
            &config.transactions,
            &catalog,
            &config.enriched_output,
            &config.item_field,
        )
    }

    pub fn lookup_by_ids(
        &self,
        config: &ResolvedConfig,
        group: &GroupId,
        product: &ProductId,
        sink: &dyn ProgressSink,
    ) -> Result<crate::domain::CatalogEntry, TrackerError> {
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; looking up {group}:{product}"),
        });
        let catalog = Catalog::load(&config.catalog)?;
        catalog
            .find_by_ids(group, product)
            .cloned()
            .ok_or_else(|| TrackerError::EntryNotFound(format!("{group}:{product}")))
    }

    pub fn lookup_by_name(
        &self,
        config: &ResolvedConfig,
        name: &str,
        sink: &dyn ProgressSink,
    ) -> Result<crate::domain::CatalogEntry, TrackerError> {
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; looking up {name:?}"),
        });
        let catalog = Catalog::load(&config.catalog)?;
        catalog
            .find_by_name(name)
            .cloned()
            .ok_or_else(|| TrackerError::EntryNotFound(name.to_string()))
    }
}

/// Scans a listing document for the requested product's market price.
/// Product ids are compared as text because the feed is inconsistent about
/// numbers versus strings.
fn parse_listing(content: &str, product: &ProductId) -> DaySample {
    let value: serde_json::Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(err) => return DaySample::Missing(MissingReason::MalformedListing(err.to_string())),
    };
    let Some(results) = value.get("results").and_then(|v| v.as_array()) else {
        return DaySample::Missing(MissingReason::MalformedListing(
            "missing results list".to_string(),
        ));
    };

    let Some(entry) = results.iter().find(|candidate| {
        candidate
            .get("productId")
            .map(|id| value_as_text(id) == product.as_str())
            .unwrap_or(false)
    }) else {
        return DaySample::Missing(MissingReason::ProductAbsent);
    };

    match entry.get("marketPrice") {
        Some(serde_json::Value::Number(number)) => match number.as_f64() {
            Some(price) => DaySample::Price(price),
            None => DaySample::Missing(MissingReason::PriceAbsent),
        },
        Some(serde_json::Value::String(text)) => match text.trim().parse::<f64>() {
            Ok(price) => DaySample::Price(price),
            Err(_) => DaySample::Missing(MissingReason::PriceAbsent),
        },
        _ => DaySample::Missing(MissingReason::PriceAbsent),
    }
}

fn value_as_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
