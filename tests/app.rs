use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use camino::Utf8PathBuf;
use chrono::NaiveDate;

use tcg_price_tracker::app::{App, HistoryOptions};
use tcg_price_tracker::archive::{DownloadStatus, SnapshotClient};
use tcg_price_tracker::domain::{DateRange, GroupId, ProductId, parse_date};
use tcg_price_tracker::error::TrackerError;
use tcg_price_tracker::extract::{ExtractOutcome, Extractor};
use tcg_price_tracker::output::JsonOutput;
use tcg_price_tracker::store::HistoryStore;

/// Scripted per-day feed behavior.
#[derive(Clone)]
enum Day {
    Listing(String),
    Unavailable(u16),
    TransportError,
    CorruptArchive,
    EmptyArchive,
}

struct MockSnapshots {
    days: HashMap<NaiveDate, Day>,
}

impl SnapshotClient for MockSnapshots {
    fn download_snapshot(
        &self,
        date: NaiveDate,
        destination: &Path,
    ) -> Result<DownloadStatus, TrackerError> {
        match self.days.get(&date) {
            Some(Day::Unavailable(status)) => Ok(DownloadStatus::Unavailable { status: *status }),
            Some(Day::TransportError) => {
                Err(TrackerError::ArchiveHttp("connection reset".to_string()))
            }
            Some(Day::Listing(content)) => {
                fs::write(destination, content).unwrap();
                Ok(DownloadStatus::Saved)
            }
            Some(Day::CorruptArchive) => {
                fs::write(destination, b"CORRUPT").unwrap();
                Ok(DownloadStatus::Saved)
            }
            Some(Day::EmptyArchive) => {
                fs::write(destination, b"EMPTY").unwrap();
                Ok(DownloadStatus::Saved)
            }
            None => Ok(DownloadStatus::Unavailable { status: 404 }),
        }
    }
}

/// Expands the mock "archive" (the raw listing text) into the directory
/// layout real archives use, and checks that earlier days' artifacts were
/// cleaned up before each new extraction.
struct MockExtractor {
    group: String,
    saw_stale_artifacts: Arc<Mutex<bool>>,
}

impl MockExtractor {
    fn new(group: &str) -> Self {
        Self {
            group: group.to_string(),
            saw_stale_artifacts: Arc::new(Mutex::new(false)),
        }
    }
}

impl Extractor for MockExtractor {
    fn extract(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> Result<ExtractOutcome, TrackerError> {
        let work_dir = archive.parent().unwrap();
        let entries = fs::read_dir(work_dir).unwrap().count();
        // Only this day's archive may be present when extraction starts.
        if entries > 1 {
            *self.saw_stale_artifacts.lock().unwrap() = true;
        }

        let content = fs::read_to_string(archive).unwrap();
        if content == "CORRUPT" {
            return Ok(ExtractOutcome::Failed {
                reason: "unexpected end of archive".to_string(),
            });
        }

        // prices-YYYY-MM-DD.ppmd.7z -> YYYY-MM-DD
        let name = archive.file_name().unwrap().to_str().unwrap();
        let date = name
            .strip_prefix("prices-")
            .and_then(|rest| rest.strip_suffix(".ppmd.7z"))
            .unwrap();

        let date_dir = destination.join(date);
        if content == "EMPTY" {
            fs::create_dir_all(&date_dir).unwrap();
            return Ok(ExtractOutcome::Extracted);
        }

        let listing_dir = date_dir.join("3").join(&self.group);
        fs::create_dir_all(&listing_dir).unwrap();
        fs::write(listing_dir.join("prices"), content).unwrap();
        Ok(ExtractOutcome::Extracted)
    }
}

fn listing(product: &str, price: f64) -> Day {
    Day::Listing(format!(
        r#"{{"results":[{{"productId":{product},"marketPrice":{price}}}]}}"#
    ))
}

fn setup(temp: &tempfile::TempDir) -> HistoryStore {
    let root = Utf8PathBuf::from_path_buf(temp.path().join("history")).unwrap();
    HistoryStore::new_with_root(root)
}

#[test]
fn history_covers_every_day_and_fills_gaps() {
    let temp = tempfile::tempdir().unwrap();
    let store = setup(&temp);
    let group: GroupId = "2178".parse().unwrap();
    let product: ProductId = "155663".parse().unwrap();

    let start = parse_date("2024-10-30").unwrap();
    let mut days = HashMap::new();
    days.insert(start, listing("155663", 5.0));
    days.insert(start.succ_opt().unwrap(), Day::Unavailable(404));
    days.insert(parse_date("2024-11-01").unwrap(), Day::TransportError);
    days.insert(parse_date("2024-11-02").unwrap(), Day::CorruptArchive);
    days.insert(parse_date("2024-11-03").unwrap(), listing("155663", 9.0));

    let extractor = MockExtractor::new("2178");
    let app = App::new(store.clone(), MockSnapshots { days }, extractor);
    let range = DateRange::new(start, parse_date("2024-11-03").unwrap()).unwrap();

    let result = app
        .fetch_history(
            range,
            &group,
            &product,
            HistoryOptions { dry_run: false },
            &JsonOutput,
        )
        .unwrap();

    assert_eq!(result.days.len(), 5);
    assert!(
        result
            .days
            .windows(2)
            .all(|pair| pair[0].date < pair[1].date)
    );

    let raw: Vec<Option<f64>> = result.days.iter().map(|day| day.market_price).collect();
    assert_eq!(raw, vec![Some(5.0), None, None, None, Some(9.0)]);

    let filled: Vec<Option<f64>> = result.days.iter().map(|day| day.filled_price).collect();
    assert_eq!(
        filled,
        vec![Some(5.0), Some(7.0), Some(7.0), Some(7.0), Some(9.0)]
    );

    assert!(result.days[0].reason.is_none());
    assert!(result.days[1].reason.as_deref().unwrap().contains("404"));
    assert!(
        result.days[2]
            .reason
            .as_deref()
            .unwrap()
            .contains("request failed")
    );
    assert!(
        result.days[3]
            .reason
            .as_deref()
            .unwrap()
            .contains("extraction failed")
    );

    assert_eq!(result.written, 5);
    let record = store
        .read_record(&group, &product, parse_date("2024-10-31").unwrap())
        .unwrap();
    assert_eq!(record.market_price, Some(7.0));

    // No transient artifacts survive the run; only the group directory does.
    let leftovers: Vec<String> = fs::read_dir(store.root().as_std_path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(leftovers, vec!["2178".to_string()]);
}

#[test]
fn per_day_cleanup_runs_between_days() {
    let temp = tempfile::tempdir().unwrap();
    let store = setup(&temp);
    let group: GroupId = "2178".parse().unwrap();
    let product: ProductId = "155663".parse().unwrap();

    let start = parse_date("2024-10-30").unwrap();
    let mut days = HashMap::new();
    days.insert(start, listing("155663", 5.0));
    days.insert(start.succ_opt().unwrap(), Day::CorruptArchive);
    days.insert(parse_date("2024-11-01").unwrap(), listing("155663", 6.0));

    let extractor = MockExtractor::new("2178");
    let saw_stale = Arc::clone(&extractor.saw_stale_artifacts);
    let app = App::new(store, MockSnapshots { days }, extractor);
    let range = DateRange::new(start, parse_date("2024-11-01").unwrap()).unwrap();

    app.fetch_history(
        range,
        &group,
        &product,
        HistoryOptions { dry_run: false },
        &JsonOutput,
    )
    .unwrap();

    assert!(!*saw_stale.lock().unwrap());
}

#[test]
fn missing_group_listing_degrades_to_missing_day() {
    let temp = tempfile::tempdir().unwrap();
    let store = setup(&temp);
    let group: GroupId = "2178".parse().unwrap();
    let product: ProductId = "155663".parse().unwrap();

    let start = parse_date("2024-10-30").unwrap();
    let mut days = HashMap::new();
    days.insert(start, Day::EmptyArchive);

    let app = App::new(store, MockSnapshots { days }, MockExtractor::new("2178"));
    let range = DateRange::new(start, start).unwrap();

    let result = app
        .fetch_history(
            range,
            &group,
            &product,
            HistoryOptions { dry_run: false },
            &JsonOutput,
        )
        .unwrap();

    assert_eq!(result.days[0].market_price, None);
    assert!(
        result.days[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("no pricing listing")
    );
}

#[test]
fn dry_run_writes_no_records() {
    let temp = tempfile::tempdir().unwrap();
    let store = setup(&temp);
    let group: GroupId = "2178".parse().unwrap();
    let product: ProductId = "155663".parse().unwrap();

    let start = parse_date("2024-10-30").unwrap();
    let mut days = HashMap::new();
    days.insert(start, listing("155663", 5.0));

    let app = App::new(
        store.clone(),
        MockSnapshots { days },
        MockExtractor::new("2178"),
    );
    let range = DateRange::new(start, start).unwrap();

    let result = app
        .fetch_history(
            range,
            &group,
            &product,
            HistoryOptions { dry_run: true },
            &JsonOutput,
        )
        .unwrap();

    assert_eq!(result.written, 0);
    assert!(result.days[0].record_path.is_none());
    assert!(
        !store
            .record_path(&group, &product, start)
            .as_std_path()
            .exists()
    );
}
