use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GroupId {
    type Err = TrackerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        let is_valid =
            !normalized.is_empty() && normalized.chars().all(|ch| ch.is_ascii_digit());
        if !is_valid {
            return Err(TrackerError::InvalidGroupId(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = TrackerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        let is_valid =
            !normalized.is_empty() && normalized.chars().all(|ch| ch.is_ascii_digit());
        if !is_valid {
            return Err(TrackerError::InvalidProductId(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, TrackerError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| TrackerError::InvalidDate(value.to_string()))
}

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TrackerError> {
        if start > end {
            return Err(TrackerError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        self.start.iter_days().take(self.len())
    }
}

/// One day's sample as produced by the archive fetcher. `None` means the
/// feed had no usable price for that day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub date: NaiveDate,
    pub market_price: Option<f64>,
}

/// Why a day's sample degraded to `None`. Only these enumerated
/// external-feed conditions degrade; everything else propagates as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum MissingReason {
    SnapshotUnavailable { status: u16 },
    RequestFailed(String),
    ExtractionFailed(String),
    ListingAbsent,
    ProductAbsent,
    PriceAbsent,
    MalformedListing(String),
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingReason::SnapshotUnavailable { status } => {
                write!(f, "snapshot unavailable (status {status})")
            }
            MissingReason::RequestFailed(message) => write!(f, "request failed: {message}"),
            MissingReason::ExtractionFailed(message) => {
                write!(f, "extraction failed: {message}")
            }
            MissingReason::ListingAbsent => write!(f, "no pricing listing for group"),
            MissingReason::ProductAbsent => write!(f, "product not present in listing"),
            MissingReason::PriceAbsent => write!(f, "no numeric market price for product"),
            MissingReason::MalformedListing(message) => {
                write!(f, "malformed listing: {message}")
            }
        }
    }
}

/// Per-day fetch outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum DaySample {
    Price(f64),
    Missing(MissingReason),
}

impl DaySample {
    pub fn market_price(&self) -> Option<f64> {
        match self {
            DaySample::Price(value) => Some(*value),
            DaySample::Missing(_) => None,
        }
    }
}

/// Persisted price record, one JSON file per (date, group, product).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub group_id: GroupId,
    pub product_id: ProductId,
    pub market_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub group_id: String,
    pub product_id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category_id: i64,
    #[serde(default)]
    pub url: String,
}
