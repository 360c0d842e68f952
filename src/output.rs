use std::io::{self, Write};

use serde::Serialize;

use crate::app::HistoryResult;
use crate::domain::CatalogEntry;
use crate::enrich::EnrichmentStats;

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_history(result: &HistoryResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_enrich(stats: &EnrichmentStats) -> io::Result<()> {
        Self::print_json(stats)
    }

    pub fn print_lookup(entry: &CatalogEntry) -> io::Result<()> {
        Self::print_json(entry)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl crate::app::ProgressSink for JsonOutput {
    fn event(&self, event: crate::app::ProgressEvent) {
        tracing::debug!("{}", event.message);
    }
}
