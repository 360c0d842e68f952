use std::collections::BTreeSet;

use camino::Utf8Path;
use csv::StringRecord;
use serde::Serialize;

use crate::catalog::{Catalog, NameIndex};
use crate::error::TrackerError;

pub const DEFAULT_ITEM_FIELD: &str = "Item";
const PRODUCT_COLUMN: &str = "productId";
const GROUP_COLUMN: &str = "groupId";

#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentStats {
    pub matched_count: usize,
    pub unmatched_count: usize,
    pub unmatched_items: Vec<String>,
    pub output_path: String,
}

/// Matches each transaction row's item text against the catalog and writes
/// an enriched copy with `productId`/`groupId` columns filled in. The input
/// file is never modified. A missing transaction source is treated as an
/// empty ledger, not an error.
pub fn enrich_transactions(
    transactions: &Utf8Path,
    catalog: &Catalog,
    output: &Utf8Path,
    item_field: &str,
) -> Result<EnrichmentStats, TrackerError> {
    if !transactions.as_std_path().exists() {
        return Ok(EnrichmentStats {
            matched_count: 0,
            unmatched_count: 0,
            unmatched_items: Vec::new(),
            output_path: output.to_string(),
        });
    }

    let index = NameIndex::build(catalog);

    let mut reader = csv::Reader::from_path(transactions.as_std_path())
        .map_err(|err| TrackerError::Transactions(err.to_string()))?;
    let headers = reader
        .headers()
        .map_err(|err| TrackerError::Transactions(err.to_string()))?
        .clone();

    let item_index = headers.iter().position(|name| name == item_field);
    let product_index = headers.iter().position(|name| name == PRODUCT_COLUMN);
    let group_index = headers.iter().position(|name| name == GROUP_COLUMN);

    let mut out_headers: Vec<String> = headers.iter().map(str::to_string).collect();
    if product_index.is_none() {
        out_headers.push(PRODUCT_COLUMN.to_string());
    }
    if group_index.is_none() {
        out_headers.push(GROUP_COLUMN.to_string());
    }

    let mut writer = csv::Writer::from_path(output.as_std_path())
        .map_err(|err| TrackerError::Filesystem(err.to_string()))?;
    writer
        .write_record(&out_headers)
        .map_err(|err| TrackerError::Filesystem(err.to_string()))?;

    let mut matched_count = 0usize;
    let mut unmatched_items = Vec::new();

    for record in reader.records() {
        let record: StringRecord =
            record.map_err(|err| TrackerError::Transactions(err.to_string()))?;
        let item = item_index.and_then(|i| record.get(i)).unwrap_or("");

        let found = index.match_item(item);
        let (product_value, group_value) = match found {
            Some(entry) => {
                matched_count += 1;
                (entry.product_id.clone(), entry.group_id.clone())
            }
            None => {
                unmatched_items.push(item.to_string());
                (String::new(), String::new())
            }
        };

        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
        match product_index {
            Some(i) => fields[i] = product_value,
            None => fields.push(product_value),
        }
        match group_index {
            Some(i) => fields[i] = group_value,
            None => fields.push(group_value),
        }
        writer
            .write_record(&fields)
            .map_err(|err| TrackerError::Filesystem(err.to_string()))?;
    }

    writer
        .flush()
        .map_err(|err| TrackerError::Filesystem(err.to_string()))?;

    let unmatched_count = unmatched_items.len();
    let deduplicated: BTreeSet<String> = unmatched_items.into_iter().collect();

    Ok(EnrichmentStats {
        matched_count,
        unmatched_count,
        unmatched_items: deduplicated.into_iter().collect(),
        output_path: output.to_string(),
    })
}
