use std::fs;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::enrich::DEFAULT_ITEM_FIELD;
use crate::error::TrackerError;

/// On-disk config file (`tcg-tracker.json` in the working directory by
/// default). Every field is optional; defaults are applied during resolve.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub transactions: Option<String>,
    #[serde(default)]
    pub enriched_output: Option<String>,
    #[serde(default)]
    pub item_field: Option<String>,
    #[serde(default)]
    pub history_root: Option<String>,
}

/// Fully-defaulted configuration, constructed by the caller and passed into
/// each operation explicitly.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub catalog: Utf8PathBuf,
    pub transactions: Utf8PathBuf,
    pub enriched_output: Utf8PathBuf,
    pub item_field: String,
    pub history_root: Utf8PathBuf,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, TrackerError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from("tcg-tracker.json"),
        };

        if path.is_none() && !config_path.as_std_path().exists() {
            // Absent default config means "all defaults", unlike an
            // explicitly named file, which must exist.
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| TrackerError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| TrackerError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, TrackerError> {
        Ok(ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(1),
            catalog: Utf8PathBuf::from(
                config.catalog.unwrap_or_else(|| "catalog.json".to_string()),
            ),
            transactions: Utf8PathBuf::from(
                config
                    .transactions
                    .unwrap_or_else(|| "transactions.csv".to_string()),
            ),
            enriched_output: Utf8PathBuf::from(
                config
                    .enriched_output
                    .unwrap_or_else(|| "transactions_enriched.csv".to_string()),
            ),
            item_field: config
                .item_field
                .unwrap_or_else(|| DEFAULT_ITEM_FIELD.to_string()),
            history_root: Utf8PathBuf::from(
                config
                    .history_root
                    .unwrap_or_else(|| "price-history".to_string()),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_config_applies_defaults() {
        let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.catalog, Utf8PathBuf::from("catalog.json"));
        assert_eq!(resolved.transactions, Utf8PathBuf::from("transactions.csv"));
        assert_eq!(
            resolved.enriched_output,
            Utf8PathBuf::from("transactions_enriched.csv")
        );
        assert_eq!(resolved.item_field, "Item");
        assert_eq!(resolved.history_root, Utf8PathBuf::from("price-history"));
    }

    #[test]
    fn resolve_config_keeps_explicit_values() {
        let config = Config {
            schema_version: Some(2),
            catalog: Some("data/mappings.json".to_string()),
            transactions: Some("data/ledger.csv".to_string()),
            enriched_output: Some("out/ledger_enriched.csv".to_string()),
            item_field: Some("Product".to_string()),
            history_root: Some("out/history".to_string()),
        };
        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.schema_version, 2);
        assert_eq!(resolved.catalog, Utf8PathBuf::from("data/mappings.json"));
        assert_eq!(resolved.item_field, "Product");
    }
}
