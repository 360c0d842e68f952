use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use tcg_price_tracker::app::{App, HistoryOptions};
use tcg_price_tracker::archive::{HttpSnapshotClient, SnapshotClient};
use tcg_price_tracker::config::ConfigLoader;
use tcg_price_tracker::domain::{DateRange, GroupId, ProductId, parse_date};
use tcg_price_tracker::error::TrackerError;
use tcg_price_tracker::extract::{ExtractOutcome, Extractor, SevenZipExtractor};
use tcg_price_tracker::output::JsonOutput;
use tcg_price_tracker::store::HistoryStore;

#[derive(Parser)]
#[command(name = "tcg-pt")]
#[command(about = "Daily price history and purchase-ledger enrichment for collectible card products")]
#[command(version, author)]
struct Cli {
    /// Path to the config file (default: tcg-tracker.json if present)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Rebuild the daily price history for one product over a date range")]
    History(HistoryArgs),
    #[command(about = "Match transaction rows against the catalog and write an enriched copy")]
    Enrich(EnrichArgs),
    #[command(about = "Look up a catalog entry by id pair or exact name")]
    Lookup(LookupArgs),
}

#[derive(Args)]
struct HistoryArgs {
    #[arg(long)]
    start: String,

    #[arg(long)]
    end: String,

    #[arg(long)]
    group: String,

    #[arg(long)]
    product: String,

    /// Fetch and fill without writing price records
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct EnrichArgs {
    /// Column holding the item name (default from config, then "Item")
    #[arg(long)]
    item_field: Option<String>,
}

#[derive(Args)]
struct LookupArgs {
    /// Group id, paired with PRODUCT
    group: Option<String>,

    /// Product id
    product: Option<String>,

    /// Exact catalog name instead of an id pair
    #[arg(long, conflicts_with_all = ["group", "product"])]
    name: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(tracker) = report.downcast_ref::<TrackerError>() {
            return ExitCode::from(map_exit_code(tracker));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &TrackerError) -> u8 {
    match error {
        TrackerError::EntryNotFound(_) | TrackerError::MissingCatalog(_) => 2,
        TrackerError::ArchiveHttp(_) | TrackerError::MissingTool(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref()).into_diagnostic()?;
    let store = HistoryStore::new_with_root(config.history_root.clone());

    match cli.command {
        Commands::History(args) => {
            let start = parse_date(&args.start).into_diagnostic()?;
            let end = parse_date(&args.end).into_diagnostic()?;
            let range = DateRange::new(start, end).into_diagnostic()?;
            let group: GroupId = args.group.parse().into_diagnostic()?;
            let product: ProductId = args.product.parse().into_diagnostic()?;

            let snapshots = HttpSnapshotClient::new().into_diagnostic()?;
            let extractor = SevenZipExtractor::new();
            let app = App::new(store, snapshots, extractor);
            let options = HistoryOptions {
                dry_run: args.dry_run,
            };
            let result = app
                .fetch_history(range, &group, &product, options, &JsonOutput)
                .into_diagnostic()?;
            JsonOutput::print_history(&result).into_diagnostic()?;
            Ok(())
        }
        Commands::Enrich(args) => {
            let mut config = config;
            if let Some(item_field) = args.item_field {
                config.item_field = item_field;
            }
            let app = App::new(store, NopSnapshots, NopExtractor);
            let stats = app.enrich(&config, &JsonOutput).into_diagnostic()?;
            JsonOutput::print_enrich(&stats).into_diagnostic()?;
            Ok(())
        }
        Commands::Lookup(args) => {
            let app = App::new(store, NopSnapshots, NopExtractor);
            let entry = match (&args.name, &args.group, &args.product) {
                (Some(name), _, _) => app
                    .lookup_by_name(&config, name, &JsonOutput)
                    .into_diagnostic()?,
                (None, Some(group), Some(product)) => {
                    let group: GroupId = group.parse().into_diagnostic()?;
                    let product: ProductId = product.parse().into_diagnostic()?;
                    app.lookup_by_ids(&config, &group, &product, &JsonOutput)
                        .into_diagnostic()?
                }
                _ => {
                    return Err(miette::Report::msg(
                        "lookup requires GROUP PRODUCT or --name",
                    ));
                }
            };
            JsonOutput::print_lookup(&entry).into_diagnostic()?;
            Ok(())
        }
    }
}

struct NopSnapshots;
struct NopExtractor;

impl SnapshotClient for NopSnapshots {
    fn download_snapshot(
        &self,
        _date: chrono::NaiveDate,
        _destination: &std::path::Path,
    ) -> Result<tcg_price_tracker::archive::DownloadStatus, TrackerError> {
        Err(TrackerError::ArchiveHttp(
            "snapshot client not configured".to_string(),
        ))
    }
}

impl Extractor for NopExtractor {
    fn extract(
        &self,
        _archive: &std::path::Path,
        _destination: &std::path::Path,
    ) -> Result<ExtractOutcome, TrackerError> {
        Err(TrackerError::MissingTool(
            "extractor not configured".to_string(),
        ))
    }
}
