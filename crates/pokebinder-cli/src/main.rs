mod aggregate;
mod sync;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pokebinder_catalog::CatalogClient;
use pokebinder_core::AppConfig;
use pokebinder_firestore::{FirestoreClient, ServiceAccountKey};

use crate::sync::sink::{DocumentStoreSink, FileSink};
use crate::sync::{SyncOptions, SyncSummary};

#[derive(Debug, Parser)]
#[command(name = "pokebinder-sync")]
#[command(about = "Sync the Pokémon card catalog and prices into PokeBinder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    /// One JSON file per group under the output directory
    File,
    /// One Firestore document per product
    Firestore,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every group's products and prices and write the merged records
    Sync {
        /// Where merged records go
        #[arg(long, value_enum, default_value_t = SinkKind::File)]
        sink: SinkKind,

        /// Restrict the run to a single group id
        #[arg(long)]
        group: Option<u64>,

        /// List the groups that would be synced without fetching them
        #[arg(long)]
        dry_run: bool,

        /// Override POKEBINDER_OUTPUT_DIR for the file sink
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Combine the per-group files into a single catalog file
    Aggregate {
        /// Directory of group files (defaults to POKEBINDER_OUTPUT_DIR)
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Aggregate file to write (defaults to POKEBINDER_AGGREGATE_PATH)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the catalog's groups as `groupId<TAB>name`
    Groups,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = pokebinder_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Sync {
            sink,
            group,
            dry_run,
            output_dir,
        } => run_sync_command(&config, sink, group, dry_run, output_dir).await,
        Commands::Aggregate { input_dir, output } => {
            let input_dir = input_dir.unwrap_or_else(|| config.output_dir.clone());
            let output = output.unwrap_or_else(|| config.aggregate_path.clone());
            let summary = aggregate::run_aggregate(&input_dir, &output).await?;
            println!(
                "aggregated {} records from {} files into {} ({} skipped)",
                summary.records,
                summary.files_read,
                output.display(),
                summary.files_skipped
            );
            Ok(())
        }
        Commands::Groups => {
            let client = build_catalog_client(&config)?;
            for group in sync::load_groups(&client, None).await? {
                println!("{}\t{}", group.group_id, group.name);
            }
            Ok(())
        }
    }
}

fn build_catalog_client(config: &AppConfig) -> anyhow::Result<CatalogClient> {
    CatalogClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build catalog client: {e}"))
}

async fn run_sync_command(
    config: &AppConfig,
    sink_kind: SinkKind,
    group_filter: Option<u64>,
    dry_run: bool,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let client = build_catalog_client(config)?;

    if dry_run {
        let groups = sync::load_groups(&client, group_filter).await?;
        let labels: Vec<String> = groups
            .iter()
            .map(|g| format!("{} ({})", g.group_id, g.name))
            .collect();
        println!(
            "dry-run: would sync {} groups: [{}]",
            groups.len(),
            labels.join(", ")
        );
        return Ok(());
    }

    let options = SyncOptions {
        group_filter,
        inter_group_delay: Duration::from_millis(config.inter_group_delay_ms),
    };

    let summary = match sink_kind {
        SinkKind::File => {
            let mut sink = FileSink::new(output_dir.unwrap_or_else(|| config.output_dir.clone()));
            tracing::info!(dir = %sink.output_dir().display(), "writing group files");
            sync::run_sync(&client, &mut sink, &options).await?
        }
        SinkKind::Firestore => {
            // Credentials are checked before any catalog traffic.
            let key = ServiceAccountKey::from_file(&config.firestore_credentials_path)
                .context("the firestore sink requires a service account key")?;
            let store = FirestoreClient::from_service_account(
                key,
                config.firestore_base_url.as_deref(),
                config.request_timeout_secs,
            )
            .context("failed to build Firestore client")?;
            tracing::info!(
                project = store.project_id(),
                collection = %config.firestore_collection,
                "writing documents to Firestore"
            );
            let mut sink = DocumentStoreSink::new(&store, config.firestore_collection.clone());
            sync::run_sync(&client, &mut sink, &options).await?
        }
    };

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &SyncSummary) {
    println!(
        "synced {} records across {} groups ({} empty, {} failed)",
        summary.records_written,
        summary.groups_written,
        summary.groups_empty,
        summary.groups_failed
    );
}
