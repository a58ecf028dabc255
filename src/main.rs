mod commute;
mod config;
mod error;
mod exit_codes;
mod exporter;
mod importer;
mod journey;
mod logging;
mod parser;
mod publisher;
mod pubsub;
mod rename;
mod store;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};

use config::{PublishConfig, Settings};
use exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_FILE, EXIT_SINK, EXIT_STORE, EXIT_SUCCESS};
use exporter::ExportOptions;
use store::Store;

/// Oyster card CSV importer.
///
/// Loads Oyster statement exports into a local SQLite database, exports them as JSON
/// and forwards new journeys to a Pub/Sub topic.
#[derive(Parser)]
#[command(name = "oyster-import", version, about)]
struct Cli {
    /// Database file, overrides the settings file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// TOML settings file [default: oyster.toml, if present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import one or more Oyster CSV files, skipping journeys already stored
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print stored journeys as a JSON array, latest first
    Export {
        /// Only Tue/Wed/Thu journeys started 07:00-09:59 and touched out
        #[arg(short, long)]
        commute_only: bool,

        /// Only the chronologically last journey
        #[arg(short, long)]
        tail: bool,
    },

    /// Publish unprocessed journeys to Pub/Sub (needs GCP_PROJECT_ID and GCP_PUBSUB_TOPIC)
    Publish,

    /// Rename Oyster CSV files to <earliest>_<latest>.csv after the dates they cover
    Rename {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// A failure that ends the command, with the exit code to report.
struct Fatal {
    code: u8,
    message: String,
}

impl Fatal {
    fn new(code: u8, message: impl ToString) -> Self {
        Fatal {
            code,
            message: message.to_string(),
        }
    }
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(Fatal { code, message }) => {
            error!("{message}");
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), Fatal> {
    let settings =
        Settings::load(cli.config.as_deref()).map_err(|e| Fatal::new(EXIT_CONFIG, e))?;
    let db_path = cli.db.unwrap_or(settings.database.path);
    let open_store = || {
        Store::open(&db_path)
            .map_err(|e| Fatal::new(EXIT_STORE, format!("error initializing database: {e}")))
    };

    match cli.command {
        Commands::Import { files } => {
            let store = open_store()?;
            let summary = importer::import_files(&store, &files);
            if !summary.failed_files.is_empty() {
                return Err(Fatal::new(
                    EXIT_FILE,
                    format!("{} file(s) could not be read", summary.failed_files.len()),
                ));
            }
        }
        Commands::Export { commute_only, tail } => {
            let store = open_store()?;
            let options = ExportOptions { commute_only, tail };
            let journeys = exporter::select_journeys(&store, options)
                .map_err(|e| Fatal::new(EXIT_STORE, format!("error querying journeys: {e}")))?;
            utils::write_json_pretty(std::io::stdout().lock(), &journeys)
                .map_err(|e| Fatal::new(EXIT_ERROR, format!("error writing journeys: {e}")))?;
        }
        Commands::Publish => {
            // Configuration is checked before anything is read
            let config = PublishConfig::from_env(&settings.pubsub)
                .map_err(|e| Fatal::new(EXIT_CONFIG, e))?;
            let store = open_store()?;
            let mut sink = pubsub::PubSubSink::new(&config)
                .map_err(|e| Fatal::new(EXIT_SINK, format!("error creating pubsub client: {e}")))?;
            let report = publisher::publish_unprocessed(&store, &mut sink)
                .map_err(|e| Fatal::new(EXIT_STORE, format!("error querying journeys: {e}")))?;
            if report.failed > 0 {
                warn!(
                    failed = report.failed,
                    "some journeys were not published and will be retried next run"
                );
            }
            println!("Published {} journeys to Pub/Sub.", report.published);
        }
        Commands::Rename { files } => {
            let failed = rename::rename_files(&files);
            if failed > 0 {
                return Err(Fatal::new(
                    EXIT_FILE,
                    format!("{failed} file(s) could not be renamed"),
                ));
            }
        }
    }

    Ok(())
}
