//! Roster - Main entrypoint.
//!
//! Loads configuration, initializes logging, opens the record store and runs
//! either the interactive shell or a single command.

use clap::{Parser, Subcommand};
use roster_lib::config::{self, ConfigLoader, LogConfig, RosterConfig, ENV_PREFIX};
use roster_lib::error::{
    report_error, set_error_reporter, ErrorContext, RosterError, RosterResult, StoreError,
    TracingErrorReporter,
};
use roster_lib::shell::Shell;
use roster_lib::store::{FlatFileRepository, Lookup, Record, RecordStore, RecordUpdate};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line arguments for Roster.
#[derive(Parser, Debug)]
#[clap(name = "roster", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Data file, overriding the configured one
    #[clap(short, long, value_parser)]
    data: Option<PathBuf>,

    /// Command to execute
    #[clap(subcommand)]
    command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the interactive menu
    Shell,

    /// Add a record
    Add {
        /// Unique record number
        id: String,
        /// Display name
        name: String,
        /// Category label
        category: String,
        /// Numeric score
        #[clap(allow_negative_numbers = true)]
        score: f64,
    },

    /// Show a record, or the candidates when given a prefix
    Show {
        /// Full record number or prefix
        query: String,
    },

    /// Print every record number starting with a prefix
    Complete {
        /// Prefix to complete
        prefix: String,
    },

    /// Change fields of a record
    Update {
        /// Record number
        id: String,
        /// New display name
        #[clap(long)]
        name: Option<String>,
        /// New category label
        #[clap(long)]
        category: Option<String>,
        /// New score
        #[clap(long, allow_negative_numbers = true)]
        score: Option<f64>,
    },

    /// Remove a record
    Remove {
        /// Record number
        id: String,
    },

    /// List all records sorted by number
    List {
        /// Print as JSON
        #[clap(long)]
        json: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },
}

/// Initialize the logging system. Logs go to stderr so they never mix with
/// shell output; `RUST_LOG` takes precedence over the configured level.
fn init_logging(log: &LogConfig) -> RosterResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_file(log.source_location)
        .with_line_number(log.source_location);

    let result = if log.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.map_err(|e| RosterError::Custom(format!("Failed to set global tracing subscriber: {e}")))
}

fn open_store(config: &RosterConfig) -> RecordStore {
    RecordStore::new(FlatFileRepository::from_config(&config.store))
}

fn run(args: Args) -> RosterResult<()> {
    let config_loader = ConfigLoader::new(args.config.as_deref(), ENV_PREFIX);

    let command = args.command.unwrap_or(Command::Shell);
    if let Command::GenConfig { output } = &command {
        let default_config = RosterConfig::default();
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(&default_config)
            .map_err(|e| RosterError::Custom(format!("Failed to serialize config: {e}")))?;
        std::fs::write(output, toml)?;
        println!("Default configuration written to {}", output.display());
        return Ok(());
    }

    let mut loaded = config_loader.load()?;
    if let Some(data) = args.data {
        loaded.store.data_file = data;
    }
    init_logging(&loaded.log)?;
    config::init_global_config(loaded);
    let global = config::get_global_config();
    let config = global.get();
    info!(data_file = ?config.store.data_file, "Configuration loaded");

    let mut store = open_store(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Shell => {
            if let Err(e) = store.load() {
                // The session continues with an empty store
                let context = ErrorContext::new(e, "load");
                report_error(&context);
                writeln!(out, "{}", context.error)?;
            }
            let stdin = io::stdin();
            Shell::new(&mut store, stdin.lock(), out).run()
        }
        Command::Add {
            id,
            name,
            category,
            score,
        } => {
            store.load()?;
            store.add(Record::new(id.trim(), name, category, score))?;
            writeln!(out, "Record added successfully.")?;
            Ok(())
        }
        Command::Show { query } => {
            store.load()?;
            match store.lookup(&query) {
                Lookup::Exact(record) => writeln!(out, "{record}")?,
                Lookup::Suggestions(suggestions) => {
                    writeln!(out, "Did you mean one of the following?")?;
                    for id in suggestions {
                        writeln!(out, "  {id}")?;
                    }
                }
                Lookup::NotFound => return Err(StoreError::NotFound(query).into()),
            }
            Ok(())
        }
        Command::Complete { prefix } => {
            store.load()?;
            for id in store.suggestions(&prefix) {
                writeln!(out, "{id}")?;
            }
            Ok(())
        }
        Command::Update {
            id,
            name,
            category,
            score,
        } => {
            let update = RecordUpdate {
                name,
                category,
                score,
            };
            if update.is_empty() {
                return Err(RosterError::Custom(
                    "Nothing to update: pass --name, --category or --score".to_string(),
                ));
            }
            store.load()?;
            let record = store.update(id.trim(), update)?;
            writeln!(out, "{record}")?;
            Ok(())
        }
        Command::Remove { id } => {
            store.load()?;
            store.remove(id.trim())?;
            writeln!(out, "Record removed successfully.")?;
            Ok(())
        }
        Command::List { json } => {
            store.load()?;
            let records = store.list();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
            } else if records.is_empty() {
                writeln!(out, "No records registered.")?;
            } else {
                for record in records {
                    writeln!(out, "{record}\n")?;
                }
            }
            Ok(())
        }
        Command::Validate => {
            writeln!(out, "Configuration is valid.")?;
            Ok(())
        }
        Command::GenConfig { .. } => Ok(()),
    }
}

/// Main entry point for the application.
fn main() {
    set_error_reporter(Arc::new(TracingErrorReporter));

    let args = <Args as clap::Parser>::parse();
    if let Err(e) = run(args) {
        let context = ErrorContext::new(e, "roster");
        report_error(&context);
        eprintln!("error: {}", context.error);
        process::exit(1);
    }
}
