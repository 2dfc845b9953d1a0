//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sqlite_adapter::SqliteAdapter;
use crate::domain::error::ExplorerError;
use crate::domain::ingest::{ingest_series, parse_series_ids, IngestReport, SkipReason};
use crate::ports::config_port::ConfigPort;
use crate::ports::series_port::SeriesPort;
use crate::ports::source_port::ObservationSource;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";
pub const DEFAULT_CSV_DIR: &str = "data/public_datasets";

#[derive(Parser, Debug)]
#[command(name = "finexplorer", about = "Economic time-series explorer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the JSON API server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Load FRED CSV downloads into the store
    Seed {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        csv_dir: Option<PathBuf>,
        /// Comma-separated series ids (default: every CSV in the directory)
        #[arg(long)]
        series: Option<String>,
    },
    /// Ingest series from the FRED API
    Fetch {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated series ids
        #[arg(long, conflicts_with = "category")]
        series: Option<String>,
        /// Ingest every series in this FRED category
        #[arg(long)]
        category: Option<u64>,
    },
    /// List cataloged series
    List {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the stored date range of a series
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        series: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::Seed {
            config,
            csv_dir,
            series,
        } => run_seed(&config, csv_dir.as_deref(), series.as_deref()),
        Command::Fetch {
            config,
            series,
            category,
        } => run_fetch(&config, series.as_deref(), category),
        Command::List { config } => run_list(&config),
        Command::Info { config, series } => run_info(&config, &series),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn fail(err: &ExplorerError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

/// Open the configured store and make sure its tables exist.
pub fn open_store(config: &dyn ConfigPort) -> Result<SqliteAdapter, ExplorerError> {
    let store = SqliteAdapter::from_config(config)?;
    store.initialize_schema()?;
    Ok(store)
}

fn resolve_ids(
    series: Option<&str>,
    source: &dyn ObservationSource,
) -> Result<Vec<String>, ExplorerError> {
    match series {
        Some(list) => parse_series_ids(list).map_err(|e| ExplorerError::invalid(e.to_string())),
        None => source.available_series(),
    }
}

fn print_report(report: &IngestReport) -> ExitCode {
    for (id, rows) in &report.loaded {
        println!("{id}: loaded {rows} observations");
    }
    for skipped in &report.skipped {
        let reason = match &skipped.reason {
            SkipReason::AlreadyCataloged => "already cataloged".to_string(),
            SkipReason::NoData => "no data".to_string(),
            SkipReason::Failed(reason) => format!("failed: {reason}"),
        };
        println!("{}: skipped ({reason})", skipped.series_id);
    }
    eprintln!(
        "{} series loaded, {} rows written, {} skipped",
        report.loaded.len(),
        report.rows_written(),
        report.skipped.len()
    );

    if report.failures() > 0 {
        warn!(failures = report.failures(), "some series failed to ingest");
        ExitCode::from(4)
    } else {
        ExitCode::SUCCESS
    }
}

fn run_seed(config_path: &Path, csv_dir: Option<&Path>, series: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let csv_dir = csv_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(config.get_string_or("seed", "csv_dir", DEFAULT_CSV_DIR)));
    info!(dir = %csv_dir.display(), "seeding from CSV directory");

    let source = CsvAdapter::new(csv_dir);
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let ids = match resolve_ids(series, &source) {
        Ok(ids) => ids,
        Err(e) => return fail(&e),
    };

    let report = ingest_series(&source, &store, &ids, |id| Some(CsvAdapter::file_name(id)));
    print_report(&report)
}

fn run_fetch(config_path: &Path, series: Option<&str>, category: Option<u64>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    #[cfg(feature = "fred")]
    {
        use crate::adapters::fred_adapter::{FredClient, FredSettings};
        use crate::domain::ingest::DEFAULT_SERIES;

        let mut settings = match FredSettings::from_config(&config) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };
        if let Some(category_id) = category {
            settings.category_id = category_id;
        }
        let source = match FredClient::new(settings) {
            Ok(c) => c,
            Err(e) => return fail(&e),
        };
        let store = match open_store(&config) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };

        let ids = match (series, category) {
            (None, None) => Ok(DEFAULT_SERIES.iter().map(|s| s.to_string()).collect()),
            (series, _) => resolve_ids(series, &source),
        };
        let ids = match ids {
            Ok(ids) => ids,
            Err(e) => return fail(&e),
        };
        info!(count = ids.len(), "fetching series from FRED");

        let report = ingest_series(&source, &store, &ids, |_| None);
        print_report(&report)
    }

    #[cfg(not(feature = "fred"))]
    {
        let _ = (config, series, category);
        eprintln!("error: fred feature is required for fetch");
        ExitCode::from(1)
    }
}

fn run_list(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    match store.list_series() {
        Ok(names) if names.is_empty() => {
            eprintln!("No series cataloged");
            ExitCode::SUCCESS
        }
        Ok(names) => {
            for name in &names {
                println!("{name}");
            }
            eprintln!("{} series found", names.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_info(config_path: &Path, series: &str) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    match store.data_range(series) {
        Ok(Some((first, last, count))) => {
            println!("{series}: {count} observations, {first} to {last}");
            ExitCode::SUCCESS
        }
        Ok(None) => fail(&ExplorerError::NoData {
            series: series.to_string(),
        }),
        Err(e) => fail(&e),
    }
}

fn run_serve(config_path: &Path) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{build_router, AppState};
        use std::net::SocketAddr;
        use std::sync::Arc;

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(code) => return code,
        };
        let store = match open_store(&config) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };

        let listen = config.get_string_or("web", "listen", DEFAULT_LISTEN);
        let addr: SocketAddr = match listen.parse() {
            Ok(a) => a,
            Err(e) => {
                return fail(&ExplorerError::ConfigInvalid {
                    section: "web".into(),
                    key: "listen".into(),
                    reason: format!("{listen}: {e}"),
                });
            }
        };

        let state = AppState {
            series_port: Arc::new(store),
            config: Arc::new(config),
        };
        let router = build_router(state);

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => return fail(&e.into()),
        };
        let served: Result<(), std::io::Error> = runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!(%addr, "web server listening");
            axum::serve(listener, router).await
        });

        match served {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&e.into()),
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}
