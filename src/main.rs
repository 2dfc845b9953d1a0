use clap::Parser;
use finexplorer::cli::{run, Cli};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init()
}

fn main() -> std::process::ExitCode {
    // FRED_API_KEY may live in a .env file
    dotenvy::dotenv().ok();
    init_logging();
    run(Cli::parse())
}
