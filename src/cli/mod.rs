//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod navigate;
pub mod report;
pub mod search;
pub mod serve;

use crate::api::BackendClient;
use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Accessible parking spot finder
#[derive(Parser)]
#[command(name = "vagas-plus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find spots by text or near a location
    Search(search::SearchArgs),

    /// Build navigation links to a spot
    Navigate(navigate::NavigateArgs),

    /// Submit and manage status and violation reports
    Report(report::ReportArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),
}

/// Where a search or route starts
#[derive(Args, Debug, Default)]
pub struct LocationArgs {
    /// Latitude
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// Address to geocode
    #[arg(long, conflicts_with_all = ["lat", "lng", "here"])]
    pub address: Option<String>,

    /// Use current location (IP geolocation)
    #[arg(long, conflicts_with_all = ["lat", "lng", "address"])]
    pub here: bool,
}

impl LocationArgs {
    /// Explicit coordinates, validated
    pub fn coordinates(&self) -> Result<Option<Coordinates>> {
        match Coordinates::from_pair(self.lat, self.lng) {
            Some(coords) => {
                coords.validate()?;
                Ok(Some(coords))
            }
            None => Ok(None),
        }
    }
}

/// Backend client for the configured URL
pub(crate) fn backend_client(config: &Config) -> Result<BackendClient> {
    BackendClient::new(&config.backend.url, config.backend.timeout_secs)
}

/// Log to stderr so command output stays clean on stdout
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Search(args) => search::run(args).await,
        Commands::Navigate(args) => navigate::run(args).await,
        Commands::Report(args) => report::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Serve(args) => serve::run(args).await,
    }
}
