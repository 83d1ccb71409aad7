//! Search command handler
//!
//! Lists spots matching a text query, or near a reference point.

use crate::cli::{backend_client, LocationArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter, SearchResponse};
use crate::geo::{resolve_address, resolve_device, NetworkResolver, ResolverFailure};
use crate::proximity::SearchState;
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Text to match against spot name and address
    #[arg(long, short = 'q', default_value = "")]
    pub query: String,

    #[command(flatten)]
    pub location: LocationArgs,

    /// List radius in kilometers
    #[arg(long, short = 'r')]
    pub radius: Option<f64>,

    /// Sort by distance (needs a reference point)
    #[arg(long)]
    pub nearest: bool,

    /// Attach each spot's latest status report
    #[arg(long)]
    pub reports: bool,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Fill the reference point of `state` from the location arguments
///
/// Returns the resolver failure, if any. Geolocation may still leave a
/// fallback reference behind; geocoding never does.
pub(crate) async fn resolve_reference(
    location: &LocationArgs,
    state: &mut SearchState,
    config: &Config,
) -> Result<Option<ResolverFailure>> {
    if let Some(coords) = location.coordinates()? {
        state.select_reference(coords);
        return Ok(None);
    }

    if location.address.is_none() && !location.here {
        return Ok(None);
    }

    let resolver = NetworkResolver::with_defaults()?;
    let ticket = state.begin_request();
    let resolution = match &location.address {
        Some(address) => resolve_address(&resolver, address).await,
        None => resolve_device(&resolver, config.fallback_policy()).await,
    };
    state.apply_resolution(ticket, &resolution);

    Ok(resolution.failure)
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let config = Config::load()?;

    let mut radii = config.radii();
    if let Some(radius) = args.radius {
        if !radius.is_finite() || radius < 0.0 {
            return Err(Error::Config(format!("Invalid radius: {}", radius)));
        }
        radii.search_km = radius;
    }

    let format = args.format.unwrap_or(config.defaults.format.clone());
    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;

    let mut state = SearchState::new();
    state.set_query(args.query);
    let failure = resolve_reference(&args.location, &mut state, &config).await?;
    if let Some(failure) = &failure {
        eprintln!("Warning: {}", failure);
    }

    let client = backend_client(&config)?;
    let spots = if args.reports {
        client.fetch_spots_with_reports().await?
    } else {
        client.fetch_spots().await?
    };

    let result = state.apply(&spots, radii);
    let mut response =
        SearchResponse::new(state.query(), state.reference(), radii, result).with_failure(failure);
    if args.nearest {
        response.sort_nearest();
    }

    let output = formatter.format(&response)?;

    // Write output
    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
}
