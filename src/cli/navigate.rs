//! Navigate command handler
//!
//! Prints the deep-link chain for a destination, step by step at the
//! offsets a browser would follow. Ctrl-C stops the chain.

use crate::cli::search::resolve_reference;
use crate::cli::{backend_client, LocationArgs};
use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::map::Directions;
use crate::navigation::chain::{run_chain, ChainCancel, Opener};
use crate::navigation::{launch_plan, NavApp, Platform};
use crate::proximity::{sort_by_distance, SearchState};
use clap::Args;
use std::time::Instant;
use tracing::info;

/// Navigate command arguments
#[derive(Args)]
pub struct NavigateArgs {
    /// Destination spot id
    #[arg(long, conflicts_with_all = ["to_lat", "to_lng", "nearest"])]
    pub spot: Option<String>,

    /// Destination latitude
    #[arg(long, requires = "to_lng", allow_hyphen_values = true)]
    pub to_lat: Option<f64>,

    /// Destination longitude
    #[arg(long, requires = "to_lat", allow_hyphen_values = true)]
    pub to_lng: Option<f64>,

    /// Go to the spot nearest the origin
    #[arg(long, conflicts_with_all = ["to_lat", "to_lng"])]
    pub nearest: bool,

    /// Origin
    #[command(flatten)]
    pub from: LocationArgs,

    /// Navigation app: google_maps or waze
    #[arg(long, short = 'a')]
    pub app: Option<String>,

    /// Target platform: android, ios or desktop
    #[arg(long, short = 'p', default_value = "desktop")]
    pub platform: String,

    /// Print the plan as JSON instead of walking it
    #[arg(long)]
    pub plan: bool,
}

/// Opener that prints each link with its offset
struct PrintOpener {
    start: Instant,
}

impl Opener for PrintOpener {
    fn open(&mut self, url: &str) -> Result<()> {
        println!("[+{:.1}s] {}", self.start.elapsed().as_secs_f64(), url);
        Ok(())
    }
}

/// Run the navigate command
pub async fn run(args: NavigateArgs) -> Result<()> {
    let config = Config::load()?;

    let app = match &args.app {
        Some(app) => app.parse::<NavApp>().map_err(Error::Config)?,
        None => config.nav_app(),
    };
    let platform: Platform = args.platform.parse().map_err(Error::Config)?;

    let mut state = SearchState::new();
    if let Some(failure) = resolve_reference(&args.from, &mut state, &config).await? {
        eprintln!("Warning: {}", failure);
    }
    let origin = state.reference();

    let destination = destination(&args, origin, &config).await?;
    destination.validate()?;

    let plan = launch_plan(app, platform, origin, destination);

    if args.plan {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    if let Some(origin) = origin {
        let directions = Directions::estimate(origin, destination);
        println!(
            "About {} away, {} by car",
            directions.distance_text, directions.duration_text
        );
    }

    let cancel = ChainCancel::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut opener = PrintOpener {
        start: Instant::now(),
    };
    let outcome = run_chain(&plan, &mut opener, &cancel).await;
    if outcome.cancelled {
        info!("Navigation chain stopped after {} link(s)", outcome.opened.len());
    }

    Ok(())
}

/// Pick the destination from explicit coordinates, a spot id or the
/// nearest spot
async fn destination(
    args: &NavigateArgs,
    origin: Option<Coordinates>,
    config: &Config,
) -> Result<Coordinates> {
    if let Some(coords) = Coordinates::from_pair(args.to_lat, args.to_lng) {
        return Ok(coords);
    }

    if args.spot.is_none() && !args.nearest {
        return Err(Error::Config(
            "No destination. Use --spot, --to-lat/--to-lng or --nearest".to_string(),
        ));
    }

    let spots = backend_client(config)?.fetch_spots().await?;

    if let Some(id) = &args.spot {
        return spots
            .iter()
            .find(|spot| &spot.id == id)
            .map(|spot| spot.coords)
            .ok_or_else(|| Error::Config(format!("Unknown spot: {}", id)));
    }

    let origin = origin.ok_or_else(|| {
        Error::Config("--nearest needs an origin (--lat/--lng, --address or --here)".to_string())
    })?;

    let (spot, distance) = sort_by_distance(&spots, origin)
        .into_iter()
        .next()
        .ok_or_else(|| Error::Config("No spots available".to_string()))?;
    println!("Nearest spot: {} ({:.2} km)", spot.name, distance);
    Ok(spot.coords)
}
