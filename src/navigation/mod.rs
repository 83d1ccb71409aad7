//! Turn-by-turn navigation links
//!
//! Opening a navigation app from a browser has no success signal, so each
//! platform gets a fixed, ordered list of deep links. Each link fires at a
//! fixed offset from the start; later links are fallbacks in case the
//! earlier app is not installed. The last link is always a web URL.

pub mod chain;

use crate::coord::Coordinates;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use chain::{run_chain, ChainCancel, ChainOutcome, Opener};

/// Offset between successive Google Maps fallbacks
const GOOGLE_STEP: Duration = Duration::from_millis(700);

/// Offset before falling back from the Waze app to Waze web
const WAZE_FALLBACK: Duration = Duration::from_millis(1500);

/// Device family, which decides the available deep-link schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Android,
    Ios,
    Desktop,
}

impl Platform {
    /// Detect the platform from a browser user-agent string
    pub fn from_user_agent(ua: &str) -> Self {
        if ["iPad", "iPhone", "iPod"].iter().any(|d| ua.contains(d)) {
            Self::Ios
        } else if ua.contains("Android") {
            Self::Android
        } else {
            Self::Desktop
        }
    }

    pub fn is_mobile(&self) -> bool {
        !matches!(self, Self::Desktop)
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            "desktop" | "web" => Ok(Self::Desktop),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

/// Navigation app the user picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavApp {
    #[default]
    GoogleMaps,
    Waze,
}

impl std::fmt::Display for NavApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoogleMaps => write!(f, "google_maps"),
            Self::Waze => write!(f, "waze"),
        }
    }
}

impl std::str::FromStr for NavApp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google_maps" | "google-maps" | "google" | "googlemaps" => Ok(Self::GoogleMaps),
            "waze" => Ok(Self::Waze),
            _ => Err(format!("Unknown navigation app: {}", s)),
        }
    }
}

/// One link in the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchStep {
    pub url: String,
    /// Offset from the start of the chain
    #[serde(with = "millis")]
    pub at: Duration,
}

/// Ordered deep links for one navigation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchPlan {
    pub app: NavApp,
    pub platform: Platform,
    pub steps: Vec<LaunchStep>,
    /// Opened if a step fails outright
    pub fallback: String,
}

fn step(url: String, at: Duration) -> LaunchStep {
    LaunchStep { url, at }
}

/// Build the deep-link chain for `app` on `platform`
///
/// `origin` is optional; without it the app starts from the device's own
/// position. Waze always does and ignores `origin`.
pub fn launch_plan(
    app: NavApp,
    platform: Platform,
    origin: Option<Coordinates>,
    destination: Coordinates,
) -> LaunchPlan {
    let (steps, fallback) = match app {
        NavApp::GoogleMaps => google_steps(platform, origin, destination),
        NavApp::Waze => waze_steps(platform, destination),
    };

    LaunchPlan {
        app,
        platform,
        steps,
        fallback,
    }
}

fn google_steps(
    platform: Platform,
    origin: Option<Coordinates>,
    destination: Coordinates,
) -> (Vec<LaunchStep>, String) {
    let dest = urlencoding::encode(&destination.to_string()).into_owned();
    let saddr = origin.map(|o| urlencoding::encode(&o.to_string()).into_owned());

    let web = match &saddr {
        Some(o) => format!(
            "https://www.google.com/maps/dir/?api=1&origin={}&destination={}&travelmode=driving&dir_action=navigate",
            o, dest
        ),
        None => format!(
            "https://www.google.com/maps/dir/?api=1&destination={}&travelmode=driving&dir_action=navigate",
            dest
        ),
    };

    let steps = match platform {
        Platform::Android => vec![
            step(
                format!(
                    "intent://google.navigation?q={}#Intent;package=com.google.android.apps.maps;end",
                    dest
                ),
                Duration::ZERO,
            ),
            step(format!("google.navigation:q={}", dest), GOOGLE_STEP),
            step(web.clone(), GOOGLE_STEP * 2),
        ],
        Platform::Ios => {
            let (google_app, apple) = match &saddr {
                Some(o) => (
                    format!(
                        "comgooglemaps://?saddr={}&daddr={}&directionsmode=driving&navigate=yes",
                        o, dest
                    ),
                    format!("maps://?saddr={}&daddr={}&dirflg=d", o, dest),
                ),
                None => (
                    format!(
                        "comgooglemaps://?daddr={}&directionsmode=driving&navigate=yes",
                        dest
                    ),
                    format!("maps://?daddr={}&dirflg=d", dest),
                ),
            };
            vec![
                step(google_app, Duration::ZERO),
                step(apple, GOOGLE_STEP),
                step(web.clone(), GOOGLE_STEP * 2),
            ]
        }
        Platform::Desktop => vec![step(web.clone(), Duration::ZERO)],
    };

    (steps, web)
}

fn waze_steps(platform: Platform, destination: Coordinates) -> (Vec<LaunchStep>, String) {
    let web = format!(
        "https://www.waze.com/ul?ll={}%2C{}&navigate=yes&zoom=17",
        destination.lat, destination.lng
    );

    let steps = if platform.is_mobile() {
        vec![
            step(
                format!(
                    "waze://?ll={},{}&navigate=yes",
                    destination.lat, destination.lng
                ),
                Duration::ZERO,
            ),
            step(web.clone(), WAZE_FALLBACK),
        ]
    } else {
        vec![step(web.clone(), Duration::ZERO)]
    };

    (steps, web)
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
