//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::api::DEFAULT_BACKEND_URL;
use crate::constants::search::{NEARBY_RADIUS_KM, SEARCH_RADIUS_KM};

/// Default spot backend
pub const DEFAULT_BACKEND: &str = DEFAULT_BACKEND_URL;

/// Default backend request timeout in seconds
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 15;

/// Default list inclusion radius in kilometers
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = SEARCH_RADIUS_KM;

/// Default marker emphasis radius in kilometers
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = NEARBY_RADIUS_KM;

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default navigation app
pub const DEFAULT_NAV_APP: &str = "google_maps";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "vagas-plus";
