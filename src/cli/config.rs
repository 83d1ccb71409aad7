//! Config command handler
//!
//! `vagas-plus config` prints everything, `config <key>` prints one value
//! and `config <key> <value>` sets it.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "search.nearby_radius_km")
    pub key: Option<String>,

    /// New value; "none" clears an optional key
    pub value: Option<String>,

    /// Show config file path
    #[arg(long, conflicts_with_all = ["key", "reset", "keys"])]
    pub path: bool,

    /// List settable keys
    #[arg(long, conflicts_with_all = ["key", "reset"])]
    pub keys: bool,

    /// Reset config to defaults
    #[arg(long, conflicts_with = "key")]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Config::config_path()?.display());
        return Ok(());
    }

    if args.keys {
        for key in Config::available_keys() {
            println!("{}", key);
        }
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (args.key, args.value) {
        (None, _) => print!("{}", render(&config)),
        (Some(key), None) => {
            let value = config.get(&key).ok_or_else(|| unknown_key(&key))?;
            println!("{}", value);
        }
        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, config.get(&key).unwrap_or(value));
        }
    }

    Ok(())
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "Unknown config key: {} (available: {})",
        key,
        Config::available_keys().join(", ")
    ))
}

/// All values grouped by section, unset optional keys marked
fn render(config: &Config) -> String {
    let mut out = String::new();
    let mut section = "";

    for key in Config::available_keys() {
        let Some((name, field)) = key.split_once('.') else {
            continue;
        };
        if name != section {
            if !section.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", name));
            section = name;
        }
        match config.get(key).as_deref() {
            Some("") => out.push_str(&format!("{} = # not set\n", field)),
            Some(value) => out.push_str(&format!("{} = {}\n", field, value)),
            None => {}
        }
    }

    out
}
