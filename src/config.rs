//!
//! This module uses the `serde` crate to serialize and deserialize a config file.
//!
//! The config covers the few behaviors callers tune: which monitor the adapter sits on and whether window-name lookup may fall back to the legacy property.

use serde::{Deserialize, Serialize};

/// The default monitor index for per-screen offset queries.
pub const NUM_SCREEN: usize = 0;
/// Whether name lookup falls back to WM_NAME when _NET_WM_NAME is absent.
pub const LEGACY_NAME_FALLBACK: bool = true;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The monitor index used when querying per-screen offsets.
    pub num_screen: usize,
    /// Whether window-name lookup may fall back to the legacy WM_NAME
    /// property. The legacy property is not UTF-8 and can carry characters
    /// that only render correctly under the window's own locale.
    pub legacy_name_fallback: bool,
}

impl Config {
    /// Loads the config from the XDG config directory, writing out the
    /// default on the first run. Any problem with the file falls back to the
    /// default config.
    #[must_use]
    pub fn load() -> Self {
        let path = match xdg::BaseDirectories::with_prefix("galena").place_config_file("config.toml")
        {
            Ok(p) => p,
            Err(e) => {
                log::error!("cant create config file with error {e:?}, using default");
                return Self::default();
            }
        };

        log::info!("loading config from {}", path.display());

        let config_str = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                log::info!("config not found {e:?}, serializing default");

                let Ok(serialized) = toml::to_string(&Self::default()) else {
                    log::error!("couldn't serialize config into file, using default");
                    return Self::default();
                };

                match std::fs::write(&path, serialized) {
                    Ok(()) => log::info!("created default config at {}", path.display()),
                    Err(_) => {
                        log::error!("couldn't write to file, using default");
                    }
                }

                return Self::default();
            }
        };

        match toml::from_str(&config_str) {
            Ok(c) => c,
            Err(e) => {
                log::error!("error parsing config {e:?}, using default");
                Self::default()
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_screen: NUM_SCREEN,
            legacy_name_fallback: LEGACY_NAME_FALLBACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let serialized = toml::to_string(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.num_screen, NUM_SCREEN);
        assert_eq!(parsed.legacy_name_fallback, LEGACY_NAME_FALLBACK);
    }
}
