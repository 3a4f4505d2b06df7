// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Settings are stored in TOML via `confy`. Every field has a serde default,
//! so files written by older versions load without migration.

use std::time::Duration;

use nimbus_client::catalog::DEFAULT_RADAR_API_URL;
use nimbus_client::forecast::DEFAULT_FORECAST_API_URL;
use nimbus_client::geocode::{DEFAULT_GEOCODING_API_URL, DEFAULT_MAX_RESULTS};
use nimbus_client::{Coordinates, Units};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "nimbus-desktop";
const CONFIG_NAME: &str = "config";

/// Slowest and fastest playback speeds offered in the UI.
pub const PLAYBACK_INTERVAL_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=3000;

/// Base map tile style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BaseMap {
    #[default]
    OpenStreetMap,
    CartoDark,
}

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Forecast temperature units
    #[serde(default)]
    pub units: Units,

    /// Radar overlay opacity (0.0 - 1.0)
    #[serde(default = "default_radar_opacity")]
    pub radar_opacity: f32,

    /// Time between radar frames while playing
    #[serde(default = "default_playback_interval_ms")]
    pub playback_interval_ms: u64,

    /// Initial map zoom level
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    #[serde(default)]
    pub base_map: BaseMap,

    /// Map centre used at startup
    #[serde(default = "default_home_latitude")]
    pub home_latitude: f64,

    #[serde(default = "default_home_longitude")]
    pub home_longitude: f64,

    /// Fixed location for "locate me" (for machines where IP lookup is wrong)
    #[serde(default)]
    pub override_latitude: Option<f64>,

    #[serde(default)]
    pub override_longitude: Option<f64>,

    #[serde(default = "default_radar_api_url")]
    pub radar_api_url: String,

    #[serde(default = "default_forecast_api_url")]
    pub forecast_api_url: String,

    #[serde(default = "default_geocoding_api_url")]
    pub geocoding_api_url: String,

    /// Maximum number of place matches shown
    #[serde(default = "default_search_result_limit")]
    pub search_result_limit: usize,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_radar_opacity() -> f32 {
    0.8
}

fn default_playback_interval_ms() -> u64 {
    600
}

fn default_zoom() -> f64 {
    7.0
}

// Sacramento
fn default_home_latitude() -> f64 {
    38.58
}

fn default_home_longitude() -> f64 {
    -121.49
}

fn default_radar_api_url() -> String {
    DEFAULT_RADAR_API_URL.to_string()
}

fn default_forecast_api_url() -> String {
    DEFAULT_FORECAST_API_URL.to_string()
}

fn default_geocoding_api_url() -> String {
    DEFAULT_GEOCODING_API_URL.to_string()
}

fn default_search_result_limit() -> usize {
    DEFAULT_MAX_RESULTS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            units: Units::default(),
            radar_opacity: default_radar_opacity(),
            playback_interval_ms: default_playback_interval_ms(),
            default_zoom: default_zoom(),
            base_map: BaseMap::default(),
            home_latitude: default_home_latitude(),
            home_longitude: default_home_longitude(),
            override_latitude: None,
            override_longitude: None,
            radar_api_url: default_radar_api_url(),
            forecast_api_url: default_forecast_api_url(),
            geocoding_api_url: default_geocoding_api_url(),
            search_result_limit: default_search_result_limit(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk
    pub fn load() -> Result<Self, confy::ConfyError> {
        let config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;
        Ok(config.sanitized())
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Clamp hand-edited values back into their valid ranges
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.radar_opacity = if self.radar_opacity.is_finite() {
            self.radar_opacity.clamp(0.0, 1.0)
        } else {
            default_radar_opacity()
        };
        self.playback_interval_ms = self.playback_interval_ms.clamp(
            *PLAYBACK_INTERVAL_RANGE_MS.start(),
            *PLAYBACK_INTERVAL_RANGE_MS.end(),
        );
        self.search_result_limit = self.search_result_limit.clamp(1, 20);
        if !self.home().is_valid() {
            self.home_latitude = default_home_latitude();
            self.home_longitude = default_home_longitude();
        }
        self
    }

    #[must_use]
    pub fn home(&self) -> Coordinates {
        Coordinates::new(self.home_latitude, self.home_longitude)
    }

    /// The configured override location, if both halves are set and valid
    #[must_use]
    pub fn override_location(&self) -> Option<Coordinates> {
        match (self.override_latitude, self.override_longitude) {
            (Some(latitude), Some(longitude)) => {
                Some(Coordinates::new(latitude, longitude)).filter(Coordinates::is_valid)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn playback_interval(&self) -> Duration {
        Duration::from_millis(self.playback_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.playback_interval(), Duration::from_millis(600));
        assert!((config.radar_opacity - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.units, Units::Metric);
        assert_eq!(config.override_location(), None);
    }

    #[test]
    fn test_sanitize_clamps_out_of_range_values() {
        let config = AppConfig {
            radar_opacity: 4.0,
            playback_interval_ms: 0,
            search_result_limit: 0,
            home_latitude: 123.0,
            ..AppConfig::default()
        }
        .sanitized();

        assert!((config.radar_opacity - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.playback_interval_ms, 100);
        assert_eq!(config.search_result_limit, 1);
        assert_eq!(config.home(), AppConfig::default().home());
    }

    #[test]
    fn test_override_location_needs_both_halves() {
        let mut config = AppConfig {
            override_latitude: Some(40.0),
            ..AppConfig::default()
        };
        assert_eq!(config.override_location(), None);

        config.override_longitude = Some(-105.0);
        assert_eq!(config.override_location(), Some(Coordinates::new(40.0, -105.0)));
    }
}
