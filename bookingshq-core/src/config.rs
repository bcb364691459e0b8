//! Runtime configuration, loaded from TOML.
//!
//! Every section is optional; missing keys fall back to the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::Coordinate;
use crate::region::MapRegion;
use crate::registry::CreationPolicy;

/// Quiet period before an edited address is sent to the geocoder.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(thiserror::Error, Debug)]
/// Errors raised while loading configuration.
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying IO failure.
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`Config`].
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
/// Top-level configuration.
pub struct Config {
    /// Address resolution tuning.
    pub resolver: ResolverConfig,
    /// Rules applied when a booking is created.
    pub creation: CreationPolicy,
    /// Map defaults.
    pub map: MapConfig,
}

impl Config {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid configuration.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents are invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
/// Address resolver settings.
pub struct ResolverConfig {
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl ResolverConfig {
    /// Debounce window as a duration.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
/// Map view shown before any address resolves.
pub struct MapConfig {
    /// Initial centre.
    pub default_center: Coordinate,
    /// Initial span on both axes, in degrees.
    pub default_span: f64,
}

impl MapConfig {
    /// Initial region built from the configured centre and span.
    #[must_use]
    pub const fn default_region(&self) -> MapRegion {
        MapRegion::square(self.default_center, self.default_span)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: Coordinate::new(-33.8688, 151.2093),
            default_span: 0.05,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml_str("").expect("empty config parses");
        assert_eq!(config, Config::default());
        assert_eq!(config.resolver.debounce(), Duration::from_millis(500));
        assert!(config.creation.require_customer_name);
        assert!(!config.creation.require_locations);
    }

    #[test]
    fn partial_sections_override_only_given_keys() {
        let config = Config::from_toml_str(
            r"
            [resolver]
            debounce-ms = 250

            [creation]
            require-locations = true

            [creation.service-area]
            min-latitude = -34.2
            max-latitude = -33.5
            min-longitude = 150.5
            max-longitude = 151.5

            [map]
            default-span = 0.2
            ",
        )
        .expect("config parses");
        assert_eq!(config.resolver.debounce_ms, 250);
        assert!(config.creation.require_locations);
        assert!(config.creation.require_title);
        let area = config.creation.service_area.expect("service area set");
        assert!(area.contains(Coordinate::new(-33.8688, 151.2093)));
        assert!((config.map.default_span - 0.2).abs() < f64::EPSILON);
        assert!((config.map.default_center.latitude + 33.8688).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let err = Config::from_toml_str("[resolver]\ndebounce-ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = Config::load(Path::new("/nonexistent/bookingshq.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bookingshq.toml"));
    }
}
