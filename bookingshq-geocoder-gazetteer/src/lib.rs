//! Geocoder that answers from a fixed table of places around Sydney.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use bookingshq_core::{
    model::{Coordinate, Location},
    ports::{GeocodeError, GeocoderPort},
};

/// Simulated lookup delay of the built-in geocoder.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(150);

/// Queries shorter than this never match by prefix.
const MIN_PREFIX_LEN: usize = 3;

/// Known places: display name and position.
const PLACES: &[(&str, f64, f64)] = &[
    ("Sydney Opera House", -33.8568, 151.2153),
    ("Circular Quay", -33.8610, 151.2108),
    ("The Rocks", -33.8599, 151.2090),
    ("Sydney Town Hall", -33.8731, 151.2061),
    ("Central Station", -33.8832, 151.2065),
    ("Darling Harbour", -33.8748, 151.2008),
    ("Bondi Beach", -33.8908, 151.2743),
    ("Manly Wharf", -33.8002, 151.2844),
    ("Parramatta", -33.8150, 151.0011),
    ("Sydney Airport", -33.9399, 151.1753),
    ("123 Main St", -33.8688, 151.2093),
    ("456 Oak Ave", -33.8650, 151.2094),
    ("789 Pine St", -33.8915, 151.1982),
];

#[derive(Debug, Clone)]
/// A named place the gazetteer can return.
pub struct Place {
    /// Name reported back in results.
    pub name: String,
    /// Position of the place.
    pub coordinate: Coordinate,
}

impl Place {
    /// Create a place entry.
    #[must_use]
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            coordinate,
        }
    }
}

/// Table-backed [`GeocoderPort`] with an artificial delay.
pub struct GazetteerGeocoder {
    places: Vec<(String, Place)>,
    latency: Duration,
}

impl GazetteerGeocoder {
    /// Build a geocoder over `places`, answering after `latency`.
    #[must_use]
    pub fn new(places: Vec<Place>, latency: Duration) -> Self {
        let places = places
            .into_iter()
            .map(|place| (normalize(&place.name), place))
            .collect();
        Self { places, latency }
    }

    /// Geocoder over the built-in place table.
    #[must_use]
    pub fn builtin(latency: Duration) -> Self {
        let places = PLACES
            .iter()
            .map(|&(name, latitude, longitude)| Place::new(name, Coordinate::new(latitude, longitude)))
            .collect();
        Self::new(places, latency)
    }

    /// Find the place an address refers to.
    ///
    /// Exact matches win; otherwise the first place whose name starts with the query,
    /// then the first place whose name appears inside the query.
    #[must_use]
    pub fn lookup(&self, address: &str) -> Option<&Place> {
        let query = normalize(address);
        if query.is_empty() {
            return None;
        }
        let exact = self.places.iter().find(|(key, _)| *key == query);
        let prefix = || {
            self.places
                .iter()
                .find(|(key, _)| query.len() >= MIN_PREFIX_LEN && key.starts_with(&query))
        };
        let contained = || self.places.iter().find(|(key, _)| query.contains(key.as_str()));
        exact
            .or_else(prefix)
            .or_else(contained)
            .map(|(_, place)| place)
    }
}

#[async_trait]
impl GeocoderPort for GazetteerGeocoder {
    async fn resolve(&self, address: &str) -> Result<Location, GeocodeError> {
        tokio::time::sleep(self.latency).await;
        let place = self.lookup(address).ok_or(GeocodeError::NotFound)?;
        debug!(%address, place = %place.name, "gazetteer match");
        Ok(Location::new(place.coordinate, address))
    }
}

/// Build the built-in geocoder with its default latency.
#[must_use]
pub fn geocoder() -> Arc<dyn GeocoderPort> {
    Arc::new(GazetteerGeocoder::builtin(DEFAULT_LATENCY))
}

/// Lowercase, keep letters and digits, and collapse everything else to single spaces.
fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
