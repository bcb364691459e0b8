//! Traits describing external capabilities the core depends on.

use async_trait::async_trait;

use crate::model::Location;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors a geocoding backend can report.
pub enum GeocodeError {
    /// The address did not match any known place.
    #[error("No result for address")]
    NotFound,
    /// The backend could not be reached or refused the request.
    #[error("Geocoder unavailable: {0}")]
    Unavailable(String),
    /// The backend gave up waiting for an answer.
    #[error("Geocoder timed out")]
    Timeout,
}

#[async_trait]
/// Trait for backends that turn free-text addresses into locations.
pub trait GeocoderPort: Send + Sync {
    /// Resolve an address to a location labelled with the input text.
    ///
    /// # Errors
    ///
    /// Returns a [`GeocodeError`] when the address has no match or the backend fails.
    async fn resolve(&self, address: &str) -> Result<Location, GeocodeError>;
}
