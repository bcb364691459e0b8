//! Map viewport computation for resolved pickup and dropoff locations.

use serde::{Deserialize, Serialize};

use crate::model::{Coordinate, Location};

/// Smallest span shown around a single point, in degrees.
pub const MIN_SPAN: f64 = 0.01;
/// Largest span allowed on either axis, in degrees.
pub const MAX_SPAN: f64 = 180.0;
/// Padding factor applied to the distance between two points.
pub const SPAN_PADDING: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Extent of a map view in degrees.
pub struct Span {
    /// Latitude extent.
    pub latitude_delta: f64,
    /// Longitude extent.
    pub longitude_delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Centre and extent of a map view.
pub struct MapRegion {
    /// Centre of the view.
    pub center: Coordinate,
    /// Extent of the view.
    pub span: Span,
}

impl MapRegion {
    /// Region centred on `center` with the same span on both axes.
    #[must_use]
    pub const fn square(center: Coordinate, span: f64) -> Self {
        Self {
            center,
            span: Span {
                latitude_delta: span,
                longitude_delta: span,
            },
        }
    }
}

/// Compute the view that frames the given locations.
///
/// Returns `None` when neither location is present; callers keep their previous region.
#[must_use]
pub fn region_for(pickup: Option<&Location>, dropoff: Option<&Location>) -> Option<MapRegion> {
    match (pickup, dropoff) {
        (Some(first), Some(second)) => Some(framing(first.coordinate, second.coordinate)),
        (Some(only), None) | (None, Some(only)) => {
            Some(MapRegion::square(only.coordinate, MIN_SPAN))
        }
        (None, None) => None,
    }
}

fn framing(first: Coordinate, second: Coordinate) -> MapRegion {
    let center = Coordinate::new(
        (first.latitude + second.latitude) / 2.0,
        (first.longitude + second.longitude) / 2.0,
    );
    let span = Span {
        latitude_delta: padded_delta(first.latitude, second.latitude),
        longitude_delta: padded_delta(first.longitude, second.longitude),
    };
    MapRegion { center, span }
}

fn padded_delta(first: f64, second: f64) -> f64 {
    ((first - second).abs() * SPAN_PADDING).clamp(MIN_SPAN, MAX_SPAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(latitude: f64, longitude: f64) -> Location {
        Location::new(Coordinate::new(latitude, longitude), "somewhere")
    }

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn no_locations_keeps_previous_region() {
        assert_eq!(region_for(None, None), None);
    }

    #[test]
    fn single_location_uses_minimum_span() {
        let dropoff = at(-33.8650, 151.2094);
        let region = region_for(None, Some(&dropoff));
        assert_eq!(
            region,
            Some(MapRegion::square(Coordinate::new(-33.8650, 151.2094), MIN_SPAN))
        );
    }

    #[test]
    fn two_nearby_locations_center_on_midpoint() {
        let pickup = at(-33.8688, 151.2093);
        let dropoff = at(-33.8650, 151.2094);
        let region = region_for(Some(&pickup), Some(&dropoff));
        let Some(region) = region else {
            panic!("two locations must produce a region");
        };
        assert!(close(region.center.latitude, -33.8669));
        assert!(close(region.center.longitude, 151.20935));
        assert!(region.span.latitude_delta >= MIN_SPAN);
        assert!(region.span.longitude_delta >= MIN_SPAN);
        assert!(close(region.span.longitude_delta, MIN_SPAN));
    }

    #[test]
    fn distant_locations_pad_the_delta() {
        let region = region_for(Some(&at(10.0, 20.0)), Some(&at(14.0, 30.0)));
        let Some(region) = region else {
            panic!("two locations must produce a region");
        };
        assert!(close(region.span.latitude_delta, 6.0));
        assert!(close(region.span.longitude_delta, 15.0));
    }

    #[test]
    fn spans_are_clamped_independently() {
        let region = region_for(Some(&at(-80.0, -170.0)), Some(&at(80.0, 170.0)));
        let Some(region) = region else {
            panic!("two locations must produce a region");
        };
        assert!(close(region.span.latitude_delta, MAX_SPAN));
        assert!(close(region.span.longitude_delta, MAX_SPAN));
        assert!(close(region.center.latitude, 0.0));
    }
}
