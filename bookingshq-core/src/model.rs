//! Value types shared by bookings, the resolver, and the registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Opaque identifier generated when a booking is constructed.
pub struct BookingId(pub Uuid);

impl BookingId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// A point on the globe in decimal degrees.
pub struct Coordinate {
    /// Latitude, valid within `[-90, 90]`.
    pub latitude: f64,
    /// Longitude, valid within `[-180, 180]`.
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate without range checks.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside their geographic range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A resolved address: where it is and what the user typed for it.
pub struct Location {
    /// Geocoded position.
    pub coordinate: Coordinate,
    /// Free-text address or description.
    pub label: String,
}

impl Location {
    /// Create a location from a coordinate and its label.
    #[must_use]
    pub fn new(coordinate: Coordinate, label: impl Into<String>) -> Self {
        Self {
            coordinate,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// The two address slots a booking carries.
pub enum AddressField {
    /// Where the job starts.
    Pickup,
    /// Where the job ends.
    Dropoff,
}

impl AddressField {
    /// Field name used in validation messages.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Pickup => "pickup_location",
            Self::Dropoff => "dropoff_location",
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pickup => "pickup",
            Self::Dropoff => "dropoff",
        };
        write!(formatter, "{label}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Lifecycle states of a booking.
pub enum BookingStatus {
    /// Freshly created, awaiting confirmation.
    #[default]
    Pending,
    /// Quote accepted or booking approved.
    Confirmed,
    /// Work has started.
    InProgress,
    /// Work finished. Terminal.
    Completed,
    /// Booking withdrawn. Terminal.
    Cancelled,
}

impl BookingStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Statuses reachable from `self` along the lifecycle graph.
    #[must_use]
    pub const fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::InProgress],
            Self::InProgress => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Whether moving from `self` to `next` follows the lifecycle graph.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Completed and Cancelled accept no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        };
        write!(formatter, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Kind of job a booking describes.
pub enum TaskType {
    /// Moving household items between two addresses.
    Removal,
    /// Dropping a package at an address.
    Delivery,
    /// General-purpose transport.
    Transport,
}

impl TaskType {
    /// Every task type.
    pub const ALL: [Self; 3] = [Self::Removal, Self::Delivery, Self::Transport];
}

impl fmt::Display for TaskType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Removal => "Removal",
            Self::Delivery => "Delivery",
            Self::Transport => "Transport",
        };
        write!(formatter, "{label}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Package sizes accepted for deliveries.
pub enum PackageSize {
    /// Standard parcel.
    #[default]
    Small,
    /// Bulky parcel.
    Large,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown package size: {0}")]
/// Raised when a package size label is neither `Small` nor `Large`.
pub struct UnknownPackageSize(pub String);

impl FromStr for PackageSize {
    type Err = UnknownPackageSize;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "large" => Ok(Self::Large),
            _ => Err(UnknownPackageSize(raw.to_owned())),
        }
    }
}

impl fmt::Display for PackageSize {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Small => "Small",
            Self::Large => "Large",
        };
        write!(formatter, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Variant-specific payload that selects the quote formula.
pub enum TaskDetails {
    /// No variant payload; quoted with a random estimate.
    General,
    /// Removal job between two street addresses.
    Removal {
        /// Address items are collected from.
        from_address: String,
        /// Address items are moved to.
        to_address: String,
        /// Number of items to move.
        item_count: u32,
    },
    /// Delivery of a single package.
    Delivery {
        /// Destination address.
        delivery_address: String,
        /// Parcel size.
        package_size: PackageSize,
    },
}
