//! Core booking domain for BookingsHQ: lifecycle, quoting, and address resolution.

/// Booking entity, quote formulas, and lifecycle capabilities.
pub mod booking;
/// TOML configuration.
pub mod config;
/// Value types shared across the crate.
pub mod model;
/// Traits describing external capabilities.
pub mod ports;
/// Map viewport computation.
pub mod region;
/// Ordered booking collection and creation policy.
pub mod registry;
/// Debounced address resolution.
pub mod resolver;
/// Demo bookings.
pub mod sample;

pub use booking::*;
pub use config::*;
pub use model::*;
pub use ports::*;
pub use region::*;
pub use registry::*;
pub use resolver::*;
pub use sample::*;
