//! The booking entity, its quote formulas, and its lifecycle transitions.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{
    AddressField, BookingId, BookingStatus, Location, PackageSize, TaskDetails, TaskType,
};

/// Bounds of the random estimate given to bookings without a variant payload.
pub const GENERAL_QUOTE_RANGE: RangeInclusive<f64> = 100.0..=500.0;
/// Flat fee added to every removal quote.
pub const REMOVAL_BASE_FEE: f64 = 100.0;
/// Per-item charge for removals.
pub const REMOVAL_PER_ITEM: f64 = 25.0;
/// Delivery price for a large package.
pub const DELIVERY_LARGE: f64 = 150.0;
/// Delivery price for a small package.
pub const DELIVERY_SMALL: f64 = 75.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors raised by the strict booking operations.
pub enum BookingError {
    /// The requested status change is not an edge of the lifecycle graph.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Status the booking was in.
        from: BookingStatus,
        /// Status that was requested.
        to: BookingStatus,
    },
    /// Completion notes were already written for this booking.
    #[error("Completion notes already recorded")]
    CompletionNotesAlreadyRecorded,
}

/// Identity and lifecycle capability.
pub trait Bookable {
    /// Identifier fixed at construction.
    fn id(&self) -> BookingId;

    /// Name of the customer the job is for.
    fn customer_name(&self) -> &str;

    /// Current lifecycle status.
    fn status(&self) -> BookingStatus;

    /// Construction timestamp.
    fn created_at(&self) -> DateTime<Utc>;

    /// Overwrite the status. No lifecycle validation happens here.
    fn update_status(&mut self, status: BookingStatus);
}

/// Pricing capability.
pub trait Quotable {
    /// Last computed quote, `0.0` until one is calculated.
    fn estimated_cost(&self) -> f64;

    /// Whether the quote has been confirmed.
    fn is_confirmed(&self) -> bool;

    /// Recompute the quote, store it, and return it.
    fn calculate_quote(&mut self) -> f64;

    /// Mark the quote confirmed and force the status to `Confirmed`.
    fn confirm_quote(&mut self);
}

/// Price a job from its variant payload.
///
/// Removal and delivery quotes are deterministic; general jobs draw uniformly from
/// [`GENERAL_QUOTE_RANGE`].
pub fn quote_for<R: Rng>(details: &TaskDetails, rng: &mut R) -> f64 {
    match details {
        TaskDetails::General => rng.gen_range(GENERAL_QUOTE_RANGE),
        TaskDetails::Removal { item_count, .. } => {
            f64::from(*item_count) * REMOVAL_PER_ITEM + REMOVAL_BASE_FEE
        }
        TaskDetails::Delivery { package_size, .. } => match package_size {
            PackageSize::Large => DELIVERY_LARGE,
            PackageSize::Small => DELIVERY_SMALL,
        },
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A customer job with a lifecycle status and a price estimate.
pub struct Booking {
    id: BookingId,
    customer_name: String,
    title: String,
    description: String,
    task_type: TaskType,
    details: TaskDetails,
    status: BookingStatus,
    estimated_cost: f64,
    is_confirmed: bool,
    pickup_location: Option<Location>,
    dropoff_location: Option<Location>,
    completion_notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl Booking {
    /// Create a pending booking with no variant payload.
    #[must_use]
    pub fn new(customer_name: impl Into<String>, task_type: TaskType) -> Self {
        Self::with_details(customer_name, task_type, TaskDetails::General)
    }

    /// Create a removal booking quoted per item.
    #[must_use]
    pub fn removal(
        customer_name: impl Into<String>,
        from_address: impl Into<String>,
        to_address: impl Into<String>,
        item_count: u32,
    ) -> Self {
        let details = TaskDetails::Removal {
            from_address: from_address.into(),
            to_address: to_address.into(),
            item_count,
        };
        Self::with_details(customer_name, TaskType::Removal, details)
    }

    /// Create a delivery booking quoted by package size.
    #[must_use]
    pub fn delivery(
        customer_name: impl Into<String>,
        delivery_address: impl Into<String>,
        package_size: PackageSize,
    ) -> Self {
        let details = TaskDetails::Delivery {
            delivery_address: delivery_address.into(),
            package_size,
        };
        Self::with_details(customer_name, TaskType::Delivery, details)
    }

    fn with_details(
        customer_name: impl Into<String>,
        task_type: TaskType,
        details: TaskDetails,
    ) -> Self {
        Self {
            id: BookingId::generate(),
            customer_name: customer_name.into(),
            title: String::new(),
            description: String::new(),
            task_type,
            details,
            status: BookingStatus::Pending,
            estimated_cost: 0.0,
            is_confirmed: false,
            pickup_location: None,
            dropoff_location: None,
            completion_notes: None,
            created_at: Utc::now(),
        }
    }

    /// Set the title while building a booking.
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description while building a booking.
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach resolved locations while building a booking.
    #[must_use]
    pub fn located(mut self, pickup: Option<Location>, dropoff: Option<Location>) -> Self {
        self.pickup_location = pickup;
        self.dropoff_location = dropoff;
        self
    }

    /// Short job title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Free-form job description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replace the description. Allowed in any status.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Kind of job, fixed at construction.
    #[must_use]
    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Variant payload used for quoting.
    #[must_use]
    pub fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Resolved pickup location, if any.
    #[must_use]
    pub fn pickup_location(&self) -> Option<&Location> {
        self.pickup_location.as_ref()
    }

    /// Resolved dropoff location, if any.
    #[must_use]
    pub fn dropoff_location(&self) -> Option<&Location> {
        self.dropoff_location.as_ref()
    }

    /// Location held in the given slot.
    #[must_use]
    pub fn location(&self, field: AddressField) -> Option<&Location> {
        match field {
            AddressField::Pickup => self.pickup_location(),
            AddressField::Dropoff => self.dropoff_location(),
        }
    }

    /// Write or clear a location slot.
    pub fn set_location(&mut self, field: AddressField, location: Option<Location>) {
        match field {
            AddressField::Pickup => self.pickup_location = location,
            AddressField::Dropoff => self.dropoff_location = location,
        }
    }

    /// Notes written when the job was completed; empty before that.
    #[must_use]
    pub fn completion_notes(&self) -> &str {
        self.completion_notes.as_deref().unwrap_or_default()
    }

    /// Recompute the quote with a caller-supplied random source.
    pub fn calculate_quote_with<R: Rng>(&mut self, rng: &mut R) -> f64 {
        self.estimated_cost = quote_for(&self.details, rng);
        self.estimated_cost
    }

    /// Move to `next` only if the lifecycle graph allows it.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] when `next` is not reachable from the
    /// current status; the booking is left untouched.
    pub fn try_transition(&mut self, next: BookingStatus) -> Result<(), BookingError> {
        if !self.status.can_transition_to(next) {
            return Err(BookingError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Record completion notes and mark the booking completed in one step.
    ///
    /// Like [`Bookable::update_status`], the current status is not checked.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::CompletionNotesAlreadyRecorded`] when notes exist already.
    pub fn complete(&mut self, notes: impl Into<String>) -> Result<(), BookingError> {
        if self.completion_notes.is_some() {
            return Err(BookingError::CompletionNotesAlreadyRecorded);
        }
        self.completion_notes = Some(notes.into());
        self.status = BookingStatus::Completed;
        Ok(())
    }
}

impl Bookable for Booking {
    fn id(&self) -> BookingId {
        self.id
    }

    fn customer_name(&self) -> &str {
        &self.customer_name
    }

    fn status(&self) -> BookingStatus {
        self.status
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn update_status(&mut self, status: BookingStatus) {
        self.status = status;
    }
}

impl Quotable for Booking {
    fn estimated_cost(&self) -> f64 {
        self.estimated_cost
    }

    fn is_confirmed(&self) -> bool {
        self.is_confirmed
    }

    fn calculate_quote(&mut self) -> f64 {
        self.calculate_quote_with(&mut rand::thread_rng())
    }

    fn confirm_quote(&mut self) {
        self.is_confirmed = true;
        self.status = BookingStatus::Confirmed;
    }
}
