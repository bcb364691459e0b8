//! Ordered booking collection and the single mutation point for front ends.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, trace};

use crate::booking::{Bookable, Booking, BookingError, Quotable};
use crate::model::{
    AddressField, BookingId, BookingStatus, Coordinate, Location, PackageSize, TaskDetails,
    TaskType,
};
use crate::sample::sample_bookings;

const CHANGE_BUFFER: usize = 64;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a new booking was rejected.
pub enum ValidationError {
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    Empty {
        /// Offending field.
        field: &'static str,
    },
    /// The policy requires a resolved location that is missing.
    #[error("{field} is required")]
    MissingLocation {
        /// Offending field.
        field: &'static str,
    },
    /// A location has a latitude or longitude outside the globe.
    #[error("{field} has an out-of-range coordinate")]
    CoordinateOutOfRange {
        /// Offending field.
        field: &'static str,
    },
    /// A location lies outside the configured service area.
    #[error("{field} is outside the service area")]
    OutsideServiceArea {
        /// Offending field.
        field: &'static str,
    },
}

impl ValidationError {
    /// Name of the field that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::MissingLocation { field }
            | Self::CoordinateOutOfRange { field }
            | Self::OutsideServiceArea { field } => field,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors returned by registry operations.
pub enum RegistryError {
    /// No booking with this id is registered.
    #[error("Unknown booking {0}")]
    UnknownBooking(BookingId),
    /// The new booking failed the creation policy.
    #[error("Invalid booking: {0}")]
    Validation(#[from] ValidationError),
    /// The booking refused the operation.
    #[error(transparent)]
    Booking(#[from] BookingError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Rectangle of coordinates bookings may be created in.
pub struct ServiceArea {
    /// Southern edge.
    pub min_latitude: f64,
    /// Northern edge.
    pub max_latitude: f64,
    /// Western edge.
    pub min_longitude: f64,
    /// Eastern edge.
    pub max_longitude: f64,
}

impl ServiceArea {
    /// Whether `coordinate` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&coordinate.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&coordinate.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
/// Rules a booking must satisfy to be created.
pub struct CreationPolicy {
    /// Reject blank customer names.
    pub require_customer_name: bool,
    /// Reject blank titles.
    pub require_title: bool,
    /// Require both pickup and dropoff to be resolved.
    pub require_locations: bool,
    /// Optional geographic bound for resolved locations.
    pub service_area: Option<ServiceArea>,
}

impl Default for CreationPolicy {
    fn default() -> Self {
        Self {
            require_customer_name: true,
            require_title: true,
            require_locations: false,
            service_area: None,
        }
    }
}

impl CreationPolicy {
    /// Check a draft against the policy.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, naming the failing field.
    pub fn validate(&self, draft: &NewBooking) -> Result<(), ValidationError> {
        if self.require_customer_name && draft.customer_name.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "customer_name",
            });
        }
        if self.require_title && draft.title.trim().is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        for field in [AddressField::Pickup, AddressField::Dropoff] {
            self.validate_location(field, draft.location(field))?;
        }
        Ok(())
    }

    fn validate_location(
        &self,
        field: AddressField,
        location: Option<&Location>,
    ) -> Result<(), ValidationError> {
        let name = field.field_name();
        let Some(location) = location else {
            return if self.require_locations {
                Err(ValidationError::MissingLocation { field: name })
            } else {
                Ok(())
            };
        };
        if !location.coordinate.is_valid() {
            return Err(ValidationError::CoordinateOutOfRange { field: name });
        }
        if let Some(area) = &self.service_area
            && !area.contains(location.coordinate)
        {
            return Err(ValidationError::OutsideServiceArea { field: name });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Fields collected for a booking that has not been created yet.
pub struct NewBooking {
    customer_name: String,
    title: String,
    description: String,
    task_type: TaskType,
    details: TaskDetails,
    pickup: Option<Location>,
    dropoff: Option<Location>,
}

impl NewBooking {
    /// Draft without a variant payload.
    #[must_use]
    pub fn new(customer_name: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            customer_name: customer_name.into(),
            title: String::new(),
            description: String::new(),
            task_type,
            details: TaskDetails::General,
            pickup: None,
            dropoff: None,
        }
    }

    /// Transport draft, as produced by the create form.
    #[must_use]
    pub fn transport(customer_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(customer_name, TaskType::Transport).with_title(title)
    }

    /// Removal draft quoted per item.
    #[must_use]
    pub fn removal(
        customer_name: impl Into<String>,
        from_address: impl Into<String>,
        to_address: impl Into<String>,
        item_count: u32,
    ) -> Self {
        let mut draft = Self::new(customer_name, TaskType::Removal);
        draft.details = TaskDetails::Removal {
            from_address: from_address.into(),
            to_address: to_address.into(),
            item_count,
        };
        draft
    }

    /// Delivery draft quoted by package size.
    #[must_use]
    pub fn delivery(
        customer_name: impl Into<String>,
        delivery_address: impl Into<String>,
        package_size: PackageSize,
    ) -> Self {
        let mut draft = Self::new(customer_name, TaskType::Delivery);
        draft.details = TaskDetails::Delivery {
            delivery_address: delivery_address.into(),
            package_size,
        };
        draft
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach resolved pickup and dropoff locations.
    #[must_use]
    pub fn with_locations(mut self, pickup: Option<Location>, dropoff: Option<Location>) -> Self {
        self.pickup = pickup;
        self.dropoff = dropoff;
        self
    }

    fn location(&self, field: AddressField) -> Option<&Location> {
        match field {
            AddressField::Pickup => self.pickup.as_ref(),
            AddressField::Dropoff => self.dropoff.as_ref(),
        }
    }

    fn into_booking(self) -> Booking {
        let booking = match self.details {
            TaskDetails::General => Booking::new(self.customer_name, self.task_type),
            TaskDetails::Removal {
                from_address,
                to_address,
                item_count,
            } => Booking::removal(self.customer_name, from_address, to_address, item_count),
            TaskDetails::Delivery {
                delivery_address,
                package_size,
            } => Booking::delivery(self.customer_name, delivery_address, package_size),
        };
        booking
            .titled(self.title)
            .described(self.description)
            .located(self.pickup, self.dropoff)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Notification sent to observers after every registry mutation.
pub enum RegistryChange {
    /// A booking was appended.
    Created(BookingId),
    /// A booking changed status.
    StatusChanged {
        /// Booking that changed.
        id: BookingId,
        /// Previous status.
        from: BookingStatus,
        /// New status.
        to: BookingStatus,
    },
    /// A quote was recalculated.
    Quoted {
        /// Booking that was quoted.
        id: BookingId,
        /// New estimate.
        cost: f64,
    },
    /// A quote was confirmed.
    Confirmed(BookingId),
    /// A description was replaced.
    DescriptionEdited(BookingId),
    /// A booking was completed with notes.
    Completed(BookingId),
}

/// Ordered collection of bookings.
pub struct BookingRegistry {
    bookings: Vec<Booking>,
    policy: CreationPolicy,
    changes: broadcast::Sender<RegistryChange>,
}

impl BookingRegistry {
    /// Empty registry enforcing `policy` on creation.
    #[must_use]
    pub fn new(policy: CreationPolicy) -> Self {
        Self::with_bookings(policy, Vec::new())
    }

    /// Registry seeded with existing bookings, kept in the given order.
    #[must_use]
    pub fn with_bookings(policy: CreationPolicy, bookings: Vec<Booking>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            bookings,
            policy,
            changes,
        }
    }

    /// Registry seeded with the demo bookings.
    #[must_use]
    pub fn with_sample_data(policy: CreationPolicy) -> Self {
        Self::with_bookings(policy, sample_bookings())
    }

    /// Receive a [`RegistryChange`] for every later mutation.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryChange> {
        self.changes.subscribe()
    }

    /// Policy applied by [`Self::create`].
    #[must_use]
    pub fn policy(&self) -> &CreationPolicy {
        &self.policy
    }

    /// Validate a draft and append it as a pending, unquoted booking.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] when the draft breaks the creation policy.
    pub fn create(&mut self, draft: NewBooking) -> Result<&Booking, RegistryError> {
        self.policy.validate(&draft)?;
        let booking = draft.into_booking();
        let id = booking.id();
        info!(%id, task_type = %booking.task_type(), "booking created");
        self.bookings.push(booking);
        self.notify(RegistryChange::Created(id));
        self.get(id).ok_or(RegistryError::UnknownBooking(id))
    }

    /// Overwrite a booking's status without checking the lifecycle graph.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownBooking`] when `id` is not registered.
    pub fn set_status(&mut self, id: BookingId, status: BookingStatus) -> Result<(), RegistryError> {
        let booking = self.booking_mut(id)?;
        let from = booking.status();
        booking.update_status(status);
        info!(%id, %from, to = %status, "status updated");
        self.notify(RegistryChange::StatusChanged {
            id,
            from,
            to: status,
        });
        Ok(())
    }

    /// Change a booking's status only along the lifecycle graph.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownBooking`] for an unknown id and
    /// [`RegistryError::Booking`] when the transition is not allowed.
    pub fn try_set_status(
        &mut self,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<(), RegistryError> {
        let booking = self.booking_mut(id)?;
        let from = booking.status();
        booking.try_transition(status)?;
        info!(%id, %from, to = %status, "status transitioned");
        self.notify(RegistryChange::StatusChanged {
            id,
            from,
            to: status,
        });
        Ok(())
    }

    /// Recalculate a booking's quote and return it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownBooking`] when `id` is not registered.
    pub fn request_quote(&mut self, id: BookingId) -> Result<f64, RegistryError> {
        let cost = self.booking_mut(id)?.calculate_quote();
        info!(%id, cost, "quote calculated");
        self.notify(RegistryChange::Quoted { id, cost });
        Ok(cost)
    }

    /// Confirm a booking's quote, forcing it to `Confirmed`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownBooking`] when `id` is not registered.
    pub fn confirm_quote(&mut self, id: BookingId) -> Result<(), RegistryError> {
        self.booking_mut(id)?.confirm_quote();
        info!(%id, "quote confirmed");
        self.notify(RegistryChange::Confirmed(id));
        Ok(())
    }

    /// Replace a booking's description.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownBooking`] when `id` is not registered.
    pub fn edit_description(
        &mut self,
        id: BookingId,
        description: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.booking_mut(id)?.set_description(description);
        self.notify(RegistryChange::DescriptionEdited(id));
        Ok(())
    }

    /// Mark a booking completed, recording its notes.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownBooking`] for an unknown id and
    /// [`RegistryError::Booking`] when notes were already recorded.
    pub fn complete(&mut self, id: BookingId, notes: impl Into<String>) -> Result<(), RegistryError> {
        self.booking_mut(id)?.complete(notes)?;
        info!(%id, "booking completed");
        self.notify(RegistryChange::Completed(id));
        Ok(())
    }

    /// All bookings in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Booking] {
        &self.bookings
    }

    /// Bookings with the given status, in insertion order.
    #[must_use]
    pub fn filter(&self, status: BookingStatus) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|booking| booking.status() == status)
            .collect()
    }

    /// Look up a booking by id.
    #[must_use]
    pub fn get(&self, id: BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|booking| booking.id() == id)
    }

    /// Number of bookings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    /// Whether the registry holds no bookings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    fn booking_mut(&mut self, id: BookingId) -> Result<&mut Booking, RegistryError> {
        self.bookings
            .iter_mut()
            .find(|booking| booking.id() == id)
            .ok_or(RegistryError::UnknownBooking(id))
    }

    fn notify(&self, change: RegistryChange) {
        if self.changes.send(change).is_err() {
            trace!("no registry observers");
        }
    }
}

impl Default for BookingRegistry {
    fn default() -> Self {
        Self::new(CreationPolicy::default())
    }
}
