//! Debounced, cancellable address resolution for the pickup and dropoff fields.
//!
//! Each field owns a generation counter. Every edit bumps it, aborts the previous
//! request task, and schedules a new one that sleeps through the debounce window before
//! calling the geocoder. Results travel back over a channel and are applied by the owner
//! only if their generation is still current, so a late answer for old text can never
//! overwrite a newer one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::{AddressField, Location};
use crate::ports::{GeocodeError, GeocoderPort};
use crate::region::{MapRegion, region_for};

#[derive(Debug, Clone, PartialEq)]
/// Observable outcome of applying a resolution or an edit.
pub enum ResolverEvent {
    /// A geocode succeeded and the field now holds `location`.
    Updated {
        /// Field that changed.
        field: AddressField,
        /// New location, labelled with the text that was geocoded.
        location: Location,
        /// Region framing the resolved locations.
        region: MapRegion,
    },
    /// The field text was emptied and its location removed.
    Cleared {
        /// Field that changed.
        field: AddressField,
        /// Region after the location was removed.
        region: MapRegion,
    },
    /// The geocoder failed; the previous location is kept.
    Failed {
        /// Field whose request failed.
        field: AddressField,
        /// Text that was sent to the geocoder.
        text: String,
        /// Reason reported by the geocoder.
        error: GeocodeError,
    },
    /// A result arrived for a request that has since been superseded and was dropped.
    Stale {
        /// Field the result belonged to.
        field: AddressField,
        /// Generation the result was requested under.
        generation: u64,
    },
}

#[derive(Debug)]
struct Resolution {
    field: AddressField,
    generation: u64,
    text: String,
    outcome: Result<Location, GeocodeError>,
}

struct FieldState {
    generation: u64,
    text: watch::Sender<String>,
    pending: Option<JoinHandle<()>>,
    location: Option<Location>,
}

impl FieldState {
    fn new() -> Self {
        let (text, _) = watch::channel(String::new());
        Self {
            generation: 0,
            text,
            pending: None,
            location: None,
        }
    }

    /// Invalidate whatever was scheduled before and return the new generation.
    fn supersede(&mut self) -> u64 {
        self.generation += 1;
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation
    }
}

/// Turns address text into locations for the pickup and dropoff fields.
pub struct AddressResolver {
    geocoder: Arc<dyn GeocoderPort>,
    debounce: Duration,
    pickup: FieldState,
    dropoff: FieldState,
    region: MapRegion,
    initial_region: MapRegion,
    results_tx: mpsc::UnboundedSender<Resolution>,
    results_rx: mpsc::UnboundedReceiver<Resolution>,
}

impl AddressResolver {
    /// Create a resolver with an explicit debounce window and starting region.
    #[must_use]
    pub fn new(
        geocoder: Arc<dyn GeocoderPort>,
        debounce: Duration,
        initial_region: MapRegion,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            geocoder,
            debounce,
            pickup: FieldState::new(),
            dropoff: FieldState::new(),
            region: initial_region,
            initial_region,
            results_tx,
            results_rx,
        }
    }

    /// Create a resolver using the configured debounce window and default map region.
    #[must_use]
    pub fn from_config(geocoder: Arc<dyn GeocoderPort>, config: &Config) -> Self {
        Self::new(
            geocoder,
            config.resolver.debounce(),
            config.map.default_region(),
        )
    }

    /// Record new text for `field` and schedule its resolution.
    ///
    /// Any request still waiting or in flight for the same field is cancelled. Empty
    /// text clears the field immediately and returns the resulting
    /// [`ResolverEvent::Cleared`]; otherwise the geocoder is called once the debounce
    /// window passes without further edits, and the outcome is delivered through
    /// [`Self::next_event`] or [`Self::try_next_event`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn on_address_changed(
        &mut self,
        field: AddressField,
        text: impl Into<String>,
    ) -> Option<ResolverEvent> {
        let text = text.into();
        let debounce = self.debounce;
        let geocoder = Arc::clone(&self.geocoder);
        let results_tx = self.results_tx.clone();

        let slot = self.slot_mut(field);
        let generation = slot.supersede();
        let is_empty = text.is_empty();
        slot.text.send_replace(text);

        if is_empty {
            slot.location = None;
            debug!(%field, generation, "address cleared");
            self.refresh_region();
            return Some(ResolverEvent::Cleared {
                field,
                region: self.region,
            });
        }

        let latest = slot.text.subscribe();
        debug!(%field, generation, "geocode scheduled");
        slot.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let text = latest.borrow().clone();
            debug!(%field, generation, %text, "geocode dispatched");
            let outcome = geocoder.resolve(&text).await;
            let resolution = Resolution {
                field,
                generation,
                text,
                outcome,
            };
            if results_tx.send(resolution).is_err() {
                debug!(%field, generation, "resolver dropped before result arrived");
            }
        }));
        None
    }

    /// Wait for the next resolution and apply it.
    ///
    /// Only returns once a scheduled request produces a result.
    pub async fn next_event(&mut self) -> Option<ResolverEvent> {
        let resolution = self.results_rx.recv().await?;
        Some(self.apply(resolution))
    }

    /// Apply the next resolution if one has already arrived.
    pub fn try_next_event(&mut self) -> Option<ResolverEvent> {
        let resolution = self.results_rx.try_recv().ok()?;
        Some(self.apply(resolution))
    }

    /// Apply every resolution that has already arrived, in arrival order.
    pub fn drain(&mut self) -> Vec<ResolverEvent> {
        std::iter::from_fn(|| self.try_next_event()).collect()
    }

    fn apply(&mut self, resolution: Resolution) -> ResolverEvent {
        let Resolution {
            field,
            generation,
            text,
            outcome,
        } = resolution;

        let slot = self.slot_mut(field);
        if generation != slot.generation {
            debug!(%field, generation, current = slot.generation, "stale geocode discarded");
            return ResolverEvent::Stale { field, generation };
        }
        slot.pending = None;

        match outcome {
            Ok(resolved) => {
                let location = Location::new(resolved.coordinate, text);
                slot.location = Some(location.clone());
                self.refresh_region();
                ResolverEvent::Updated {
                    field,
                    location,
                    region: self.region,
                }
            }
            Err(error) => {
                warn!(%field, %text, %error, "geocode failed; keeping previous location");
                ResolverEvent::Failed { field, text, error }
            }
        }
    }

    fn refresh_region(&mut self) {
        if let Some(region) = region_for(self.pickup.location.as_ref(), self.dropoff.location.as_ref())
        {
            self.region = region;
        }
    }

    fn slot(&self, field: AddressField) -> &FieldState {
        match field {
            AddressField::Pickup => &self.pickup,
            AddressField::Dropoff => &self.dropoff,
        }
    }

    fn slot_mut(&mut self, field: AddressField) -> &mut FieldState {
        match field {
            AddressField::Pickup => &mut self.pickup,
            AddressField::Dropoff => &mut self.dropoff,
        }
    }

    /// Location currently held for `field`.
    #[must_use]
    pub fn location(&self, field: AddressField) -> Option<&Location> {
        self.slot(field).location.as_ref()
    }

    /// Latest text recorded for `field`.
    #[must_use]
    pub fn text(&self, field: AddressField) -> String {
        self.slot(field).text.borrow().clone()
    }

    /// Current request generation for `field`.
    #[must_use]
    pub fn generation(&self, field: AddressField) -> u64 {
        self.slot(field).generation
    }

    /// Whether a request for `field` is waiting out its debounce or awaiting the geocoder.
    #[must_use]
    pub fn is_resolving(&self, field: AddressField) -> bool {
        self.slot(field).pending.is_some()
    }

    /// Region framing the resolved locations, or the last one shown.
    #[must_use]
    pub fn region(&self) -> MapRegion {
        self.region
    }

    /// Copies of both resolved locations, ready to attach to a booking.
    #[must_use]
    pub fn locations(&self) -> (Option<Location>, Option<Location>) {
        (self.pickup.location.clone(), self.dropoff.location.clone())
    }

    /// Cancel everything and forget both fields.
    pub fn reset(&mut self) {
        for field in [AddressField::Pickup, AddressField::Dropoff] {
            let slot = self.slot_mut(field);
            slot.supersede();
            slot.text.send_replace(String::new());
            slot.location = None;
        }
        self.region = self.initial_region;
    }
}

impl Drop for AddressResolver {
    fn drop(&mut self) {
        for slot in [&mut self.pickup, &mut self.dropoff] {
            if let Some(handle) = slot.pending.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time;

    use super::*;
    use crate::model::Coordinate;
    use crate::region::MIN_SPAN;

    const DEBOUNCE: Duration = Duration::from_millis(500);

    /// Geocoder answering from a fixed table, optionally after a delay.
    #[derive(Default)]
    struct ScriptedGeocoder {
        places: HashMap<String, (Coordinate, Duration)>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedGeocoder {
        fn with(mut self, address: &str, latitude: f64, longitude: f64) -> Self {
            self.places.insert(
                address.to_owned(),
                (Coordinate::new(latitude, longitude), Duration::ZERO),
            );
            self
        }

        fn slow(mut self, address: &str, latitude: f64, longitude: f64, delay: Duration) -> Self {
            self.places.insert(
                address.to_owned(),
                (Coordinate::new(latitude, longitude), delay),
            );
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl GeocoderPort for ScriptedGeocoder {
        async fn resolve(&self, address: &str) -> Result<Location, GeocodeError> {
            self.calls.lock().expect("calls lock").push(address.to_owned());
            let (coordinate, delay) = *self.places.get(address).ok_or(GeocodeError::NotFound)?;
            time::sleep(delay).await;
            Ok(Location::new(coordinate, address))
        }
    }

    fn resolver(geocoder: &Arc<ScriptedGeocoder>) -> AddressResolver {
        let geocoder: Arc<dyn GeocoderPort> = Arc::clone(geocoder) as Arc<dyn GeocoderPort>;
        AddressResolver::new(geocoder, DEBOUNCE, Config::default().map.default_region())
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_send_one_request_with_latest_text() {
        let geocoder = Arc::new(ScriptedGeocoder::default().with("Syd", -33.8688, 151.2093));
        let mut resolver = resolver(&geocoder);

        for text in ["S", "Sy", "Syd"] {
            assert_eq!(resolver.on_address_changed(AddressField::Pickup, text), None);
            time::advance(Duration::from_millis(100)).await;
        }
        let event = resolver.next_event().await;

        assert_eq!(geocoder.calls(), ["Syd"]);
        let Some(ResolverEvent::Updated { field, location, .. }) = event else {
            panic!("expected an update, got {event:?}");
        };
        assert_eq!(field, AddressField::Pickup);
        assert_eq!(location.label, "Syd");
        assert!(!resolver.is_resolving(AddressField::Pickup));
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_edits_send_a_request_each() {
        let geocoder = Arc::new(
            ScriptedGeocoder::default()
                .with("Syd", -33.8688, 151.2093)
                .with("Sydney", -33.8688, 151.2093),
        );
        let mut resolver = resolver(&geocoder);

        resolver.on_address_changed(AddressField::Pickup, "Syd");
        resolver.next_event().await;
        resolver.on_address_changed(AddressField::Pickup, "Sydney");
        resolver.next_event().await;

        assert_eq!(geocoder.calls(), ["Syd", "Sydney"]);
        assert_eq!(
            resolver.location(AddressField::Pickup).map(|loc| loc.label.as_str()),
            Some("Sydney")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_sent_before_the_window_closes() {
        let geocoder = Arc::new(ScriptedGeocoder::default().with("Syd", -33.8688, 151.2093));
        let mut resolver = resolver(&geocoder);

        resolver.on_address_changed(AddressField::Pickup, "Syd");
        time::sleep(Duration::from_millis(499)).await;
        assert!(geocoder.calls().is_empty());
        assert!(resolver.is_resolving(AddressField::Pickup));
        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(geocoder.calls(), ["Syd"]);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_result_for_old_text_is_discarded() {
        let geocoder = Arc::new(
            ScriptedGeocoder::default()
                .with("A", 1.0, 1.0)
                .with("B", 2.0, 2.0),
        );
        let mut resolver = resolver(&geocoder);

        resolver.on_address_changed(AddressField::Dropoff, "A");
        time::sleep(Duration::from_millis(600)).await;
        resolver.on_address_changed(AddressField::Dropoff, "B");
        time::sleep(Duration::from_millis(600)).await;

        let events = resolver.drain();
        assert_eq!(geocoder.calls(), ["A", "B"]);
        assert_eq!(
            events.first(),
            Some(&ResolverEvent::Stale {
                field: AddressField::Dropoff,
                generation: 1,
            })
        );
        assert!(matches!(
            events.get(1),
            Some(ResolverEvent::Updated { location, .. }) if location.label == "B"
        ));
        let dropoff = resolver.location(AddressField::Dropoff).expect("dropoff resolved");
        assert_eq!(dropoff.label, "B");
        assert_eq!(dropoff.coordinate, Coordinate::new(2.0, 2.0));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_request_is_cancelled_by_newer_edit() {
        let geocoder = Arc::new(
            ScriptedGeocoder::default()
                .slow("A", 1.0, 1.0, Duration::from_secs(2))
                .with("B", 2.0, 2.0),
        );
        let mut resolver = resolver(&geocoder);

        resolver.on_address_changed(AddressField::Pickup, "A");
        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(geocoder.calls(), ["A"]);

        resolver.on_address_changed(AddressField::Pickup, "B");
        resolver.next_event().await;
        time::sleep(Duration::from_secs(5)).await;

        assert_eq!(resolver.try_next_event(), None);
        assert_eq!(
            resolver.location(AddressField::Pickup).map(|loc| loc.label.as_str()),
            Some("B")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_previous_location() {
        let geocoder = Arc::new(ScriptedGeocoder::default().with("Syd", -33.8688, 151.2093));
        let mut resolver = resolver(&geocoder);

        resolver.on_address_changed(AddressField::Pickup, "Syd");
        resolver.next_event().await;
        resolver.on_address_changed(AddressField::Pickup, "Nowhere");
        let event = resolver.next_event().await;

        assert_eq!(
            event,
            Some(ResolverEvent::Failed {
                field: AddressField::Pickup,
                text: "Nowhere".to_owned(),
                error: GeocodeError::NotFound,
            })
        );
        assert_eq!(
            resolver.location(AddressField::Pickup).map(|loc| loc.label.as_str()),
            Some("Syd")
        );
        assert_eq!(resolver.text(AddressField::Pickup), "Nowhere");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_text_clears_without_debounce() {
        let geocoder = Arc::new(ScriptedGeocoder::default().with("Syd", -33.8688, 151.2093));
        let mut resolver = resolver(&geocoder);

        resolver.on_address_changed(AddressField::Pickup, "Syd");
        resolver.next_event().await;
        let event = resolver.on_address_changed(AddressField::Pickup, "");

        assert!(matches!(
            event,
            Some(ResolverEvent::Cleared {
                field: AddressField::Pickup,
                ..
            })
        ));
        assert!(resolver.location(AddressField::Pickup).is_none());
        assert!(!resolver.is_resolving(AddressField::Pickup));
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_cancels_a_pending_request() {
        let geocoder = Arc::new(ScriptedGeocoder::default().with("Syd", -33.8688, 151.2093));
        let mut resolver = resolver(&geocoder);

        resolver.on_address_changed(AddressField::Pickup, "Syd");
        resolver.on_address_changed(AddressField::Pickup, "");
        time::sleep(Duration::from_secs(1)).await;

        assert!(geocoder.calls().is_empty());
        assert_eq!(resolver.try_next_event(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn fields_resolve_independently_and_frame_the_map() {
        let geocoder = Arc::new(
            ScriptedGeocoder::default()
                .with("Circular Quay", -33.8688, 151.2093)
                .with("The Rocks", -33.8650, 151.2094),
        );
        let mut resolver = resolver(&geocoder);

        resolver.on_address_changed(AddressField::Pickup, "Circular Quay");
        time::advance(Duration::from_millis(200)).await;
        resolver.on_address_changed(AddressField::Dropoff, "The Rocks");

        let first = resolver.next_event().await;
        assert!(matches!(
            first,
            Some(ResolverEvent::Updated { region, .. }) if region.span.latitude_delta == MIN_SPAN
        ));
        resolver.next_event().await;

        assert_eq!(geocoder.calls(), ["Circular Quay", "The Rocks"]);
        let region = resolver.region();
        assert!((region.center.latitude + 33.8669).abs() < 1e-9);
        assert!((region.center.longitude - 151.209_35).abs() < 1e-9);
        let (pickup, dropoff) = resolver.locations();
        assert!(pickup.is_some() && dropoff.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_restores_initial_region() {
        let geocoder = Arc::new(ScriptedGeocoder::default().with("Syd", 10.0, 10.0));
        let mut resolver = resolver(&geocoder);
        let initial = resolver.region();

        resolver.on_address_changed(AddressField::Pickup, "Syd");
        resolver.next_event().await;
        assert_ne!(resolver.region(), initial);

        resolver.reset();
        assert_eq!(resolver.region(), initial);
        assert_eq!(resolver.locations(), (None, None));
        assert_eq!(resolver.text(AddressField::Pickup), "");
    }
}
