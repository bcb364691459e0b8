use bookingshq_core::{
    AddressField, AddressResolver, Bookable, Booking, BookingId, BookingRegistry, BookingStatus,
    NewBooking, ResolverEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    BookingList,
    BookingDetail,
    CompletionNotes,
    CreateBooking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    CustomerName,
    Title,
    Pickup,
    Dropoff,
    Description,
}

impl FormField {
    pub(crate) const ORDER: [Self; 5] = [
        Self::CustomerName,
        Self::Title,
        Self::Pickup,
        Self::Dropoff,
        Self::Description,
    ];

    pub(crate) fn next(self) -> Self {
        match self {
            Self::CustomerName => Self::Title,
            Self::Title => Self::Pickup,
            Self::Pickup => Self::Dropoff,
            Self::Dropoff => Self::Description,
            Self::Description => Self::CustomerName,
        }
    }

    pub(crate) fn previous(self) -> Self {
        match self {
            Self::CustomerName => Self::Description,
            Self::Title => Self::CustomerName,
            Self::Pickup => Self::Title,
            Self::Dropoff => Self::Pickup,
            Self::Description => Self::Dropoff,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::CustomerName => "Customer Name",
            Self::Title => "Booking Title",
            Self::Pickup => "Pickup Address",
            Self::Dropoff => "Dropoff Address",
            Self::Description => "Description",
        }
    }

    pub(crate) fn address(self) -> Option<AddressField> {
        match self {
            Self::Pickup => Some(AddressField::Pickup),
            Self::Dropoff => Some(AddressField::Dropoff),
            Self::CustomerName | Self::Title | Self::Description => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CreateForm {
    pub customer_name: String,
    pub title: String,
    pub pickup: String,
    pub dropoff: String,
    pub description: String,
}

impl CreateForm {
    pub(crate) fn value(&self, field: FormField) -> &str {
        match field {
            FormField::CustomerName => &self.customer_name,
            FormField::Title => &self.title,
            FormField::Pickup => &self.pickup,
            FormField::Dropoff => &self.dropoff,
            FormField::Description => &self.description,
        }
    }

    pub(crate) fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::CustomerName => &mut self.customer_name,
            FormField::Title => &mut self.title,
            FormField::Pickup => &mut self.pickup,
            FormField::Dropoff => &mut self.dropoff,
            FormField::Description => &mut self.description,
        }
    }

    pub(crate) fn is_submittable(&self) -> bool {
        !self.customer_name.trim().is_empty() && !self.title.trim().is_empty()
    }
}

pub(crate) struct App {
    pub registry: BookingRegistry,
    pub resolver: AddressResolver,

    pub screen: Screen,
    pub list_index: usize,
    pub status_filter: Option<BookingStatus>,
    pub selected: Option<BookingId>,

    pub form: CreateForm,
    pub focus: FormField,
    pub notes_input: String,

    pub error_message: Option<String>,
    pub info_message: Option<String>,
}

impl App {
    pub(crate) fn new(registry: BookingRegistry, resolver: AddressResolver) -> Self {
        Self {
            registry,
            resolver,
            screen: Screen::BookingList,
            list_index: 0,
            status_filter: None,
            selected: None,
            form: CreateForm::default(),
            focus: FormField::CustomerName,
            notes_input: String::new(),
            error_message: None,
            info_message: None,
        }
    }

    pub(crate) fn visible_bookings(&self) -> Vec<&Booking> {
        match self.status_filter {
            Some(status) => self.registry.filter(status),
            None => self.registry.all().iter().collect(),
        }
    }

    pub(crate) fn selected_booking(&self) -> Option<&Booking> {
        self.selected.and_then(|id| self.registry.get(id))
    }

    pub(crate) fn cycle_filter(&mut self) {
        self.status_filter = match self.status_filter {
            None => BookingStatus::ALL.first().copied(),
            Some(current) => BookingStatus::ALL
                .iter()
                .skip_while(|status| **status != current)
                .nth(1)
                .copied(),
        };
        self.list_index = 0;
    }

    pub(crate) fn open_current_booking(&mut self) {
        let id = self
            .visible_bookings()
            .get(self.list_index)
            .map(|booking| booking.id());
        if let Some(id) = id {
            self.selected = Some(id);
            self.screen = Screen::BookingDetail;
        }
    }

    pub(crate) fn start_new_booking(&mut self) {
        self.form = CreateForm::default();
        self.focus = FormField::CustomerName;
        self.resolver.reset();
        self.screen = Screen::CreateBooking;
    }

    pub(crate) fn cancel_new_booking(&mut self) {
        self.resolver.reset();
        self.screen = Screen::BookingList;
    }

    pub(crate) fn submit_new_booking(&mut self) {
        let (pickup, dropoff) = self.resolver.locations();
        let draft = NewBooking::transport(self.form.customer_name.trim(), self.form.title.trim())
            .with_description(self.form.description.clone())
            .with_locations(pickup, dropoff);
        match self.registry.create(draft) {
            Ok(booking) => {
                self.info_message = Some(format!("Created booking for {}", booking.customer_name()));
                self.error_message = None;
                self.list_index = self.registry.len().saturating_sub(1);
                self.status_filter = None;
                self.resolver.reset();
                self.screen = Screen::BookingList;
            }
            Err(err) => {
                self.error_message = Some(err.to_string());
            }
        }
    }

    pub(crate) fn quote_selected(&mut self) {
        let Some(id) = self.selected else { return };
        match self.registry.request_quote(id) {
            Ok(cost) => self.info_message = Some(format!("Quoted ${cost:.2}")),
            Err(err) => self.error_message = Some(err.to_string()),
        }
    }

    pub(crate) fn confirm_selected(&mut self) {
        let Some(id) = self.selected else { return };
        if let Err(err) = self.registry.confirm_quote(id) {
            self.error_message = Some(err.to_string());
        }
    }

    /// Move the selected booking one step forward; finishing a job asks for notes first.
    pub(crate) fn advance_selected(&mut self) {
        let Some(booking) = self.selected_booking() else {
            return;
        };
        let (id, status) = (booking.id(), booking.status());
        match status {
            BookingStatus::InProgress => {
                self.notes_input.clear();
                self.screen = Screen::CompletionNotes;
            }
            BookingStatus::Pending | BookingStatus::Confirmed => {
                let next = if status == BookingStatus::Pending {
                    BookingStatus::Confirmed
                } else {
                    BookingStatus::InProgress
                };
                if let Err(err) = self.registry.try_set_status(id, next) {
                    self.error_message = Some(err.to_string());
                }
            }
            BookingStatus::Completed | BookingStatus::Cancelled => {
                self.error_message = Some(format!("Booking is already {status}"));
            }
        }
    }

    pub(crate) fn cancel_selected(&mut self) {
        let Some(id) = self.selected else { return };
        if let Err(err) = self.registry.try_set_status(id, BookingStatus::Cancelled) {
            self.error_message = Some(err.to_string());
        }
    }

    pub(crate) fn complete_selected(&mut self) {
        let Some(id) = self.selected else { return };
        let notes = std::mem::take(&mut self.notes_input);
        match self.registry.complete(id, notes) {
            Ok(()) => {
                self.info_message = Some("Job completed".to_owned());
                self.screen = Screen::BookingDetail;
            }
            Err(err) => self.error_message = Some(err.to_string()),
        }
    }

    pub(crate) fn on_resolver_event(&mut self, event: &ResolverEvent) {
        match event {
            ResolverEvent::Updated { field, location, .. } => {
                self.info_message = Some(format!("Found {field}: {}", location.label));
            }
            ResolverEvent::Failed { field, text, .. } => {
                self.info_message = Some(format!("No match for {field} \"{text}\""));
            }
            ResolverEvent::Cleared { .. } | ResolverEvent::Stale { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bookingshq_core::{Config, CreationPolicy, MapRegion, Quotable};
    use bookingshq_geocoder_gazetteer::GazetteerGeocoder;

    use super::*;

    fn app() -> App {
        let resolver = AddressResolver::new(
            Arc::new(GazetteerGeocoder::builtin(Duration::ZERO)),
            Duration::from_millis(500),
            Config::default().map.default_region(),
        );
        App::new(
            BookingRegistry::with_sample_data(CreationPolicy::default()),
            resolver,
        )
    }

    #[test]
    fn focus_cycles_through_every_field() {
        let mut field = FormField::CustomerName;
        for expected in FormField::ORDER.iter().skip(1) {
            field = field.next();
            assert_eq!(field, *expected);
        }
        assert_eq!(field.next(), FormField::CustomerName);
        assert_eq!(FormField::CustomerName.previous(), FormField::Description);
    }

    #[test]
    fn advancing_walks_the_lifecycle_and_asks_for_notes() {
        let mut app = app();
        app.open_current_booking();
        app.advance_selected();
        app.advance_selected();
        assert_eq!(
            app.selected_booking().map(Bookable::status),
            Some(BookingStatus::InProgress)
        );

        app.advance_selected();
        assert_eq!(app.screen, Screen::CompletionNotes);
        app.notes_input = "All items delivered".to_owned();
        app.complete_selected();

        let booking = app.selected_booking().expect("still registered");
        assert_eq!(booking.status(), BookingStatus::Completed);
        assert_eq!(booking.completion_notes(), "All items delivered");
        assert_eq!(app.screen, Screen::BookingDetail);

        app.cancel_selected();
        assert!(app.error_message.is_some());
    }

    #[test]
    fn filter_cycles_through_statuses_then_back_to_all() {
        let mut app = app();
        let mut seen = Vec::new();
        for _ in 0..=BookingStatus::ALL.len() {
            app.cycle_filter();
            seen.push(app.status_filter);
        }
        assert_eq!(seen.first(), Some(&Some(BookingStatus::Pending)));
        assert_eq!(seen.last(), Some(&None));
        assert_eq!(app.visible_bookings().len(), 3);
    }

    #[test]
    fn submitting_a_blank_form_reports_the_field() {
        let mut app = app();
        app.start_new_booking();
        app.form.customer_name = "Riley".to_owned();
        app.submit_new_booking();
        assert_eq!(app.screen, Screen::CreateBooking);
        assert!(app.error_message.as_deref().is_some_and(|msg| msg.contains("title")));

        app.form.title = "Piano".to_owned();
        app.submit_new_booking();
        assert_eq!(app.screen, Screen::BookingList);
        assert_eq!(app.registry.len(), 4);
        let created = app.registry.all().last().expect("appended");
        assert_eq!(created.title(), "Piano");
        assert!(created.estimated_cost().abs() < f64::EPSILON);
        let default_region: MapRegion = Config::default().map.default_region();
        assert_eq!(app.resolver.region(), default_region);
    }
}
