// Trip detail with the booking panel and the trip's reservation list

use super::{format_price, people_label, LoadState, ViewError, MAX_PEOPLE_PER_BOOKING};
use crate::api::{ApiError, TravelApi};
use crate::customer_store::CustomerStore;
use crate::lifetime::{FetchTicket, ScopeHandle, ViewScope};
use crate::models::{
    BookingOutcome, CreateReservationRequest, CustomerId, Reservation, ReservationStatus, Trip,
    TripDetails, TripId,
};
use crate::routes::Route;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

const BOOKING_FAILED: &str = "Booking failed";
const BOOKING_ERROR: &str = "Error creating reservation";

#[derive(Debug, Clone, PartialEq)]
pub struct BookingPanel {
    pub customer_name: Option<String>,
    pub people_options: Vec<u32>,
    pub people: u32,
    pub price_per_person: f64,
    pub total_price: f64,
    pub button_label: &'static str,
    pub button_disabled: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripReservationRow {
    pub id: String,
    pub customer_name: String,
    pub number_of_people: u32,
    pub status: ReservationStatus,
    pub booking_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripDetailPage {
    pub trip: Trip,
    pub details: TripDetails,
    pub panel: BookingPanel,
    pub reservations: Vec<TripReservationRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TripDetailScreen {
    Loading,
    Failed { message: String },
    NotFound { back: Route },
    Detail(Box<TripDetailPage>),
}

pub struct TripDetailView {
    api: Arc<dyn TravelApi>,
    store: Arc<CustomerStore>,
    selection: watch::Receiver<CustomerId>,
    scope: ViewScope,
    trip_id: Option<TripId>,
    trip: Option<Trip>,
    reservations: Vec<Reservation>,
    state: LoadState,
    people: u32,
    booking: bool,
    message: String,
}

impl TripDetailView {
    pub fn new(api: Arc<dyn TravelApi>, store: Arc<CustomerStore>) -> Self {
        let selection = store.subscribe();
        Self {
            api,
            store,
            selection,
            scope: ViewScope::new(),
            trip_id: None,
            trip: None,
            reservations: Vec::new(),
            state: LoadState::Idle,
            people: 1,
            booking: false,
            message: String::new(),
        }
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    /// Loads the trip and its reservations together. Opening another trip cancels
    /// whatever the previous one still had in flight.
    pub async fn open(&mut self, trip_id: TripId) {
        let ticket = self.scope.renew();
        self.trip_id = Some(trip_id);
        self.state = LoadState::Loading;

        let api = Arc::clone(&self.api);
        let fetch = async {
            futures::try_join!(api.get_trip(trip_id), api.list_trip_reservations(trip_id))
        };

        match ticket.run(fetch).await {
            Ok((trip, reservations)) => {
                debug!(trip_id, found = trip.is_some(), "trip loaded");
                self.apply_trip(trip);
                self.reservations = reservations;
                self.state = LoadState::Loaded;
            }
            Err(ApiError::Cancelled) => debug!(trip_id, "trip fetch cancelled"),
            Err(e) => {
                error!(trip_id, error = %e, "failed to load trip");
                self.apply_trip(None);
                self.reservations.clear();
                self.state = LoadState::Failed(e.to_string());
            }
        }
    }

    // Replaces the trip snapshot, resetting the selector whenever identity or capacity moved
    fn apply_trip(&mut self, next: Option<Trip>) {
        let previous = self.trip.as_ref().map(|t| (t.id, t.available_spots));
        let incoming = next.as_ref().map(|t| (t.id, t.available_spots));

        match (previous, incoming) {
            (None, Some(_)) => {
                self.people = 1;
                self.message.clear();
            }
            (Some((old_id, _)), Some((new_id, _))) if old_id != new_id => {
                self.people = 1;
                self.message.clear();
            }
            (Some((_, old_spots)), Some((_, new_spots))) if old_spots != new_spots => {
                self.people = 1;
            }
            _ => {}
        }
        self.trip = next;
    }

    /// Picks up a change of acting customer: the selector goes back to 1 and any
    /// booking message is cleared. Returns whether a change was seen.
    pub fn observe_selection(&mut self) -> bool {
        if !self.selection_pending() {
            return false;
        }
        let selected = *self.selection.borrow_and_update();
        debug!(customer_id = selected, "acting customer changed");
        self.people = 1;
        self.message.clear();
        true
    }

    // A change not yet observed already counts as a reset for anything rendered
    fn selection_pending(&self) -> bool {
        self.selection.has_changed().unwrap_or(false)
    }

    pub fn people_options(&self) -> Vec<u32> {
        match &self.trip {
            Some(trip) => (1..=trip.available_spots.min(MAX_PEOPLE_PER_BOOKING)).collect(),
            None => Vec::new(),
        }
    }

    pub fn select_people(&mut self, count: u32) -> Result<(), ViewError> {
        self.observe_selection();
        let max = self
            .trip
            .as_ref()
            .map(|t| t.available_spots.min(MAX_PEOPLE_PER_BOOKING))
            .ok_or(ViewError::NotLoaded)?;
        if count < 1 || count > max {
            return Err(ViewError::InvalidPeopleCount {
                requested: count,
                max,
            });
        }
        self.people = count;
        Ok(())
    }

    /// Books the current selection for the acting customer, then refreshes the trip
    /// and its reservations so the new availability shows up.
    pub async fn book(&mut self) -> Result<BookingOutcome, ViewError> {
        self.observe_selection();

        if self.booking {
            return Err(ViewError::BookingInProgress);
        }
        let trip = self.trip.as_ref().ok_or(ViewError::NotLoaded)?;
        if trip.is_sold_out() {
            return Err(ViewError::BookingUnavailable);
        }

        let trip_id = trip.id;
        let customer_id = self.store.selected_id();
        let customer_name = self
            .store
            .selected_customer()
            .map(|c| c.name)
            .unwrap_or_default();
        let request = CreateReservationRequest {
            customer_id,
            trip_id,
            number_of_people: self.people,
        };

        self.booking = true;
        self.message.clear();

        let ticket = self.scope.ticket();
        let result = ticket.run(self.api.create_reservation(request)).await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(ApiError::Cancelled) => {
                self.booking = false;
                return Err(ViewError::Api(ApiError::Cancelled));
            }
            Err(e) => {
                warn!(trip_id, customer_id, error = %e, "booking request failed");
                self.message = BOOKING_ERROR.to_string();
                self.booking = false;
                return Err(e.into());
            }
        };

        match &outcome {
            BookingOutcome::Booked {
                reservation_number, ..
            } => {
                info!(trip_id, customer_id, reservation_number = %reservation_number, "reservation created");
                self.message = format!("Booked for {customer_name}! Reservation: {reservation_number}");
                self.people = 1;
                self.reload_after_booking(&ticket, trip_id).await;
            }
            BookingOutcome::Rejected { error } => {
                info!(trip_id, customer_id, error = ?error, "reservation rejected");
                self.message = error.clone().unwrap_or_else(|| BOOKING_FAILED.to_string());
            }
        }

        self.booking = false;
        Ok(outcome)
    }

    async fn reload_after_booking(&mut self, ticket: &FetchTicket, trip_id: TripId) {
        let api = Arc::clone(&self.api);
        let (reservations, trip) = futures::join!(
            ticket.run(api.list_trip_reservations(trip_id)),
            ticket.run(api.get_trip(trip_id))
        );

        match reservations {
            Ok(reservations) => self.reservations = reservations,
            Err(e) if e.is_cancelled() => {}
            Err(e) => warn!(trip_id, error = %e, "failed to refresh reservations after booking"),
        }
        match trip {
            Ok(Some(trip)) => self.apply_trip(Some(trip)),
            // A vanished trip keeps the last snapshot
            Ok(None) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => warn!(trip_id, error = %e, "failed to refresh trip after booking"),
        }
    }

    pub fn trip(&self) -> Option<&Trip> {
        self.trip.as_ref()
    }

    pub fn trip_id(&self) -> Option<TripId> {
        self.trip_id
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn people(&self) -> u32 {
        if self.selection_pending() {
            1
        } else {
            self.people
        }
    }

    pub fn is_booking(&self) -> bool {
        self.booking
    }

    pub fn message(&self) -> &str {
        if self.selection_pending() {
            ""
        } else {
            &self.message
        }
    }

    pub fn booking_panel(&self) -> Option<BookingPanel> {
        let trip = self.trip.as_ref()?;
        let people = self.people();
        let message = self.message();
        Some(BookingPanel {
            customer_name: self.store.selected_customer().map(|c| c.name),
            people_options: self.people_options(),
            people,
            price_per_person: trip.final_price,
            total_price: trip.final_price * f64::from(people),
            button_label: if self.booking { "Booking..." } else { "Book Now" },
            button_disabled: self.booking || trip.is_sold_out(),
            message: (!message.is_empty()).then(|| message.to_string()),
        })
    }

    pub fn render(&self) -> TripDetailScreen {
        match &self.state {
            LoadState::Idle | LoadState::Loading => TripDetailScreen::Loading,
            LoadState::Failed(message) => TripDetailScreen::Failed {
                message: message.clone(),
            },
            LoadState::Loaded => match (&self.trip, self.booking_panel()) {
                (Some(trip), Some(panel)) => TripDetailScreen::Detail(Box::new(TripDetailPage {
                    trip: trip.clone(),
                    details: trip.details(),
                    panel,
                    reservations: self
                        .reservations
                        .iter()
                        .map(|r| TripReservationRow {
                            id: r.id.clone(),
                            customer_name: r
                                .customer_name
                                .clone()
                                .unwrap_or_else(|| "Unknown".to_string()),
                            number_of_people: r.number_of_people,
                            status: r.status,
                            booking_date: r.booking_date,
                        })
                        .collect(),
                })),
                _ => TripDetailScreen::NotFound {
                    back: Route::TripList,
                },
            },
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

impl fmt::Display for TripDetailScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = match self {
            TripDetailScreen::Loading => return writeln!(f, "Loading..."),
            TripDetailScreen::Failed { message } => {
                return writeln!(f, "Could not load trip: {message}")
            }
            TripDetailScreen::NotFound { back } => {
                return writeln!(f, "Trip Not Found\nReturn to Trips -> {back}")
            }
            TripDetailScreen::Detail(page) => page,
        };
        let trip = &page.trip;

        writeln!(f, "{} [{}]", trip.name, trip.trip_type)?;
        writeln!(f, "{}, {}", trip.destination, trip.country)?;
        writeln!(f, "{}", trip.description)?;
        writeln!(
            f,
            "Departure {} | Return {} | {} days",
            trip.departure_date, trip.return_date, trip.duration
        )?;
        writeln!(
            f,
            "Price {} | Max Participants {} | Available Spots {}",
            format_price(trip.final_price),
            trip.max_participants,
            trip.available_spots
        )?;

        match &page.details {
            TripDetails::Adventure {
                difficulty_level,
                equipment_included,
            } => {
                let level = difficulty_level
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "-".to_string());
                writeln!(
                    f,
                    "Difficulty Level {level} | Equipment Included {}",
                    yes_no(*equipment_included)
                )?;
            }
            TripDetails::Cultural {
                guided_tours,
                historical_sites,
            } => {
                writeln!(f, "Guided Tours {}", yes_no(*guided_tours))?;
                if !historical_sites.is_empty() {
                    writeln!(f, "Historical Sites: {}", historical_sites.join(", "))?;
                }
            }
            TripDetails::Vacation {
                resort_name,
                all_inclusive,
            } => {
                writeln!(
                    f,
                    "Resort {} | All Inclusive {}",
                    resort_name.as_deref().unwrap_or("-"),
                    yes_no(*all_inclusive)
                )?;
            }
        }

        let panel = &page.panel;
        writeln!(f)?;
        writeln!(f, "Book This Trip")?;
        writeln!(
            f,
            "Booking as: {}",
            panel.customer_name.as_deref().unwrap_or("-")
        )?;
        writeln!(
            f,
            "{} x {} {} = {}",
            format_price(panel.price_per_person),
            panel.people,
            people_label(panel.people),
            format_price(panel.total_price)
        )?;
        writeln!(
            f,
            "[{}]{}",
            panel.button_label,
            if panel.button_disabled { " (disabled)" } else { "" }
        )?;
        if let Some(message) = &panel.message {
            writeln!(f, "{message}")?;
        }

        writeln!(f)?;
        writeln!(f, "Reservations for this Trip")?;
        if page.reservations.is_empty() {
            return writeln!(f, "No reservations yet.");
        }
        for row in &page.reservations {
            writeln!(
                f,
                "  {} | {} | {} | {} | {}",
                row.id, row.customer_name, row.number_of_people, row.status, row.booking_date
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_server::{seeded, trip, MockServer};
    use crate::models::TripType;
    use test_case::test_case;

    async fn view_for(server: MockServer, trip_id: TripId) -> (TripDetailView, Arc<CustomerStore>) {
        let api: Arc<dyn TravelApi> = Arc::new(server);
        let store = Arc::new(CustomerStore::new(Arc::clone(&api), 1));
        store.initialize().await;
        let mut view = TripDetailView::new(api, Arc::clone(&store));
        view.open(trip_id).await;
        (view, store)
    }

    #[test_case(0, vec![]; "sold out offers nothing")]
    #[test_case(3, vec![1, 2, 3]; "capacity below cap")]
    #[test_case(10, (1..=10).collect(); "capacity at cap")]
    #[test_case(25, (1..=10).collect(); "capacity above cap")]
    #[tokio::test]
    async fn test_people_options_bounded_by_spots(spots: u32, expected: Vec<u32>) {
        let server = MockServer::new();
        let mut sample = trip(5, TripType::Adventure, 40);
        sample.available_spots = spots;
        server.add_trip(sample).await;

        let (view, _) = view_for(server, 5).await;

        assert_eq!(view.people_options(), expected);
        let max = spots.min(MAX_PEOPLE_PER_BOOKING);
        assert!(view.people_options().iter().all(|n| *n >= 1 && *n <= max));
    }

    #[tokio::test]
    async fn test_open_fetches_trip_and_reservations() {
        let (view, _) = view_for(seeded().await, 1).await;

        assert_eq!(view.state(), &LoadState::Loaded);
        assert_eq!(view.trip().unwrap().id, 1);
        assert!(view.reservations().is_empty());
        assert!(matches!(view.render(), TripDetailScreen::Detail(_)));
    }

    #[tokio::test]
    async fn test_missing_trip_renders_not_found() {
        let (view, _) = view_for(seeded().await, 99).await;

        assert_eq!(
            view.render(),
            TripDetailScreen::NotFound {
                back: Route::TripList
            }
        );
        assert!(view.people_options().is_empty());
    }

    #[tokio::test]
    async fn test_select_people_rejects_out_of_range() {
        let (mut view, _) = view_for(seeded().await, 2).await;

        assert!(view.select_people(3).is_ok());
        assert!(matches!(
            view.select_people(4),
            Err(ViewError::InvalidPeopleCount { requested: 4, max: 3 })
        ));
        assert!(view.select_people(0).is_err());
        assert_eq!(view.people(), 3);
    }

    #[tokio::test]
    async fn test_booking_reduces_spots_and_refreshes() {
        let (mut view, _) = view_for(seeded().await, 1).await;
        let before = view.trip().unwrap().available_spots;

        view.select_people(4).unwrap();
        let outcome = view.book().await.unwrap();

        let BookingOutcome::Booked {
            reservation_number, ..
        } = outcome
        else {
            panic!("Expected booking to succeed");
        };
        assert_eq!(view.trip().unwrap().available_spots, before - 4);
        assert_eq!(view.people(), 1);
        assert_eq!(view.reservations().len(), 1);
        assert_eq!(
            view.message(),
            format!("Booked for Ana Silva! Reservation: {reservation_number}")
        );
        assert!(!view.is_booking());
    }

    #[tokio::test]
    async fn test_booking_all_remaining_spots_disables_booking() {
        // Trip 2 has exactly three spots
        let (mut view, _) = view_for(seeded().await, 2).await;

        view.select_people(3).unwrap();
        assert!(matches!(
            view.book().await.unwrap(),
            BookingOutcome::Booked { .. }
        ));

        assert_eq!(view.trip().unwrap().available_spots, 0);
        let panel = view.booking_panel().unwrap();
        assert!(panel.button_disabled);
        assert!(panel.people_options.is_empty());
        assert!(matches!(
            view.book().await,
            Err(ViewError::BookingUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_rejected_booking_shows_server_error() {
        let server = seeded().await;
        // Booking for a customer the backend does not know
        let (mut view, store) = view_for(server, 1).await;
        store.set_selected_id(77);

        let outcome = view.book().await.unwrap();

        assert!(matches!(outcome, BookingOutcome::Rejected { .. }));
        assert_eq!(view.message(), "Customer or Trip not found");
        assert_eq!(view.trip().unwrap().available_spots, 12);
    }

    #[tokio::test]
    async fn test_transport_failure_shows_generic_message() {
        let api = Arc::new(seeded().await);
        let store = Arc::new(CustomerStore::new(api.clone(), 1));
        store.initialize().await;
        let mut view = TripDetailView::new(api.clone(), store);
        view.open(1).await;

        api.fail_next_requests(1);
        let result = view.book().await;

        assert!(matches!(result, Err(ViewError::Api(_))));
        assert_eq!(view.message(), BOOKING_ERROR);
        assert!(!view.is_booking());
    }

    #[tokio::test]
    async fn test_customer_change_resets_selector_and_message() {
        let (mut view, store) = view_for(seeded().await, 1).await;
        view.select_people(2).unwrap();
        view.book().await.unwrap();
        view.select_people(5).unwrap();
        assert!(!view.message().is_empty());

        store.set_selected_id(2);
        assert!(view.observe_selection());

        assert_eq!(view.people(), 1);
        assert!(view.message().is_empty());
        assert!(!view.observe_selection());
    }

    #[tokio::test]
    async fn test_selection_after_customer_change_is_booked() {
        let (mut view, store) = view_for(seeded().await, 1).await;
        view.select_people(2).unwrap();
        view.book().await.unwrap();

        store.set_selected_id(2);
        let panel = view.booking_panel().unwrap();
        assert_eq!(panel.people, 1);
        assert_eq!(panel.message, None);

        view.select_people(5).unwrap();
        assert_eq!(view.booking_panel().unwrap().people, 5);

        let outcome = view.book().await.unwrap();
        assert!(matches!(outcome, BookingOutcome::Booked { .. }));
        let latest = &view.reservations()[0];
        assert_eq!(latest.number_of_people, 5);
        assert_eq!(latest.customer_name.as_deref(), Some("Ben Okafor"));
        assert_eq!(view.trip().unwrap().available_spots, 12 - 2 - 5);
    }

    #[tokio::test]
    async fn test_capacity_change_resets_selector_and_keeps_message() {
        let api = Arc::new(seeded().await);
        let store = Arc::new(CustomerStore::new(api.clone(), 1));
        store.initialize().await;
        let mut view = TripDetailView::new(api.clone(), store);
        view.open(1).await;
        view.select_people(2).unwrap();
        view.book().await.unwrap();
        let message = view.message().to_string();
        view.select_people(4).unwrap();

        // Someone else books the same trip in the meantime
        api.create_reservation(CreateReservationRequest {
            customer_id: 2,
            trip_id: 1,
            number_of_people: 3,
        })
        .await
        .unwrap();
        view.open(1).await;

        assert_eq!(view.trip().unwrap().available_spots, 12 - 2 - 3);
        assert_eq!(view.people(), 1);
        assert_eq!(view.message(), message);
    }

    #[tokio::test]
    async fn test_opening_another_trip_resets_selector() {
        let (mut view, _) = view_for(seeded().await, 1).await;
        view.select_people(6).unwrap();

        view.open(3).await;

        assert_eq!(view.trip_id(), Some(3));
        assert_eq!(view.people(), 1);
    }

    #[tokio::test]
    async fn test_panel_totals_follow_selection() {
        let (mut view, _) = view_for(seeded().await, 3).await;
        view.select_people(3).unwrap();

        let panel = view.booking_panel().unwrap();
        assert_eq!(panel.customer_name.as_deref(), Some("Ana Silva"));
        assert_eq!(panel.price_per_person, 120.0);
        assert_eq!(panel.total_price, 360.0);
        assert_eq!(panel.button_label, "Book Now");
        assert!(!panel.button_disabled);
        assert_eq!(panel.message, None);
    }
}
