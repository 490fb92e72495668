// Application shell: wires the API client, the shared customer store and navigation,
// and opens the screen for a route

use crate::api::{ApiError, HttpTravelApi, TravelApi};
use crate::config::{ClientConfig, ClientError};
use crate::customer_store::CustomerStore;
use crate::models::{BookingOutcome, CancelOutcome, CustomerId, TripId};
use crate::routes::{Location, Navigator, Route};
use crate::views::{
    Header, LoadState, MyBookingsScreen, MyBookingsView, ReservationsTableScreen,
    ReservationsTableView, TripDetailScreen, TripDetailView, TripListScreen, TripListView,
    ViewError,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info_span, Instrument};

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    TripList(TripListScreen),
    TripDetail(TripDetailScreen),
    MyBookings(MyBookingsScreen),
    ReservationsTable(ReservationsTableScreen),
    NotFound { path: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub location: Location,
    pub header: Header,
    pub screen: Screen,
}

pub struct App {
    api: Arc<dyn TravelApi>,
    store: Arc<CustomerStore>,
    navigator: Navigator,
}

impl App {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let initial_customer = config.default_customer_id;
        let api = Arc::new(HttpTravelApi::new(config)?);
        Ok(Self::with_api(api, initial_customer))
    }

    pub fn with_api(api: Arc<dyn TravelApi>, initial_customer: CustomerId) -> Self {
        let store = Arc::new(CustomerStore::new(Arc::clone(&api), initial_customer));
        Self {
            api,
            store,
            navigator: Navigator::default(),
        }
    }

    /// Loads the customer list behind the selector. Failures leave it empty.
    pub async fn start(&self) {
        self.store
            .initialize()
            .instrument(info_span!("customers"))
            .await;
    }

    pub fn store(&self) -> &Arc<CustomerStore> {
        &self.store
    }

    pub fn select_customer(&self, customer_id: CustomerId) {
        self.store.set_selected_id(customer_id);
    }

    pub async fn open(&mut self, path: &str) -> Page {
        let location = self.navigator.navigate_to(path);
        debug!(path, route = %location.route, key = location.key, "navigate");

        let screen = match location.route {
            Route::TripList => {
                let mut view = TripListView::new(Arc::clone(&self.api));
                view.mount().instrument(info_span!("trip_list")).await;
                Screen::TripList(view.render())
            }
            Route::TripDetail(trip_id) => {
                let mut view = self.trip_detail_view();
                view.open(trip_id)
                    .instrument(info_span!("trip_detail", trip_id))
                    .await;
                Screen::TripDetail(view.render())
            }
            Route::MyBookings => {
                let mut view = self.my_bookings_view();
                view.mount().instrument(info_span!("my_bookings")).await;
                Screen::MyBookings(view.render())
            }
            Route::ReservationsTable => {
                let mut view =
                    ReservationsTableView::new(Arc::clone(&self.api), Arc::clone(&self.store));
                view.sync(location)
                    .instrument(info_span!("reservations_table"))
                    .await;
                Screen::ReservationsTable(view.render())
            }
            Route::NotFound => Screen::NotFound {
                path: path.to_string(),
            },
        };

        self.page(location, screen)
    }

    /// Opens the trip, selects `people` and books it for the acting customer.
    pub async fn book(
        &mut self,
        trip_id: TripId,
        people: u32,
    ) -> Result<(BookingOutcome, Page), ViewError> {
        let location = self.navigator.navigate(Route::TripDetail(trip_id));
        let mut view = self.trip_detail_view();

        let span = info_span!("book", trip_id, people);
        let result = async {
            view.open(trip_id).await;
            if let LoadState::Failed(message) = view.state() {
                return Err(ViewError::Api(ApiError::Other(message.clone())));
            }
            view.select_people(people)?;
            view.book().await
        }
        .instrument(span)
        .await;

        let outcome = result?;
        let page = self.page(location, Screen::TripDetail(view.render()));
        Ok((outcome, page))
    }

    /// Cancels one of the acting customer's pending reservations.
    pub async fn cancel(
        &mut self,
        reservation_id: &str,
    ) -> Result<(CancelOutcome, Page), ViewError> {
        let location = self.navigator.navigate(Route::MyBookings);
        let mut view = self.my_bookings_view();

        let span = info_span!("cancel", reservation_id);
        let result = async {
            view.mount().await;
            if let LoadState::Failed(message) = view.state() {
                return Err(ViewError::Api(ApiError::Other(message.clone())));
            }
            view.cancel(reservation_id).await
        }
        .instrument(span)
        .await;

        let outcome = result?;
        let page = self.page(location, Screen::MyBookings(view.render()));
        Ok((outcome, page))
    }

    fn trip_detail_view(&self) -> TripDetailView {
        TripDetailView::new(Arc::clone(&self.api), Arc::clone(&self.store))
    }

    fn my_bookings_view(&self) -> MyBookingsView {
        MyBookingsView::new(Arc::clone(&self.api), Arc::clone(&self.store))
    }

    fn page(&self, location: Location, screen: Screen) -> Page {
        Page {
            location,
            header: Header::build(&self.store, &self.navigator),
            screen,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)?;
        writeln!(f)?;
        match &self.screen {
            Screen::TripList(screen) => write!(f, "{screen}"),
            Screen::TripDetail(screen) => write!(f, "{screen}"),
            Screen::MyBookings(screen) => write!(f, "{screen}"),
            Screen::ReservationsTable(screen) => write!(f, "{screen}"),
            Screen::NotFound { path } => writeln!(f, "Page not found: {path}"),
        }
    }
}
