// Reservations of the acting customer, with cancellation of pending ones

use super::{format_price, people_label, LoadState, ViewError};
use crate::api::{ApiError, TravelApi};
use crate::customer_store::CustomerStore;
use crate::lifetime::{ScopeHandle, ViewScope};
use crate::models::{CancelOutcome, Customer, CustomerId, Reservation, ReservationStatus};
use crate::routes::Route;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerCard {
    pub initial: char,
    pub name: String,
    pub email: String,
    pub member_since: NaiveDate,
    pub total_reservations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingCard {
    pub id: String,
    pub trip_name: String,
    pub status: ReservationStatus,
    pub destination: String,
    pub number_of_people: u32,
    pub booking_date: NaiveDate,
    pub total_price: f64,
    pub trip_link: Option<Route>,
    pub can_cancel: bool,
}

impl From<&Reservation> for BookingCard {
    fn from(reservation: &Reservation) -> Self {
        let place = [reservation.destination.as_deref(), reservation.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: reservation.id.clone(),
            trip_name: reservation
                .trip_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            status: reservation.status,
            destination: place,
            number_of_people: reservation.number_of_people,
            booking_date: reservation.booking_date,
            total_price: reservation.total_price,
            trip_link: reservation.trip_id.map(Route::TripDetail),
            can_cancel: reservation.status.is_cancellable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MyBookingsContent {
    Reservations(Vec<BookingCard>),
    Empty { call_to_action: Route },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MyBookingsScreen {
    Loading,
    Failed {
        message: String,
    },
    Loaded {
        customer: Option<CustomerCard>,
        content: MyBookingsContent,
        notice: Option<String>,
    },
}

pub struct MyBookingsView {
    api: Arc<dyn TravelApi>,
    store: Arc<CustomerStore>,
    selection: watch::Receiver<CustomerId>,
    scope: ViewScope,
    loaded_for: Option<CustomerId>,
    customer: Option<Customer>,
    reservations: Vec<Reservation>,
    state: LoadState,
    notice: Option<String>,
}

impl MyBookingsView {
    pub fn new(api: Arc<dyn TravelApi>, store: Arc<CustomerStore>) -> Self {
        let selection = store.subscribe();
        Self {
            api,
            store,
            selection,
            scope: ViewScope::new(),
            loaded_for: None,
            customer: None,
            reservations: Vec::new(),
            state: LoadState::Idle,
            notice: None,
        }
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    /// Loads the acting customer and their reservations together.
    pub async fn mount(&mut self) {
        self.selection.borrow_and_update();
        let customer_id = self.store.selected_id();
        let ticket = self.scope.renew();
        self.state = LoadState::Loading;
        self.notice = None;

        let api = Arc::clone(&self.api);
        let fetch = async {
            futures::try_join!(
                api.get_customer(customer_id),
                api.list_customer_reservations(customer_id)
            )
        };

        match ticket.run(fetch).await {
            Ok((customer, reservations)) => {
                debug!(customer_id, count = reservations.len(), "customer reservations loaded");
                self.customer = customer;
                self.reservations = reservations;
                self.loaded_for = Some(customer_id);
                self.state = LoadState::Loaded;
            }
            Err(ApiError::Cancelled) => debug!(customer_id, "customer reservations fetch cancelled"),
            Err(e) => {
                error!(customer_id, error = %e, "failed to load customer reservations");
                self.customer = None;
                self.reservations.clear();
                self.loaded_for = None;
                self.state = LoadState::Failed(e.to_string());
            }
        }
    }

    /// Re-mounts when the acting customer changed since the last load. Returns whether it did.
    pub async fn refresh(&mut self) -> bool {
        let changed = self.selection.has_changed().unwrap_or(false);
        if !changed && self.loaded_for == Some(self.store.selected_id()) {
            return false;
        }
        self.mount().await;
        true
    }

    pub async fn cancel(&mut self, reservation_id: &str) -> Result<CancelOutcome, ViewError> {
        let cancellable = self
            .reservations
            .iter()
            .any(|r| r.id == reservation_id && r.status.is_cancellable());
        if !cancellable {
            return Err(ViewError::NotCancellable(reservation_id.to_string()));
        }
        let customer_id = self.loaded_for.ok_or(ViewError::NotLoaded)?;

        let ticket = self.scope.ticket();
        let outcome = ticket
            .run(self.api.cancel_reservation(reservation_id))
            .await?;

        match &outcome {
            CancelOutcome::Cancelled { status } => {
                info!(reservation_id, %status, "reservation cancelled");
                self.notice = None;
                match ticket
                    .run(self.api.list_customer_reservations(customer_id))
                    .await
                {
                    Ok(reservations) => self.reservations = reservations,
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => warn!(customer_id, error = %e, "failed to refresh after cancel"),
                }
            }
            CancelOutcome::Rejected { error } => {
                warn!(reservation_id, error = ?error, "cancellation rejected");
                self.notice = error.clone();
            }
        }
        Ok(outcome)
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn render(&self) -> MyBookingsScreen {
        match &self.state {
            LoadState::Idle | LoadState::Loading => MyBookingsScreen::Loading,
            LoadState::Failed(message) => MyBookingsScreen::Failed {
                message: message.clone(),
            },
            LoadState::Loaded => {
                let customer = self.customer.as_ref().map(|c| CustomerCard {
                    initial: c.name.chars().next().unwrap_or('?'),
                    name: c.name.clone(),
                    email: c.email.clone(),
                    member_since: c.registration_date,
                    total_reservations: self.reservations.len(),
                });
                let content = if self.reservations.is_empty() {
                    MyBookingsContent::Empty {
                        call_to_action: Route::TripList,
                    }
                } else {
                    MyBookingsContent::Reservations(
                        self.reservations.iter().map(BookingCard::from).collect(),
                    )
                };
                MyBookingsScreen::Loaded {
                    customer,
                    content,
                    notice: self.notice.clone(),
                }
            }
        }
    }
}

impl fmt::Display for MyBookingsScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (customer, content, notice) = match self {
            MyBookingsScreen::Loading => return writeln!(f, "Loading..."),
            MyBookingsScreen::Failed { message } => {
                return writeln!(f, "Could not load reservations: {message}")
            }
            MyBookingsScreen::Loaded {
                customer,
                content,
                notice,
            } => (customer, content, notice),
        };

        writeln!(f, "My Reservations")?;
        if let Some(card) = customer {
            writeln!(
                f,
                "({}) {} <{}> | Member since {} | {} Total Reservations",
                card.initial, card.name, card.email, card.member_since, card.total_reservations
            )?;
        }
        if let Some(notice) = notice {
            writeln!(f, "{notice}")?;
        }

        match content {
            MyBookingsContent::Empty { call_to_action } => {
                writeln!(f, "No Reservations Yet")?;
                writeln!(f, "Start exploring our amazing trips!")?;
                writeln!(f, "Browse Trips -> {call_to_action}")
            }
            MyBookingsContent::Reservations(cards) => {
                for card in cards {
                    writeln!(
                        f,
                        "  {} [{}] {} | {} {} | Booked {} | {} | {}",
                        card.trip_name,
                        card.status,
                        card.destination,
                        card.number_of_people,
                        people_label(card.number_of_people),
                        card.booking_date,
                        format_price(card.total_price),
                        card.id
                    )?;
                    if let Some(link) = card.trip_link {
                        writeln!(f, "    Trip Details -> {link}")?;
                    }
                    if card.can_cancel {
                        writeln!(f, "    Cancel Reservation")?;
                    }
                }
                Ok(())
            }
        }
    }
}
