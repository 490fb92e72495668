// Unfiltered table of every reservation
// Reloads on each navigation and whenever the acting customer changes; the customer is a
// refresh trigger only and never filters the rows

use super::LoadState;
use crate::api::{ApiError, TravelApi};
use crate::customer_store::CustomerStore;
use crate::lifetime::{ScopeHandle, ViewScope};
use crate::models::{CustomerId, Reservation, ReservationStatus};
use crate::routes::Location;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRow {
    pub id: String,
    pub customer_name: String,
    pub trip_name: String,
    pub booking_date: NaiveDate,
    pub number_of_people: u32,
    pub status: ReservationStatus,
}

impl From<&Reservation> for ReservationRow {
    fn from(reservation: &Reservation) -> Self {
        Self {
            id: reservation.id.clone(),
            customer_name: reservation
                .customer_name
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            trip_name: reservation
                .trip_name
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            booking_date: reservation.booking_date,
            number_of_people: reservation.number_of_people,
            status: reservation.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReservationsTableScreen {
    Loading,
    Failed { message: String },
    Rows(Vec<ReservationRow>),
}

pub struct ReservationsTableView {
    api: Arc<dyn TravelApi>,
    store: Arc<CustomerStore>,
    scope: ViewScope,
    last_trigger: Option<(u64, CustomerId)>,
    reservations: Vec<Reservation>,
    state: LoadState,
}

impl ReservationsTableView {
    pub fn new(api: Arc<dyn TravelApi>, store: Arc<CustomerStore>) -> Self {
        Self {
            api,
            store,
            scope: ViewScope::new(),
            last_trigger: None,
            reservations: Vec::new(),
            state: LoadState::Idle,
        }
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    /// Fetches the table when the navigation key or the acting customer differs from
    /// the last completed fetch. Returns whether a fetch was issued.
    pub async fn sync(&mut self, location: Location) -> bool {
        let trigger = (location.key, self.store.selected_id());
        if self.last_trigger == Some(trigger) {
            return false;
        }
        if self.load().await {
            self.last_trigger = Some(trigger);
        }
        true
    }

    // Returns false when the fetch was cancelled, so the same trigger fetches again
    async fn load(&mut self) -> bool {
        let ticket = self.scope.renew();
        self.state = LoadState::Loading;

        match ticket.run(self.api.list_reservations()).await {
            Ok(reservations) => {
                debug!(count = reservations.len(), "reservations loaded");
                self.reservations = reservations;
                self.state = LoadState::Loaded;
            }
            Err(ApiError::Cancelled) => {
                debug!("reservations fetch cancelled");
                return false;
            }
            Err(e) => {
                error!(error = %e, "failed to load reservations");
                self.state = LoadState::Failed(e.to_string());
            }
        }
        true
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn render(&self) -> ReservationsTableScreen {
        match &self.state {
            LoadState::Idle | LoadState::Loading => ReservationsTableScreen::Loading,
            LoadState::Failed(message) => ReservationsTableScreen::Failed {
                message: message.clone(),
            },
            LoadState::Loaded => ReservationsTableScreen::Rows(
                self.reservations.iter().map(ReservationRow::from).collect(),
            ),
        }
    }
}

impl fmt::Display for ReservationsTableScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "All Reservations")?;
        match self {
            ReservationsTableScreen::Loading => writeln!(f, "Loading..."),
            ReservationsTableScreen::Failed { message } => {
                writeln!(f, "Could not load reservations: {message}")
            }
            ReservationsTableScreen::Rows(rows) if rows.is_empty() => {
                writeln!(f, "No reservations found.")
            }
            ReservationsTableScreen::Rows(rows) => {
                writeln!(f, "Reservation # | Customer | Trip | Booked | People | Status")?;
                for row in rows {
                    writeln!(
                        f,
                        "{} | {} | {} | {} | {} | {}",
                        row.id,
                        row.customer_name,
                        row.trip_name,
                        row.booking_date,
                        row.number_of_people,
                        row.status
                    )?;
                }
                Ok(())
            }
        }
    }
}
