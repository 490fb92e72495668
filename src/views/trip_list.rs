// Trip listing, fetched once per mount

use super::{format_price, LoadState};
use crate::api::{ApiError, TravelApi};
use crate::lifetime::{ScopeHandle, ViewScope};
use crate::models::{Trip, TripId, TripType};
use crate::routes::Route;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq)]
pub struct TripCard {
    pub trip_id: TripId,
    pub name: String,
    pub trip_type: TripType,
    pub final_price: f64,
    pub destination: String,
    pub country: String,
    pub duration: u32,
    pub available_spots: u32,
    pub link: Route,
}

impl From<&Trip> for TripCard {
    fn from(trip: &Trip) -> Self {
        Self {
            trip_id: trip.id,
            name: trip.name.clone(),
            trip_type: trip.trip_type,
            final_price: trip.final_price,
            destination: trip.destination.clone(),
            country: trip.country.clone(),
            duration: trip.duration,
            available_spots: trip.available_spots,
            link: Route::TripDetail(trip.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TripListScreen {
    Loading,
    Failed { message: String },
    Trips(Vec<TripCard>),
}

pub struct TripListView {
    api: Arc<dyn TravelApi>,
    scope: ViewScope,
    trips: Vec<Trip>,
    state: LoadState,
}

impl TripListView {
    pub fn new(api: Arc<dyn TravelApi>) -> Self {
        Self {
            api,
            scope: ViewScope::new(),
            trips: Vec::new(),
            state: LoadState::Idle,
        }
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub async fn mount(&mut self) {
        let ticket = self.scope.renew();
        self.state = LoadState::Loading;

        match ticket.run(self.api.list_trips()).await {
            Ok(trips) => {
                debug!(count = trips.len(), "trips loaded");
                self.trips = trips;
                self.state = LoadState::Loaded;
            }
            Err(ApiError::Cancelled) => debug!("trip list fetch cancelled"),
            Err(e) => {
                error!(error = %e, "failed to load trips");
                self.state = LoadState::Failed(e.to_string());
            }
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn render(&self) -> TripListScreen {
        match &self.state {
            LoadState::Idle | LoadState::Loading => TripListScreen::Loading,
            LoadState::Failed(message) => TripListScreen::Failed {
                message: message.clone(),
            },
            LoadState::Loaded => {
                TripListScreen::Trips(self.trips.iter().map(TripCard::from).collect())
            }
        }
    }
}

impl fmt::Display for TripListScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripListScreen::Loading => writeln!(f, "Loading trips..."),
            TripListScreen::Failed { message } => writeln!(f, "Could not load trips: {message}"),
            TripListScreen::Trips(cards) => {
                writeln!(f, "Available Trips")?;
                for card in cards {
                    writeln!(
                        f,
                        "  [{}] {} ({}) {}, {} | {} days | {} spots | Select a trip -> {}",
                        card.trip_type,
                        card.name,
                        format_price(card.final_price),
                        card.destination,
                        card.country,
                        card.duration,
                        card.available_spots,
                        card.link
                    )?;
                }
                Ok(())
            }
        }
    }
}
