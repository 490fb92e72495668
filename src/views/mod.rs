// Screens of the booking client
// Each view fetches through the injected API, tracks its own load state and renders
// into a plain screen value

pub mod header;
pub mod my_bookings;
pub mod reservations_table;
pub mod trip_detail;
pub mod trip_list;

use crate::api::ApiError;
use thiserror::Error;

pub use header::{CustomerSelector, Header, NavLink};
pub use my_bookings::{
    BookingCard, CustomerCard, MyBookingsContent, MyBookingsScreen, MyBookingsView,
};
pub use reservations_table::{ReservationRow, ReservationsTableScreen, ReservationsTableView};
pub use trip_detail::{
    BookingPanel, TripDetailPage, TripDetailScreen, TripDetailView, TripReservationRow,
};
pub use trip_list::{TripCard, TripListScreen, TripListView};

/// Upper bound offered by the people selector regardless of capacity.
pub const MAX_PEOPLE_PER_BOOKING: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Idle | LoadState::Loading)
    }
}

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Invalid number of people: {requested} (allowed 1..={max})")]
    InvalidPeopleCount { requested: u32, max: u32 },

    #[error("Booking is not available for this trip")]
    BookingUnavailable,

    #[error("A booking is already in progress")]
    BookingInProgress,

    #[error("Reservation {0} cannot be cancelled")]
    NotCancellable(String),

    #[error("View has not loaded yet")]
    NotLoaded,

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub(crate) fn people_label(count: u32) -> &'static str {
    if count == 1 {
        "person"
    } else {
        "people"
    }
}

pub(crate) fn format_price(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("${amount:.0}")
    } else {
        format!("${amount:.2}")
    }
}
