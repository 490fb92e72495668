// Travel booking client library

pub mod api;
pub mod app;
pub mod config;
pub mod customer_store;
pub mod lifetime;
pub mod models;
pub mod routes;
pub mod views;

// Re-export key types for convenience
pub use api::{ApiError, HttpTravelApi, TravelApi};
pub use app::{App, Page, Screen};
pub use config::{ClientConfig, ClientError};
pub use customer_store::CustomerStore;
pub use lifetime::{FetchTicket, ScopeHandle, ViewScope};
pub use models::{
    BookingOutcome, CancelOutcome, CreateReservationRequest, Customer, CustomerId,
    DifficultyLevel, Reservation, ReservationStatus, Trip, TripDetails, TripId, TripType,
};
pub use routes::{Location, Navigator, Route};
pub use views::{
    LoadState, MyBookingsView, ReservationsTableView, TripDetailView, TripListView, ViewError,
};
