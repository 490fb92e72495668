// Travel agency API client
// Thin typed wrapper over the REST endpoints consumed by every view

use crate::config::{ClientConfig, ClientError};
use crate::models::{
    ActionResponse, BookingOutcome, CancelOutcome, CreateReservationRequest, Customer, CustomerId,
    Reservation, Trip, TripId,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError { status_code: u16, message: String },

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Other error: {0}")]
    Other(String),
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

#[async_trait]
pub trait TravelApi: Send + Sync + 'static {
    async fn list_trips(&self) -> Result<Vec<Trip>, ApiError>;

    // None when the trip does not exist
    async fn get_trip(&self, trip_id: TripId) -> Result<Option<Trip>, ApiError>;

    async fn list_reservations(&self) -> Result<Vec<Reservation>, ApiError>;

    async fn list_trip_reservations(&self, trip_id: TripId) -> Result<Vec<Reservation>, ApiError>;

    async fn list_customer_reservations(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Reservation>, ApiError>;

    async fn list_customers(&self) -> Result<Vec<Customer>, ApiError>;

    async fn get_customer(&self, customer_id: CustomerId) -> Result<Option<Customer>, ApiError>;

    // Business-rule rejections come back as Ok(BookingOutcome::Rejected)
    async fn create_reservation(
        &self,
        request: CreateReservationRequest,
    ) -> Result<BookingOutcome, ApiError>;

    async fn cancel_reservation(&self, reservation_id: &str) -> Result<CancelOutcome, ApiError>;
}

pub struct HttpTravelApi {
    config: ClientConfig,
    http: Client,
}

impl HttpTravelApi {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<String, ApiError> {
        let started = Instant::now();
        let response = request.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_transport(e))?;

        debug!(
            path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "api response"
        );

        if status.is_success() {
            Ok(body)
        } else if status == StatusCode::NOT_FOUND {
            Err(ApiError::ApiResponseError {
                status_code: status.as_u16(),
                message: "Not found".to_string(),
            })
        } else {
            warn!(path, status = status.as_u16(), "api request failed");
            Err(ApiError::ApiResponseError {
                status_code: status.as_u16(),
                message: body,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.config.endpoint(path);
        let body = self.send(self.http.get(url), path).await?;
        decode(&body)
    }

    // Lookups answer a missing record with an empty (or null) body, some deployments with 404
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        let url = self.config.endpoint(path);
        match self.send(self.http.get(url), path).await {
            Ok(body) => decode_optional(&body),
            Err(ApiError::ApiResponseError {
                status_code: 404, ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn map_transport(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.config.timeout_ms)
        } else if error.is_decode() {
            ApiError::DecodeError(error.to_string())
        } else {
            ApiError::NetworkError(error.to_string())
        }
    }
}

#[async_trait]
impl TravelApi for HttpTravelApi {
    async fn list_trips(&self) -> Result<Vec<Trip>, ApiError> {
        self.get_json("trips").await
    }

    async fn get_trip(&self, trip_id: TripId) -> Result<Option<Trip>, ApiError> {
        self.get_optional(&format!("trips/{trip_id}")).await
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        self.get_json("reservations").await
    }

    async fn list_trip_reservations(&self, trip_id: TripId) -> Result<Vec<Reservation>, ApiError> {
        self.get_json(&format!("trips/{trip_id}/reservations"))
            .await
    }

    async fn list_customer_reservations(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Reservation>, ApiError> {
        self.get_json(&format!("customers/{customer_id}/reservations"))
            .await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        self.get_json("customers").await
    }

    async fn get_customer(&self, customer_id: CustomerId) -> Result<Option<Customer>, ApiError> {
        self.get_optional(&format!("customers/{customer_id}"))
            .await
    }

    async fn create_reservation(
        &self,
        request: CreateReservationRequest,
    ) -> Result<BookingOutcome, ApiError> {
        let path = "reservations";
        let builder = self.http.post(self.config.endpoint(path)).json(&request);
        let body = self.send(builder, path).await?;
        let response: ActionResponse = decode(&body)?;
        Ok(response.into())
    }

    async fn cancel_reservation(&self, reservation_id: &str) -> Result<CancelOutcome, ApiError> {
        let path = format!("reservations/{reservation_id}/cancel");
        let builder = self.http.post(self.config.endpoint(&path));
        let body = self.send(builder, &path).await?;
        let response: ActionResponse = decode(&body)?;
        Ok(response.into())
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DecodeError(e.to_string()))
}

pub(crate) fn decode_optional<T: DeserializeOwned>(body: &str) -> Result<Option<T>, ApiError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    decode(trimmed).map(Some)
}

// In-memory stand-in for the backend, applying the same booking rules
#[cfg(test)]
pub mod mock_server {
    use super::*;
    use crate::models::{ReservationStatus, TripType};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;

    struct StoredReservation {
        reservation: Reservation,
        customer_id: CustomerId,
    }

    #[derive(Default)]
    struct State {
        trips: Vec<Trip>,
        customers: Vec<Customer>,
        // Newest last; listings return newest first like the backend
        reservations: Vec<StoredReservation>,
    }

    pub struct MockServer {
        state: Mutex<State>,
        request_count: AtomicUsize,
        fail_next_requests: AtomicUsize,
        delay_ms: AtomicUsize,
    }

    impl Default for MockServer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockServer {
        pub fn new() -> Self {
            Self {
                state: Mutex::new(State::default()),
                request_count: AtomicUsize::new(0),
                fail_next_requests: AtomicUsize::new(0),
                delay_ms: AtomicUsize::new(0),
            }
        }

        pub fn set_delay(&self, delay_ms: usize) {
            self.delay_ms.store(delay_ms, Ordering::SeqCst);
        }

        pub fn fail_next_requests(&self, count: usize) {
            self.fail_next_requests.store(count, Ordering::SeqCst);
        }

        pub fn request_count(&self) -> usize {
            self.request_count.load(Ordering::SeqCst)
        }

        pub async fn add_trip(&self, trip: Trip) {
            self.state.lock().await.trips.push(trip);
        }

        pub async fn add_customer(&self, customer: Customer) {
            self.state.lock().await.customers.push(customer);
        }

        pub async fn set_status(&self, reservation_id: &str, status: ReservationStatus) {
            let mut state = self.state.lock().await;
            if let Some(stored) = state
                .reservations
                .iter_mut()
                .find(|r| r.reservation.id == reservation_id)
            {
                stored.reservation.status = status;
            }
            refresh_spots(&mut state);
        }

        // Counts the request, applies the configured delay and failure injection
        async fn enter(&self) -> Result<(), ApiError> {
            self.request_count.fetch_add(1, Ordering::SeqCst);

            let delay = self.delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay as u64)).await;
            }

            let fail_count = self.fail_next_requests.load(Ordering::SeqCst);
            if fail_count > 0 {
                self.fail_next_requests
                    .store(fail_count - 1, Ordering::SeqCst);
                return Err(ApiError::ApiResponseError {
                    status_code: 500,
                    message: "Internal Server Error".to_string(),
                });
            }
            Ok(())
        }
    }

    fn refresh_spots(state: &mut State) {
        let mut booked: HashMap<TripId, u32> = HashMap::new();
        for stored in &state.reservations {
            if stored.reservation.status != ReservationStatus::Cancelled {
                if let Some(trip_id) = stored.reservation.trip_id {
                    *booked.entry(trip_id).or_default() += stored.reservation.number_of_people;
                }
            }
        }
        for trip in &mut state.trips {
            let taken = booked.get(&trip.id).copied().unwrap_or(0);
            trip.available_spots = trip.max_participants.saturating_sub(taken);
        }
    }

    fn newest_first<'a>(
        reservations: impl DoubleEndedIterator<Item = &'a StoredReservation>,
    ) -> Vec<Reservation> {
        reservations.rev().map(|r| r.reservation.clone()).collect()
    }

    #[async_trait]
    impl TravelApi for MockServer {
        async fn list_trips(&self) -> Result<Vec<Trip>, ApiError> {
            self.enter().await?;
            Ok(self.state.lock().await.trips.clone())
        }

        async fn get_trip(&self, trip_id: TripId) -> Result<Option<Trip>, ApiError> {
            self.enter().await?;
            let state = self.state.lock().await;
            Ok(state.trips.iter().find(|t| t.id == trip_id).cloned())
        }

        async fn list_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
            self.enter().await?;
            let state = self.state.lock().await;
            Ok(newest_first(state.reservations.iter()))
        }

        async fn list_trip_reservations(
            &self,
            trip_id: TripId,
        ) -> Result<Vec<Reservation>, ApiError> {
            self.enter().await?;
            let state = self.state.lock().await;
            Ok(newest_first(
                state
                    .reservations
                    .iter()
                    .filter(|r| r.reservation.trip_id == Some(trip_id)),
            ))
        }

        async fn list_customer_reservations(
            &self,
            customer_id: CustomerId,
        ) -> Result<Vec<Reservation>, ApiError> {
            self.enter().await?;
            let state = self.state.lock().await;
            Ok(newest_first(
                state
                    .reservations
                    .iter()
                    .filter(|r| r.customer_id == customer_id),
            ))
        }

        async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
            self.enter().await?;
            Ok(self.state.lock().await.customers.clone())
        }

        async fn get_customer(
            &self,
            customer_id: CustomerId,
        ) -> Result<Option<Customer>, ApiError> {
            self.enter().await?;
            let state = self.state.lock().await;
            Ok(state.customers.iter().find(|c| c.id == customer_id).cloned())
        }

        async fn create_reservation(
            &self,
            request: CreateReservationRequest,
        ) -> Result<BookingOutcome, ApiError> {
            self.enter().await?;
            let mut state = self.state.lock().await;

            let customer = state
                .customers
                .iter()
                .find(|c| c.id == request.customer_id)
                .cloned();
            let trip = state
                .trips
                .iter()
                .find(|t| t.id == request.trip_id)
                .cloned();
            let (customer, trip) = match (customer, trip) {
                (Some(customer), Some(trip)) => (customer, trip),
                _ => {
                    return Ok(BookingOutcome::Rejected {
                        error: Some("Customer or Trip not found".to_string()),
                    })
                }
            };
            if request.number_of_people < 1 {
                return Ok(BookingOutcome::Rejected {
                    error: Some("Number of people must be at least 1".to_string()),
                });
            }
            if trip.available_spots < request.number_of_people {
                return Ok(BookingOutcome::Rejected {
                    error: Some("Not enough spots available".to_string()),
                });
            }

            let reservation_number = format!(
                "RES-{}-{}",
                state.reservations.len() + 1,
                rand::random::<u16>() % 900 + 100
            );
            let total_price = trip.final_price * f64::from(request.number_of_people);
            state.reservations.push(StoredReservation {
                reservation: Reservation {
                    id: reservation_number.clone(),
                    trip_id: Some(trip.id),
                    trip_name: Some(trip.name.clone()),
                    destination: Some(trip.destination.clone()),
                    country: Some(trip.country.clone()),
                    customer_name: Some(customer.name.clone()),
                    number_of_people: request.number_of_people,
                    booking_date: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
                    status: ReservationStatus::Pending,
                    total_price,
                },
                customer_id: customer.id,
            });
            refresh_spots(&mut state);

            Ok(BookingOutcome::Booked {
                reservation_number,
                total_price: Some(total_price),
                status: ReservationStatus::Pending,
            })
        }

        async fn cancel_reservation(
            &self,
            reservation_id: &str,
        ) -> Result<CancelOutcome, ApiError> {
            self.enter().await?;
            let mut state = self.state.lock().await;

            let Some(stored) = state
                .reservations
                .iter_mut()
                .find(|r| r.reservation.id == reservation_id)
            else {
                return Ok(CancelOutcome::Rejected {
                    error: Some("Reservation not found".to_string()),
                });
            };

            match stored.reservation.status {
                ReservationStatus::Cancelled | ReservationStatus::Completed => {
                    Ok(CancelOutcome::Rejected {
                        error: Some("Cannot cancel".to_string()),
                    })
                }
                _ => {
                    stored.reservation.status = ReservationStatus::Cancelled;
                    refresh_spots(&mut state);
                    Ok(CancelOutcome::Cancelled {
                        status: ReservationStatus::Cancelled,
                    })
                }
            }
        }
    }

    pub fn trip(id: TripId, trip_type: TripType, max_participants: u32) -> Trip {
        Trip {
            id,
            trip_code: Some(format!("TRP-{id:03}")),
            name: format!("Trip {id}"),
            trip_type,
            description: "Sample trip".to_string(),
            destination: "Lisbon".to_string(),
            country: "Portugal".to_string(),
            climate: None,
            departure_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            return_date: NaiveDate::from_ymd_opt(2026, 12, 8).unwrap(),
            duration: 7,
            base_price: Some(100.0),
            final_price: 120.0,
            max_participants,
            available_spots: max_participants,
            difficulty_level: None,
            equipment_included: None,
            guided_tours: None,
            historical_sites: None,
            resort_name: None,
            all_inclusive: None,
        }
    }

    pub fn customer(id: CustomerId, name: &str) -> Customer {
        Customer {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            registration_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        }
    }

    /// Two customers and three trips, one per type.
    pub async fn seeded() -> MockServer {
        let server = MockServer::new();
        server.add_customer(customer(1, "Ana Silva")).await;
        server.add_customer(customer(2, "Ben Okafor")).await;
        server.add_trip(trip(1, TripType::Adventure, 12)).await;
        server.add_trip(trip(2, TripType::Cultural, 3)).await;
        server.add_trip(trip(3, TripType::Vacation, 20)).await;
        server
    }
}
