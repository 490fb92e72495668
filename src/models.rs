// Records returned by the travel agency API
// All of them are snapshots owned by the remote service, the client never mutates them locally

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TripId = i64;
pub type CustomerId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripType {
    Adventure,
    Cultural,
    Vacation,
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TripType::Adventure => "Adventure",
            TripType::Cultural => "Cultural",
            TripType::Vacation => "Vacation",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DifficultyLevel::Easy => "EASY",
            DifficultyLevel::Medium => "MEDIUM",
            DifficultyLevel::Hard => "HARD",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    #[serde(default)]
    pub trip_code: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub trip_type: TripType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub climate: Option<String>,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub duration: u32,
    #[serde(default)]
    pub base_price: Option<f64>,
    pub final_price: f64,
    pub max_participants: u32,
    pub available_spots: u32,

    // Adventure only
    #[serde(default)]
    pub difficulty_level: Option<DifficultyLevel>,
    #[serde(default)]
    pub equipment_included: Option<bool>,

    // Cultural only
    #[serde(default)]
    pub guided_tours: Option<bool>,
    #[serde(default)]
    pub historical_sites: Option<Vec<String>>,

    // Vacation only
    #[serde(default)]
    pub resort_name: Option<String>,
    #[serde(default)]
    pub all_inclusive: Option<bool>,
}

/// Type-specific attributes of a trip, restricted to the fields its type defines.
#[derive(Debug, Clone, PartialEq)]
pub enum TripDetails {
    Adventure {
        difficulty_level: Option<DifficultyLevel>,
        equipment_included: bool,
    },
    Cultural {
        guided_tours: bool,
        historical_sites: Vec<String>,
    },
    Vacation {
        resort_name: Option<String>,
        all_inclusive: bool,
    },
}

impl Trip {
    pub fn details(&self) -> TripDetails {
        match self.trip_type {
            TripType::Adventure => TripDetails::Adventure {
                difficulty_level: self.difficulty_level,
                equipment_included: self.equipment_included.unwrap_or(false),
            },
            TripType::Cultural => TripDetails::Cultural {
                guided_tours: self.guided_tours.unwrap_or(false),
                historical_sites: self.historical_sites.clone().unwrap_or_default(),
            },
            TripType::Vacation => TripDetails::Vacation {
                resort_name: self.resort_name.clone(),
                all_inclusive: self.all_inclusive.unwrap_or(false),
            },
        }
    }

    pub fn is_sold_out(&self) -> bool {
        self.available_spots == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub registration_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    /// Cancellation is offered to the customer only while the reservation is pending.
    pub fn is_cancellable(self) -> bool {
        self == ReservationStatus::Pending
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The three reservation endpoints return different projections of the same record,
// so every denormalized field is optional and filled in only when the endpoint sends it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    #[serde(default)]
    pub trip_id: Option<TripId>,
    #[serde(default)]
    pub trip_name: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub number_of_people: u32,
    pub booking_date: NaiveDate,
    pub status: ReservationStatus,
    pub total_price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub customer_id: CustomerId,
    pub trip_id: TripId,
    pub number_of_people: u32,
}

// Wire shape shared by the create and cancel endpoints: either a success flag with
// payload fields, or a bare error string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub reservation_number: Option<String>,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub status: Option<ReservationStatus>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Booked {
        reservation_number: String,
        total_price: Option<f64>,
        status: ReservationStatus,
    },
    Rejected {
        error: Option<String>,
    },
}

impl From<ActionResponse> for BookingOutcome {
    fn from(response: ActionResponse) -> Self {
        match (response.success, response.reservation_number) {
            (true, Some(reservation_number)) => BookingOutcome::Booked {
                reservation_number,
                total_price: response.total_price,
                status: response.status.unwrap_or(ReservationStatus::Pending),
            },
            _ => BookingOutcome::Rejected {
                error: response.error,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    Cancelled { status: ReservationStatus },
    Rejected { error: Option<String> },
}

impl CancelOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CancelOutcome::Cancelled { .. })
    }
}

impl From<ActionResponse> for CancelOutcome {
    fn from(response: ActionResponse) -> Self {
        if response.success {
            CancelOutcome::Cancelled {
                status: response.status.unwrap_or(ReservationStatus::Cancelled),
            }
        } else {
            CancelOutcome::Rejected {
                error: response.error,
            }
        }
    }
}
