//! Wire types exchanged with the RAIL-O backend

use serde::{Deserialize, Serialize};

/// Envelope every backend response is wrapped in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
}

/// Token issued by login or reissue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds from issuance
    pub access_token_expires_in: i64,
}

impl IssuedToken {
    /// Absolute expiry in ms since the epoch for a token issued at `now_ms`
    pub fn expires_at_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_add(self.access_token_expires_in.saturating_mul(1000))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub member_no: String,
    pub password: String,
}

/// One booking in the member's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingHistoryItem {
    pub booking_id: i64,
    pub booking_code: String,
    pub train_number: String,
    pub train_name: String,
    pub departure_station_name: String,
    pub arrival_station_name: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub operation_date: String,
    #[serde(default)]
    pub tickets: Vec<TicketItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketItem {
    pub ticket_id: i64,
    pub ticket_number: String,
    pub status: String,
    pub passenger_type: String,
    pub car_number: i64,
    pub car_type: String,
    pub seat_number: String,
}

/// Receipt detail of a single ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReceipt {
    pub ticket_number: String,
    pub train_number: String,
    pub departure_station_name: String,
    pub arrival_station_name: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub operation_date: String,
    pub car_number: i64,
    pub car_type: String,
    pub seat_number: String,
    pub passenger_type: String,
    pub amount: i64,
    pub payment_method: String,
    pub paid_at: String,
    pub ticket_created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBookingRequest {
    pub train_schedule_id: i64,
    pub departure_station_id: i64,
    pub arrival_station_id: i64,
    pub passenger_types: Vec<String>,
    pub seat_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBookingSeat {
    pub seat_id: i64,
    pub passenger_type: String,
    pub car_number: i64,
    pub car_type: String,
    pub seat_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBookingInfo {
    pub pending_booking_id: String,
    pub train_number: String,
    pub train_name: String,
    pub departure_station_name: String,
    pub arrival_station_name: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub operation_date: String,
    #[serde(default)]
    pub seats: Vec<PendingBookingSeat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPrepareRequest {
    pub message: String,
    pub pending_booking_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPrepareResult {
    pub order_id: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmRequest {
    pub payment_key: String,
    pub order_id: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmResult {
    pub payment_id: i64,
    pub order_id: String,
    pub payment_key: String,
    pub amount: i64,
    pub payment_method: String,
    pub payment_status: String,
    pub paid_at: String,
}

/// Profile of the logged-in member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub name: String,
    #[serde(default)]
    pub member_no: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberChange {
    pub new_phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRegistration {
    pub name: String,
    pub phone_number: String,
    pub password: String,
}

/// One operation date of the search calendar
///
/// The backend sends the flags as `"Y"`/`"N"` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub operation_date: String,
    pub day_of_week: String,
    pub business_day_type: String,
    pub is_holiday: String,
    pub is_booking_available: String,
}

impl CalendarDay {
    pub fn bookable(&self) -> bool {
        self.is_booking_available.eq_ignore_ascii_case("y")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSearchRequest {
    pub departure_station_id: i64,
    pub arrival_station_id: i64,
    pub operation_date: String,
    pub passenger_count: u32,
    pub departure_hour: String,
    pub departure_time_filter: String,
}

/// One page of schedule search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSearchResult {
    /// Schedule rows, passed through as sent
    #[serde(default)]
    pub content: serde_json::Value,
    pub current_page: u32,
    pub page_size: u32,
    pub number_of_elements: u32,
    pub has_next: bool,
    pub has_previous: bool,
    pub first: bool,
    pub last: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainCarSearchRequest {
    pub train_schedule_id: i64,
    pub departure_station_id: i64,
    pub arrival_station_id: i64,
    pub passenger_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainCarSearchResult {
    pub train_schedule_id: i64,
    pub recommended_car_number: String,
    pub total_car_count: u32,
    pub train_classification_code: String,
    pub train_number: String,
    #[serde(default)]
    pub car_infos: Vec<TrainCar>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainCar {
    pub id: i64,
    pub car_number: String,
    pub car_type: String,
    pub total_seats: u32,
    pub remaining_seats: u32,
    pub seat_arrangement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapRequest {
    pub train_car_id: i64,
    pub train_schedule_id: i64,
    pub departure_station_id: i64,
    pub arrival_station_id: i64,
}

/// Seat layout of one car
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMap {
    pub car_number: String,
    pub car_type: String,
    pub total_seat_count: u32,
    pub remaining_seat_count: u32,
    pub layout_type: u32,
    #[serde(default)]
    pub seat_list: Vec<Seat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub seat_id: i64,
    pub seat_number: String,
    pub is_available: bool,
    pub seat_direction: String,
    pub seat_type: String,
    #[serde(default)]
    pub remarks: String,
}
