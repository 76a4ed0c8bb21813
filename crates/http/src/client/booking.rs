//! Booking history, receipts and pending bookings

use super::{ClientError, RailClient};
use crate::types::{BookingHistoryItem, PendingBookingInfo, PendingBookingRequest, TicketReceipt};

impl RailClient {
    /// Booking history of the logged-in member
    pub async fn tickets(&self) -> Result<Vec<BookingHistoryItem>, ClientError> {
        let req = self.request(reqwest::Method::GET, "/api/v1/tickets");
        self.execute_result(req).await
    }

    pub async fn ticket_receipt(&self, ticket_id: i64) -> Result<TicketReceipt, ClientError> {
        let req = self.request(
            reqwest::Method::GET,
            &format!("/api/v1/tickets/{ticket_id}/receipt"),
        );
        self.execute_result(req).await
    }

    /// Bookings awaiting payment
    pub async fn pending_bookings(&self) -> Result<Vec<PendingBookingInfo>, ClientError> {
        let req = self.request(reqwest::Method::GET, "/api/v1/pending-bookings");
        self.execute_result(req).await
    }

    /// Hold seats for a train; returns the pending booking to pay for
    pub async fn create_pending_booking(
        &self,
        request: &PendingBookingRequest,
    ) -> Result<PendingBookingInfo, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/api/v1/pending-bookings")
            .json(request);
        self.execute_result(req).await
    }
}
