//! Payment preparation and confirmation

use super::{ClientError, RailClient};
use crate::types::{
    PaymentConfirmRequest, PaymentConfirmResult, PaymentPrepareRequest, PaymentPrepareResult,
};

impl RailClient {
    /// Create an order for pending bookings
    pub async fn prepare_payment(
        &self,
        request: &PaymentPrepareRequest,
    ) -> Result<PaymentPrepareResult, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/api/v1/payments/prepare")
            .json(request);
        self.execute_result(req).await
    }

    /// Confirm an order after the payment provider approved it
    pub async fn confirm_payment(
        &self,
        request: &PaymentConfirmRequest,
    ) -> Result<PaymentConfirmResult, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/api/v1/payments/confirm")
            .json(request);
        self.execute_result(req).await
    }
}
