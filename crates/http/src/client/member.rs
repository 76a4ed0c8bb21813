//! Member profile and account changes
//!
//! Account changes answer with a bare envelope; their `message` is returned.

use super::{ClientError, RailClient};
use crate::types::{
    ApiResponse, GuestRegistration, MemberInfo, PasswordChange, PhoneNumberChange,
};
use serde_json::Value;

impl RailClient {
    pub async fn member_info(&self) -> Result<MemberInfo, ClientError> {
        let req = self.request(reqwest::Method::GET, "/api/v1/members/me");
        self.execute_result(req).await
    }

    pub async fn change_phone_number(
        &self,
        request: &PhoneNumberChange,
    ) -> Result<String, ClientError> {
        let req = self
            .request(reqwest::Method::PUT, "/api/v1/members/phone-number")
            .json(request);
        self.execute_message(req).await
    }

    pub async fn change_password(&self, request: &PasswordChange) -> Result<String, ClientError> {
        let req = self
            .request(reqwest::Method::PUT, "/api/v1/members/password")
            .json(request);
        self.execute_message(req).await
    }

    /// Register a non-member booking identity
    pub async fn register_guest(
        &self,
        request: &GuestRegistration,
    ) -> Result<String, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/api/v1/guest/register")
            .json(request);
        self.execute_message(req).await
    }

    /// Delete the logged-in member
    ///
    /// The local session is cleared once the server accepted the deletion.
    pub async fn delete_member(&self) -> Result<String, ClientError> {
        let req = self.request(reqwest::Method::DELETE, "/api/v1/members");
        let message = self.execute_message(req).await?;
        self.session().remove_tokens();
        Ok(message)
    }

    async fn execute_message(&self, request: reqwest::RequestBuilder) -> Result<String, ClientError> {
        let envelope: ApiResponse<Value> = self.execute(request).await?;
        Ok(envelope.message)
    }
}
