//! Login and logout

use super::{ClientError, RailClient};
use crate::types::{ApiResponse, IssuedToken, LoginRequest};
use tracing::info;

impl RailClient {
    /// Log in with member number and password and store the issued token
    pub async fn login(&self, member_no: &str, password: &str) -> Result<(), ClientError> {
        let req = self
            .request(reqwest::Method::POST, &self.login_endpoint)
            .json(&LoginRequest {
                member_no: member_no.to_string(),
                password: password.to_string(),
            });
        // Bad credentials answer 401, which must not trigger a reissue
        let envelope: ApiResponse<IssuedToken> = self.execute_anonymous(req).await?;
        let token = envelope
            .result
            .filter(|token| !token.access_token.is_empty())
            .ok_or(ClientError::MissingResult {
                message: envelope.message,
            })?;

        let session = self.session();
        let expires_at_ms = token.expires_at_ms(session.now_ms());
        session.set_tokens(token.access_token, expires_at_ms);
        info!(expires_at_ms, "Logged in");
        Ok(())
    }

    /// Log out; local tokens are cleared whatever the server answers
    pub async fn logout(&self) -> Result<(), ClientError> {
        let req = self.request(reqwest::Method::POST, &self.logout_endpoint);
        let result = self.send(req).await.map(drop);
        self.session().remove_tokens();
        info!("Logged out");
        result
    }
}
