//! Single-flight token reissue

use crate::client::error::ClientError;
use crate::types::{ApiResponse, IssuedToken};
use railo_core::{Session, SingleFlight};
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Exchanges the session cookie for a new access token
///
/// Clones share the same in-flight attempt.
#[derive(Clone)]
pub struct ReissueCoordinator {
    flight: SingleFlight<bool>,
    endpoint: Arc<ReissueEndpoint>,
}

struct ReissueEndpoint {
    client: Client,
    base_url: String,
    paths: Vec<String>,
    timeout: Duration,
    session: Arc<Session>,
}

/// Outcome of one candidate endpoint
enum Attempt {
    Issued(IssuedToken),
    /// Endpoint answered but did not issue a token
    Declined(StatusCode),
}

impl std::fmt::Debug for ReissueCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReissueCoordinator")
            .field("paths", &self.endpoint.paths)
            .field("flight", &self.flight)
            .finish_non_exhaustive()
    }
}

impl ReissueCoordinator {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        paths: Vec<String>,
        timeout: Duration,
        session: Arc<Session>,
    ) -> Self {
        Self {
            flight: SingleFlight::new(),
            endpoint: Arc::new(ReissueEndpoint {
                client,
                base_url: base_url.into().trim_end_matches('/').to_string(),
                paths,
                timeout,
                session,
            }),
        }
    }

    /// Obtain a fresh access token
    ///
    /// Concurrent callers share one attempt. On success the session holds the
    /// new token; on failure the session has been cleared.
    pub async fn refresh_tokens(&self) -> bool {
        let endpoint = Arc::clone(&self.endpoint);
        self.flight
            .run(move || async move { endpoint.reissue().await })
            .await
    }

    pub fn is_in_flight(&self) -> bool {
        self.flight.is_in_flight()
    }

    /// Whether `url` targets one of the reissue endpoints
    pub fn is_reissue_url(&self, url: &Url) -> bool {
        let path = url.path();
        self.endpoint
            .paths
            .iter()
            .any(|candidate| match Url::parse(candidate) {
                Ok(absolute) => {
                    absolute.host_str() == url.host_str()
                        && absolute.port_or_known_default() == url.port_or_known_default()
                        && absolute.path() == path
                }
                Err(_) => path.ends_with(candidate.as_str()),
            })
    }
}

impl ReissueEndpoint {
    async fn reissue(&self) -> bool {
        let mut last_error = None;

        for path in &self.paths {
            match self.attempt(path).await {
                Ok(Attempt::Issued(token)) => {
                    let expires_at_ms = token.expires_at_ms(self.session.now_ms());
                    self.session.set_tokens(token.access_token, expires_at_ms);
                    info!(path = %path, expires_at_ms, "Access token reissued");
                    return true;
                }
                Ok(Attempt::Declined(status)) => {
                    debug!(path = %path, %status, "Reissue endpoint declined");
                }
                Err(err) => {
                    debug!(path = %path, error = %err, "Reissue attempt failed");
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) => warn!(error = %err, "Token reissue failed, clearing session"),
            None => warn!("No reissue endpoint issued a token, clearing session"),
        }
        self.session.remove_tokens();
        false
    }

    async fn attempt(&self, path: &str) -> Result<Attempt, ClientError> {
        let url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            path.to_string()
        };
        let request = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .timeout(self.timeout);

        #[cfg(target_arch = "wasm32")]
        let request = request.fetch_credentials_include();

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND {
            return Ok(Attempt::Declined(status));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(ClientError::from_status(status, message));
        }

        let body = response.bytes().await?;
        let Ok(envelope) = serde_json::from_slice::<ApiResponse<IssuedToken>>(&body) else {
            return Ok(Attempt::Declined(status));
        };
        Ok(envelope
            .result
            .filter(|token| !token.access_token.is_empty())
            .map_or(Attempt::Declined(status), Attempt::Issued))
    }
}
