//! RAIL-O HTTP client
//!
//! Every request sent through [`RailClient::send`] carries the session's
//! bearer token. A 401 answer triggers one shared token reissue and a single
//! resend of the original request with the new token.

pub mod auth;
pub mod booking;
pub mod error;
pub mod member;
pub mod payment;
pub mod train;

#[cfg(not(target_arch = "wasm32"))]
use crate::cookies::CookieJar;
use crate::manager::SessionManager;
use crate::reissue::ReissueCoordinator;
use crate::types::ApiResponse;
use error::ClientError;
use railo_core::{Session, Settings};
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, ClientBuilder, Request, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// RAIL-O API client
#[derive(Clone)]
pub struct RailClient {
    client: Client,
    base_url: String,
    manager: SessionManager,
    login_endpoint: String,
    logout_endpoint: String,
}

impl std::fmt::Debug for RailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RailClient")
            .field("base_url", &self.base_url)
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}

impl PartialEq for RailClient {
    fn eq(&self, other: &Self) -> bool {
        self.base_url == other.base_url && self.manager == other.manager
    }
}

impl RailClient {
    /// Create a new client with default configuration and an in-memory session
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> RailClientBuilder {
        RailClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session object shared with the gate and the front ends
    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn session(&self) -> &Arc<Session> {
        self.manager.session()
    }

    /// Create a request builder for `path` relative to the base URL
    ///
    /// The bearer token is attached by [`RailClient::send`], not here.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.request(method, url);

        #[cfg(target_arch = "wasm32")]
        let request = request.fetch_credentials_include();

        request
    }

    /// Send a request through the auth interceptor
    ///
    /// Non-2xx answers are returned as [`ClientError::from_status`] with the
    /// response body as message.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let mut request = request.build()?;
        if !request.headers().contains_key(header::AUTHORIZATION) {
            if let Some(token) = self.session().token() {
                set_bearer(&mut request, &token)?;
            }
        }

        let from_reissue = self.manager.reissue().is_reissue_url(request.url());
        let retry = request.try_clone();
        let response = self.client.execute(request).await?;

        if response.status() != StatusCode::UNAUTHORIZED || from_reissue {
            return check(response).await;
        }
        let Some(mut retry) = retry else {
            debug!(url = %response.url(), "Request body cannot be replayed, not reissuing");
            return check(response).await;
        };

        debug!(url = %response.url(), "Access token rejected, reissuing");
        if !self.manager.reissue().refresh_tokens().await {
            self.session().remove_tokens();
            return check(response).await;
        }
        let Some(token) = self.session().token() else {
            return check(response).await;
        };

        if set_bearer(&mut retry, &token).is_err() {
            warn!("Reissued token is not a valid header value, clearing session");
            self.session().remove_tokens();
            return check(response).await;
        }
        let response = self.client.execute(retry).await?;
        check(response).await
    }

    /// Send a request and decode the JSON body
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Send a request and unwrap the `result` of the response envelope
    pub async fn execute_result<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let envelope: ApiResponse<T> = self.execute(request).await?;
        envelope
            .result
            .ok_or(ClientError::MissingResult {
                message: envelope.message,
            })
    }

    /// Send a request without touching the session or the interceptor
    async fn execute_anonymous<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

fn set_bearer(request: &mut Request, token: &str) -> Result<(), ClientError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ClientError::Configuration("access token is not a valid header value".into()))?;
    value.set_sensitive(true);
    request.headers_mut().insert(header::AUTHORIZATION, value);
    Ok(())
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let message = response.text().await.unwrap_or_else(|_| status.to_string());
        Err(ClientError::from_status(status, message))
    }
}

/// Builder for RailClient
pub struct RailClientBuilder {
    base_url: Option<String>,
    session: Option<Arc<Session>>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    reissue_paths: Vec<String>,
    reissue_timeout: Duration,
    login_endpoint: String,
    logout_endpoint: String,
    #[cfg(not(target_arch = "wasm32"))]
    cookie_jar: Option<Arc<CookieJar>>,
}

impl Default for RailClientBuilder {
    fn default() -> Self {
        let auth = Settings::default().auth;
        Self {
            base_url: None,
            session: None,
            timeout: None,
            user_agent: None,
            reissue_timeout: auth.reissue_timeout(),
            reissue_paths: auth.reissue_paths,
            login_endpoint: auth.login_endpoint,
            logout_endpoint: auth.logout_endpoint,
            #[cfg(not(target_arch = "wasm32"))]
            cookie_jar: None,
        }
    }
}

impl RailClientBuilder {
    /// Builder preloaded with `settings`
    pub fn from_settings(settings: &Settings) -> Self {
        Self::default()
            .base_url(settings.api.base_url.clone())
            .timeout(settings.api.timeout())
            .user_agent(settings.api.user_agent.clone())
            .reissue_paths(settings.auth.reissue_paths.clone())
            .reissue_timeout(settings.auth.reissue_timeout())
            .login_endpoint(settings.auth.login_endpoint.clone())
            .logout_endpoint(settings.auth.logout_endpoint.clone())
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Share an existing session; defaults to [`Session::in_memory`]
    pub fn session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Reissue endpoints, tried in order
    pub fn reissue_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reissue_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn reissue_timeout(mut self, timeout: Duration) -> Self {
        self.reissue_timeout = timeout;
        self
    }

    pub fn login_endpoint(mut self, path: impl Into<String>) -> Self {
        self.login_endpoint = path.into();
        self
    }

    pub fn logout_endpoint(mut self, path: impl Into<String>) -> Self {
        self.logout_endpoint = path.into();
        self
    }

    /// Keep cookies in `jar` instead of a private in-memory store
    #[cfg(not(target_arch = "wasm32"))]
    pub fn cookie_jar(mut self, jar: Arc<CookieJar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<RailClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        if self.reissue_paths.is_empty() {
            return Err(ClientError::Configuration(
                "at least one reissue path is required".into(),
            ));
        }

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        {
            client_builder = match self.cookie_jar {
                Some(jar) => client_builder.cookie_provider(jar),
                None => client_builder.cookie_store(true),
            };
            if let Some(timeout) = self.timeout {
                client_builder = client_builder.timeout(timeout);
            }
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder =
                client_builder.user_agent(concat!("railo-client/", env!("CARGO_PKG_VERSION")));
        }

        let client = client_builder.build()?;
        let session = self.session.unwrap_or_else(|| Arc::new(Session::in_memory()));
        let reissue = ReissueCoordinator::new(
            client.clone(),
            base_url.clone(),
            self.reissue_paths,
            self.reissue_timeout,
            Arc::clone(&session),
        );

        Ok(RailClient {
            client,
            base_url,
            manager: SessionManager::new(session, reissue),
            login_endpoint: self.login_endpoint,
            logout_endpoint: self.logout_endpoint,
        })
    }
}
