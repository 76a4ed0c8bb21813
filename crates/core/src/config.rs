//! Client configuration

use crate::error::{CoreError, CoreResult};
use crate::guard::{DEFAULT_LOGIN_PATH, GateOptions};
use crate::session::STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix, e.g. `RAILO_API__BASE_URL`
pub const ENV_PREFIX: &str = "RAILO";

/// Main client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Session and token reissue configuration
    #[serde(default)]
    pub auth: AuthSettings,
}

/// Backend API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL every request path is appended to
    pub base_url: String,

    /// Request timeout in seconds (native only)
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

/// Session and token reissue configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Reissue endpoints, tried in order; paths are relative to `api.base_url`
    pub reissue_paths: Vec<String>,

    /// Timeout for a single reissue attempt in seconds
    pub reissue_timeout_secs: u64,

    /// Storage key of the persisted session
    pub storage_key: String,

    /// Login page unauthenticated users are redirected to
    pub login_path: String,

    /// Login endpoint
    pub login_endpoint: String,

    /// Logout endpoint
    pub logout_endpoint: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
            user_agent: concat!("railo-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            reissue_paths: vec![
                "/auth/reissue".to_string(),
                "/api/v1/auth/reissue".to_string(),
            ],
            reissue_timeout_secs: 10,
            storage_key: STORAGE_KEY.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            login_endpoint: "/auth/login".to_string(),
            logout_endpoint: "/auth/logout".to_string(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AuthSettings {
    pub fn reissue_timeout(&self) -> Duration {
        Duration::from_secs(self.reissue_timeout_secs)
    }

    /// Gate options sending unauthenticated users to `login_path`
    pub fn gate_options(&self) -> GateOptions {
        GateOptions::default().redirect_to(self.login_path.clone())
    }
}

fn is_endpoint(path: &str) -> bool {
    path.starts_with('/')
        || url::Url::parse(path).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

impl Settings {
    /// Load configuration from file, with environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the result
    /// fails validation
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(Self::environment())
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> CoreResult<Self> {
        let defaults = Self::default();

        let settings = config::Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.timeout_secs", defaults.api.timeout_secs)?
            .set_default("api.user_agent", defaults.api.user_agent)?
            .set_default("auth.reissue_paths", defaults.auth.reissue_paths)?
            .set_default("auth.reissue_timeout_secs", defaults.auth.reissue_timeout_secs)?
            .set_default("auth.storage_key", defaults.auth.storage_key)?
            .set_default("auth.login_path", defaults.auth.login_path)?
            .set_default("auth.login_endpoint", defaults.auth.login_endpoint)?
            .set_default("auth.logout_endpoint", defaults.auth.logout_endpoint)?
            .add_source(Self::environment())
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path` when given, otherwise from defaults and environment
    ///
    /// # Errors
    ///
    /// See [`Settings::from_file`] and [`Settings::from_env`]
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("auth.reissue_paths")
            .try_parsing(true)
    }

    /// Check invariants the client relies on
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first violated rule
    pub fn validate(&self) -> CoreResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(CoreError::invalid_config("api.base_url must not be empty"));
        }
        if self.auth.reissue_paths.is_empty() {
            return Err(CoreError::invalid_config(
                "auth.reissue_paths needs at least one endpoint",
            ));
        }
        if let Some(path) = self.auth.reissue_paths.iter().find(|path| !is_endpoint(path)) {
            return Err(CoreError::invalid_config(format!(
                "reissue path {path:?} must start with '/' or be an http(s) URL"
            )));
        }
        if self.auth.storage_key.is_empty() {
            return Err(CoreError::invalid_config("auth.storage_key must not be empty"));
        }
        Ok(())
    }

    /// Render as TOML, for `railo config init`
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the settings cannot be encoded
    pub fn to_toml(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|err| CoreError::serialization(err.to_string()))
    }
}
