//! Auth gate evaluation for protected pages
//!
//! Framework-free: the Yew hook and the async `AuthGate` driver both feed the
//! current [`SessionState`] through [`evaluate`] and act on the decision.

use crate::session::SessionState;
use url::form_urlencoded;

/// Default login page
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Query parameter carrying the originally requested page
pub const REDIRECT_QUERY_PARAM: &str = "redirectTo";

/// Options accepted by the auth gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOptions {
    /// Where unauthenticated users are sent
    pub redirect_to: String,
    /// Whether the page needs an authenticated session at all
    pub require_auth: bool,
    /// Page to return to after logging in
    pub redirect_path: Option<String>,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            redirect_to: DEFAULT_LOGIN_PATH.to_string(),
            require_auth: true,
            redirect_path: None,
        }
    }
}

impl GateOptions {
    /// Gate a page that returns to `path` after login
    pub fn protecting(path: impl Into<String>) -> Self {
        Self::default().redirect_path(path)
    }

    #[must_use]
    pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
        self.redirect_to = target.into();
        self
    }

    #[must_use]
    pub fn require_auth(mut self, require_auth: bool) -> Self {
        self.require_auth = require_auth;
        self
    }

    #[must_use]
    pub fn redirect_path(mut self, path: impl Into<String>) -> Self {
        self.redirect_path = Some(path.into());
        self
    }

    /// URL unauthenticated users are sent to
    pub fn login_url(&self) -> String {
        login_redirect_url(&self.redirect_to, self.redirect_path.as_deref())
    }
}

/// What the gate reports to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateStatus {
    pub is_authenticated: bool,
    /// Initialization has not completed yet; no decision has been made
    pub is_checking: bool,
}

impl GateStatus {
    /// `None` while checking, then whether the user is logged in
    pub fn is_logged_in(&self) -> Option<bool> {
        (!self.is_checking).then_some(self.is_authenticated)
    }

    pub fn is_unauthenticated(&self) -> bool {
        !self.is_checking && !self.is_authenticated
    }

    /// Alias of `is_checking`
    pub fn is_loading(&self) -> bool {
        self.is_checking
    }
}

/// What the page should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Initialization pending; render a placeholder and do not redirect
    Checking,
    /// Render the page
    Allow,
    /// Navigate to the contained URL
    Redirect(String),
}

/// Evaluate the gate for `state` at `now_ms`
pub fn evaluate(state: &SessionState, now_ms: i64, options: &GateOptions) -> (GateStatus, GateDecision) {
    let is_authenticated = state.is_authenticated_at(now_ms);
    let status = GateStatus {
        is_authenticated,
        is_checking: !state.initialized,
    };

    let decision = if !state.initialized {
        GateDecision::Checking
    } else if options.require_auth && !is_authenticated {
        GateDecision::Redirect(options.login_url())
    } else {
        GateDecision::Allow
    };

    (status, decision)
}

/// Build `redirect_to`, appending `?redirectTo=<encoded path>` when a return path is given
pub fn login_redirect_url(redirect_to: &str, redirect_path: Option<&str>) -> String {
    match redirect_path {
        Some(path) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair(REDIRECT_QUERY_PARAM, path)
                .finish();
            let separator = if redirect_to.contains('?') { '&' } else { '?' };
            format!("{redirect_to}{separator}{query}")
        }
        None => redirect_to.to_string(),
    }
}
