//! Yew integration of the RAIL-O session core
//!
//! Wrap the app in a [`SessionProvider`] holding the shared [`RailClient`],
//! then guard protected pages with [`RequireAuth`] or [`use_auth_gate`].

pub mod auth_guard;
pub mod context;
pub mod hooks;
pub mod logging;
pub mod storage;

pub use auth_guard::RequireAuth;
pub use context::{SessionContext, SessionProvider, use_session};
pub use hooks::use_auth_gate;
pub use logging::init_logging;
pub use storage::BrowserStorage;

use railo_core::{Session, Settings, SystemClock};
use railo_http::{ClientError, RailClient, RailClientBuilder};
use std::sync::Arc;

/// Build the client over a session hydrated from `localStorage`
pub fn browser_client(settings: &Settings) -> Result<RailClient, ClientError> {
    let session = Session::restore(
        Arc::new(BrowserStorage),
        Arc::new(SystemClock),
        settings.auth.storage_key.clone(),
    );
    RailClientBuilder::from_settings(settings)
        .session(Arc::new(session))
        .build()
}
