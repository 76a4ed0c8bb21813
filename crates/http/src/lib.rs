//! Authenticated HTTP client for the RAIL-O backend
//!
//! [`RailClient`] attaches the session's bearer token to every request and
//! recovers from an expired token with a single shared reissue. The
//! [`SessionManager`] it carries is the session object the gate and the
//! front ends share.

pub mod client;
#[cfg(not(target_arch = "wasm32"))]
pub mod cookies;
pub mod gate;
pub mod manager;
pub mod reissue;
pub mod types;

pub use client::error::ClientError;
pub use client::{RailClient, RailClientBuilder};
#[cfg(not(target_arch = "wasm32"))]
pub use cookies::{COOKIE_FILE_NAME, CookieJar};
pub use gate::AuthGate;
pub use manager::SessionManager;
pub use reissue::ReissueCoordinator;
