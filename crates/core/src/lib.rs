//! RAIL-O client session core
//!
//! Holds the access-token store with its persistence backends, the
//! single-flight guard shared by refresh and initialization, and the pure
//! evaluation behind the auth gate. Everything network-bound lives in
//! `railo-http`.

pub mod clock;
pub mod config;
pub mod error;
pub mod guard;
pub mod session;
pub mod single_flight;
pub mod storage;

#[cfg(any(test, feature = "tests"))]
pub mod tests;

pub use clock::{Clock, SystemClock};
pub use config::{ApiSettings, AuthSettings, Settings};
pub use error::{CoreError, CoreResult};
pub use guard::{GateDecision, GateOptions, GateStatus};
pub use session::{Credentials, STORAGE_KEY, Session, SessionChanges, SessionState};
pub use single_flight::SingleFlight;
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
pub use storage::{MemoryStorage, SessionStorage};
