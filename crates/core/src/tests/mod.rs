//! Test support shared with downstream crates (enabled by the `tests` feature)


pub use crate::clock::ManualClock;
pub use storage::{FailingStorage, SessionStorageTestSuite};
