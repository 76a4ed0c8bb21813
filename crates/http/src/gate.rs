//! Async auth gate driver

use crate::manager::SessionManager;
use railo_core::guard::evaluate;
use railo_core::{GateDecision, GateOptions, GateStatus, SessionChanges};

/// Auth gate for one protected view
///
/// Re-evaluates on every session change, so a logout elsewhere turns a
/// previous `Allow` into a `Redirect`.
#[derive(Debug)]
pub struct AuthGate {
    manager: SessionManager,
    options: GateOptions,
    changes: SessionChanges,
}

impl AuthGate {
    pub fn new(manager: SessionManager, options: GateOptions) -> Self {
        let changes = manager.session().subscribe();
        Self {
            manager,
            options,
            changes,
        }
    }

    pub fn options(&self) -> &GateOptions {
        &self.options
    }

    /// Run the initializer if needed and return the settled decision
    pub async fn resolve(&mut self) -> GateDecision {
        self.manager.initialize().await;
        self.changes.borrow_and_update();
        self.decision()
    }

    pub fn status(&self) -> GateStatus {
        self.evaluate().0
    }

    pub fn decision(&self) -> GateDecision {
        self.evaluate().1
    }

    /// Wait for the next session change and re-evaluate
    ///
    /// Returns `None` once the session is gone.
    pub async fn changed(&mut self) -> Option<(GateStatus, GateDecision)> {
        self.changes.changed().await.ok()?;
        self.changes.borrow_and_update();
        Some(self.evaluate())
    }

    fn evaluate(&self) -> (GateStatus, GateDecision) {
        let session = self.manager.session();
        evaluate(&session.state(), session.now_ms(), &self.options)
    }
}
