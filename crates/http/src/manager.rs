//! Session manager: the shared session object and its startup validation

use crate::reissue::ReissueCoordinator;
use railo_core::{Session, SingleFlight};
use std::sync::Arc;
use tracing::debug;

/// Session, reissue coordinator and one-time initializer
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct SessionManager {
    session: Arc<Session>,
    reissue: ReissueCoordinator,
    init: SingleFlight<()>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session", &self.session)
            .field("reissue", &self.reissue)
            .finish_non_exhaustive()
    }
}

/// Managers are equal when they share the same session
impl PartialEq for SessionManager {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.session, &other.session)
    }
}

impl SessionManager {
    pub fn new(session: Arc<Session>, reissue: ReissueCoordinator) -> Self {
        Self {
            session,
            reissue,
            init: SingleFlight::new(),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn reissue(&self) -> &ReissueCoordinator {
        &self.reissue
    }

    /// Validate the hydrated session once
    ///
    /// A fresh stored token is accepted as is. Otherwise one reissue is
    /// attempted and the session is cleared if it fails. Concurrent callers
    /// share the same validation; later calls return immediately.
    pub async fn initialize(&self) {
        if self.session.is_initialized() {
            return;
        }

        let session = Arc::clone(&self.session);
        let reissue = self.reissue.clone();
        self.init
            .run(move || async move {
                // Another flight may have finished between the check and the join
                if session.is_initialized() {
                    return;
                }
                if session.has_valid_token() {
                    debug!("Stored access token is fresh");
                } else if !reissue.refresh_tokens().await {
                    session.remove_tokens();
                }
                session.finish_initialization();
            })
            .await;
    }
}
