//! Auth gate hook for protected pages

use crate::context::use_session;
use railo_core::guard::evaluate;
use railo_core::{GateDecision, GateOptions, GateStatus, SessionState};
use tracing::{debug, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Defer a protected page until the session is validated
///
/// Runs the initializer once on first mount and re-evaluates on every
/// session change. When the decision is a redirect the browser is sent to
/// the login URL. Outside of a `SessionProvider` the page stays checking.
#[hook]
pub fn use_auth_gate(options: GateOptions) -> GateStatus {
    let context = use_session();

    {
        let manager = context.as_ref().map(|context| context.client.manager().clone());
        use_effect_with((), move |()| {
            if let Some(manager) = manager {
                spawn_local(async move { manager.initialize().await });
            } else {
                warn!("use_auth_gate used outside of a SessionProvider");
            }
        });
    }

    let (status, decision) = match &context {
        Some(context) => evaluate(&context.state, context.now_ms(), &options),
        None => evaluate(&SessionState::default(), 0, &options),
    };

    use_effect_with(decision, |decision| {
        if let GateDecision::Redirect(url) = decision {
            debug!(%url, "Redirecting unauthenticated visitor");
            if let Err(err) = gloo::utils::window().location().assign(url) {
                warn!(?err, "Failed to navigate to login page");
            }
        }
    });

    status
}
