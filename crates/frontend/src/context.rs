//! Session context and provider

use futures::channel::oneshot;
use futures::future::{self, Either};
use railo_core::{GateOptions, SessionChanges, SessionState};
use railo_http::RailClient;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Session context data: the shared client and the latest session snapshot
#[derive(Clone, Debug, PartialEq)]
pub struct SessionContext {
    pub client: RailClient,
    pub state: SessionState,
    /// Gate defaults for protected pages, e.g. the login page
    pub gate: GateOptions,
}

impl SessionContext {
    /// Evaluation time for gate decisions
    pub fn now_ms(&self) -> i64 {
        self.client.session().now_ms()
    }
}

/// Session provider props
#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    pub client: RailClient,
    /// Usually `settings.auth.gate_options()`
    #[prop_or_default]
    pub gate: GateOptions,
    pub children: Children,
}

/// Publishes the session to descendants and re-renders them on every change
#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let state = use_state(|| props.client.session().state());

    // Follow the session for as long as the provider is mounted
    {
        let state = state.clone();
        use_effect_with(props.client.clone(), move |client| {
            let mut changes = client.session().subscribe();
            state.set(changes.borrow_and_update().clone());

            let (stop, stopped) = oneshot::channel::<()>();
            spawn_local(follow_session(changes, stopped, move |snapshot| state.set(snapshot)));

            move || {
                let _ = stop.send(());
            }
        });
    }

    let context = SessionContext {
        client: props.client.clone(),
        state: (*state).clone(),
        gate: props.gate.clone(),
    };

    html! {
        <ContextProvider<SessionContext> context={context}>
            {props.children.clone()}
        </ContextProvider<SessionContext>>
    }
}

/// Apply every session change until the session is dropped or `stopped` fires
async fn follow_session(
    mut changes: SessionChanges,
    mut stopped: oneshot::Receiver<()>,
    mut apply: impl FnMut(SessionState),
) {
    loop {
        let changed = matches!(
            future::select(Box::pin(changes.changed()), &mut stopped).await,
            Either::Left((Ok(()), _))
        );
        if !changed {
            break;
        }
        apply(changes.borrow_and_update().clone());
    }
}

/// Hook to use the session context
///
/// Returns `None` outside of a [`SessionProvider`].
#[hook]
pub fn use_session() -> Option<SessionContext> {
    use_context::<SessionContext>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use railo_core::Session;

    #[test]
    fn following_ends_when_stopped_while_session_lives() {
        let session = Session::in_memory();
        let (stop, stopped) = oneshot::channel();
        stop.send(()).unwrap();

        let mut seen = Vec::new();
        block_on(follow_session(session.subscribe(), stopped, |state| seen.push(state)));

        assert!(seen.is_empty());
        assert!(session.token().is_none());
    }

    #[test]
    fn following_applies_changes_until_session_is_dropped() {
        let session = Session::in_memory();
        let changes = session.subscribe();
        let (_stop, stopped) = oneshot::channel();

        session.set_tokens("T1", i64::MAX);
        drop(session);

        let mut seen = Vec::new();
        block_on(follow_session(changes, stopped, |state| seen.push(state)));

        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].credentials.as_ref().map(|c| c.access_token()),
            Some("T1")
        );
    }
}
