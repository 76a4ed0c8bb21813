use railo_core::Settings;
use railo_frontend::{RequireAuth, SessionProvider, browser_client, init_logging, use_session};
use railo_http::RailClient;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
struct AppProps {
    client: RailClient,
    settings: Settings,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    let path = gloo::utils::window()
        .location()
        .pathname()
        .unwrap_or_else(|_| "/".to_string());

    html! {
        <SessionProvider client={props.client.clone()} gate={props.settings.auth.gate_options()}>
            <RequireAuth redirect_path={AttrValue::from(path)}>
                <SessionSummary />
            </RequireAuth>
        </SessionProvider>
    }
}

#[function_component(SessionSummary)]
fn session_summary() -> Html {
    let expires_at = use_session()
        .and_then(|context| context.state.credentials)
        .map(|credentials| credentials.expires_at_ms());

    html! {
        <p>{ format!("Signed in, session valid until {}", expires_at.unwrap_or_default()) }</p>
    }
}

fn main() {
    init_logging(tracing::Level::INFO);

    let settings = Settings::default();
    match browser_client(&settings) {
        Ok(client) => {
            yew::Renderer::<App>::with_props(AppProps { client, settings }).render();
        }
        Err(err) => tracing::error!(error = %err, "Failed to build API client"),
    }
}
