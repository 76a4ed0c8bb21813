//! Authentication guard component for protected routes

use crate::context::use_session;
use crate::hooks::use_auth_gate;
use railo_core::GateOptions;
use yew::prelude::*;

/// RequireAuth component props
#[derive(Properties, PartialEq)]
pub struct RequireAuthProps {
    /// Page to return to after logging in
    #[prop_or_default]
    pub redirect_path: Option<AttrValue>,
    /// Login page; defaults to the provider's login page
    #[prop_or_default]
    pub redirect_to: Option<AttrValue>,
    pub children: Children,
}

/// Renders its children only for an authenticated session
#[function_component(RequireAuth)]
pub fn require_auth(props: &RequireAuthProps) -> Html {
    let mut options = use_session().map_or_else(GateOptions::default, |context| context.gate);
    if let Some(target) = &props.redirect_to {
        options = options.redirect_to(target.as_str());
    }
    if let Some(path) = &props.redirect_path {
        options = options.redirect_path(path.as_str());
    }
    let status = use_auth_gate(options);

    // Show loading state
    if status.is_checking {
        return html! {
            <div class="flex flex-col items-center justify-center min-h-screen">
                <div class="w-10 h-10 border-4 border-gray-200 border-t-blue-500 rounded-full animate-spin mb-4"></div>
                <p class="text-gray-600">{"Checking login status..."}</p>
            </div>
        };
    }

    if status.is_authenticated {
        return html! { <>{ props.children.clone() }</> };
    }

    // Redirect is under way
    Html::default()
}
