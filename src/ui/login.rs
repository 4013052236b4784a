/// Login-status widget: one button per provider plus sign-out

use crate::model::{LoginStatus, Provider, ProviderStatus};
use crate::ui::{api_client, redirect_via};
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Clone, Copy, PartialEq)]
enum Destination {
    Login(Provider),
    Logout,
}

fn leave_for(destination: Destination) {
    let client = api_client();
    let target = match destination {
        Destination::Login(provider) => client.login_url(provider),
        Destination::Logout => client.logout_url(),
    };

    if let Err(e) = target.and_then(|url| redirect_via(&url)) {
        log::error!("Failed to leave for {}: {}", destination.describe(), e);
    }
}

impl Destination {
    fn describe(&self) -> String {
        match self {
            Destination::Login(provider) => format!("{} login", provider.label()),
            Destination::Logout => "logout".to_string(),
        }
    }
}

#[function_component(LoginButtons)]
pub fn login_buttons() -> Html {
    let status = use_state(LoginStatus::default);

    {
        let status = status.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match api_client().login_status().await {
                    Ok(loaded) => status.set(loaded),
                    Err(e) => log::warn!("Failed to load login status: {}", e),
                }
            });
            || ()
        });
    }

    let on_logout = Callback::from(|_: MouseEvent| leave_for(Destination::Logout));

    html! {
        <div class="login-buttons">
            {for Provider::ALL.iter().map(|provider| html! {
                <ProviderButton
                    key={provider.slug()}
                    provider={*provider}
                    status={status.provider(*provider).cloned()}
                />
            })}
            if status.any_signed_in() {
                <Button onclick={on_logout} variant={ButtonVariant::Danger}>
                    {"Sign out"}
                </Button>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct ProviderButtonProps {
    provider: Provider,
    #[prop_or_default]
    status: Option<ProviderStatus>,
}

/// Trusted accounts get the highlighted button; other signed-in accounts a warning
fn status_variant(status: &ProviderStatus) -> ButtonVariant {
    if status.is_trusted() {
        ButtonVariant::Primary
    } else {
        ButtonVariant::Warning
    }
}

/// Signed in: shows the account name.
/// Signed out: offers to sign in.
#[function_component(ProviderButton)]
fn provider_button(props: &ProviderButtonProps) -> Html {
    let provider = props.provider;

    match &props.status {
        Some(status) => {
            html! {
                <Button variant={status_variant(status)} disabled={true}>
                    {format!("{} ({})", status.name, provider.label())}
                </Button>
            }
        }
        None => {
            let onclick = Callback::from(move |_: MouseEvent| leave_for(Destination::Login(provider)));

            html! {
                <Button onclick={onclick} variant={ButtonVariant::Secondary}>
                    {format!("Sign in with {}", provider.label())}
                </Button>
            }
        }
    }
}
