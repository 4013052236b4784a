/// Front-end page for memory.lol

use crate::ui::login::LoginButtons;
use crate::ui::return_after_login;
use crate::ui::route::Route;
use crate::ui::search::{SearchForm, SearchResults};
use yew::prelude::*;

fn current_route() -> Route {
    web_sys::window()
        .and_then(|window| window.location().pathname().ok())
        .map(|path| Route::parse(&path))
        .unwrap_or(Route::Home)
}

#[function_component(App)]
pub fn app() -> Html {
    let route = use_memo((), |_| current_route());

    // Finish a login round-trip before anything else renders
    use_effect_with((), |_| {
        if let Err(e) = return_after_login() {
            log::warn!("Post-login redirect failed: {}", e);
        }
        || ()
    });

    html! {
        <div class="padding-20">
            <nav class="app-navbar">
                <a class="app-brand" href="https://memory.lol/">
                    <img alt="memory.lol" src="/app/logos/dumpster.svg" />
                </a>
                <a href={Route::Home.path()}>{"Home"}</a>
                <a href="https://github.com/travisbrown/memory.lol">{"About"}</a>
                <LoginButtons />
            </nav>

            <section class="app-section">
                <h2 class="section-title">{"Welcome to memory.lol"}</h2>
                <p>
                    {"Search results are limited for unauthenticated users. "}
                    {"Signing in with a trusted account removes the limit."}
                </p>
            </section>

            <section class="app-section">
                <h2 class="section-title">{"Twitter history search"}</h2>
                <SearchForm />
            </section>

            {match route.request() {
                Some(request) => html! { <SearchResults request={request} /> },
                None if *route == Route::NotFound => html! {
                    <p class="message-paragraph">{"Unknown page"}</p>
                },
                None => html! {},
            }}
        </div>
    }
}
