/// Search form and results table

use crate::model::LookupResult;
use crate::protocol::LookupRequest;
use crate::ui::components::{AccountHistory, EmptyResult};
use crate::ui::route::Route;
use crate::ui::{api_client, navigate};
use patternfly_yew::prelude::*;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[function_component(SearchForm)]
pub fn search_form() -> Html {
    let screen_name = use_state(String::new);
    let twitter_id = use_state(String::new);
    let error = use_state(|| None::<String>);

    let on_screen_name_input = {
        let screen_name = screen_name.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                screen_name.set(input.value());
            }
        })
    };

    let on_twitter_id_input = {
        let twitter_id = twitter_id.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                twitter_id.set(input.value());
            }
        })
    };

    let on_screen_name_search = {
        let screen_name = screen_name.clone();
        let error = error.clone();
        Callback::from(move |_: MouseEvent| {
            match Route::from_screen_name_input(&screen_name) {
                Ok(Some(route)) => navigate(&route),
                Ok(None) => {}
                Err(e) => error.set(Some(e.to_string())),
            }
        })
    };

    let on_twitter_id_search = {
        let twitter_id = twitter_id.clone();
        let error = error.clone();
        Callback::from(move |_: MouseEvent| {
            match Route::from_id_input(&twitter_id) {
                Ok(Some(route)) => navigate(&route),
                Ok(None) => {}
                Err(e) => error.set(Some(e.to_string())),
            }
        })
    };

    html! {
        <div class="flex-column-gap">
            if let Some(message) = (*error).clone() {
                <Alert r#type={AlertType::Warning} title={message} inline={true}>
                </Alert>
            }
            <div class="search-field">
                <input
                    type="search"
                    class="pf-v5-c-form-control"
                    placeholder="Screen name"
                    value={(*screen_name).clone()}
                    oninput={on_screen_name_input}
                />
                <Button onclick={on_screen_name_search} variant={ButtonVariant::Primary}>
                    {"Search"}
                </Button>
            </div>
            <div class="search-field">
                <input
                    type="search"
                    class="pf-v5-c-form-control"
                    placeholder="Twitter ID"
                    value={(*twitter_id).clone()}
                    oninput={on_twitter_id_input}
                />
                <Button onclick={on_twitter_id_search} variant={ButtonVariant::Primary}>
                    {"Search"}
                </Button>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SearchResultsProps {
    pub request: LookupRequest,
}

#[derive(Clone, PartialEq)]
enum SearchState {
    Loading,
    Loaded(Rc<LookupResult>),
    Failed,
}

/// One lookup per distinct request; failures are logged and render nothing
#[function_component(SearchResults)]
pub fn search_results(props: &SearchResultsProps) -> Html {
    let state = use_state(|| SearchState::Loading);

    {
        let state = state.clone();
        use_effect_with(props.request.clone(), move |request| {
            let request = request.clone();
            state.set(SearchState::Loading);

            spawn_local(async move {
                match api_client().lookup_result(&request).await {
                    Ok(result) => state.set(SearchState::Loaded(Rc::new(result))),
                    Err(e) => {
                        log::error!("Search for {:?} failed: {}", request, e);
                        state.set(SearchState::Failed);
                    }
                }
            });
            || ()
        });
    }

    match &*state {
        SearchState::Loading => html! {
            <div class="loading-text-center">
                <Spinner />
            </div>
        },
        SearchState::Failed => html! {},
        SearchState::Loaded(result) if result.is_empty() => html! {
            <EmptyResult message={"No accounts found".to_string()} />
        },
        SearchState::Loaded(result) => html! {
            <table class="pf-v5-c-table pf-m-grid-md results-table">
                {for result.entries().into_iter().map(|(query, account)| {
                    let key = format!("{}-{}", account.id, query.unwrap_or_default());
                    html! {
                        <AccountHistory
                            key={key}
                            account={account.clone()}
                            query={query.map(str::to_string)}
                        />
                    }
                })}
            </table>
        },
    }
}
