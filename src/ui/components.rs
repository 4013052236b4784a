/// Reusable UI components

use crate::history::history_rows;
use crate::model::Account;
use crate::ui::route::Route;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct AccountHistoryProps {
    pub account: Account,
    #[prop_or_default]
    pub query: Option<String>,
}

/// Table head and body for one account's screen names
#[function_component(AccountHistory)]
pub fn account_history(props: &AccountHistoryProps) -> Html {
    let id = props.account.id_string();
    let title = match &props.query {
        Some(query) => format!("{} ({})", id, query),
        None => id,
    };

    html! {
        <>
            <thead>
                <tr>
                    <th colspan="3">{title}</th>
                </tr>
            </thead>
            <tbody>
                {for history_rows(&props.account.screen_names).into_iter().map(|row| {
                    let href = Route::ByScreenName(row.screen_name.clone()).path();
                    html! {
                        <tr key={row.screen_name.clone()}>
                            <td><a href={href}>{row.screen_name}</a></td>
                            <td>{row.first}</td>
                            <td>{row.last}</td>
                        </tr>
                    }
                })}
            </tbody>
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct MessageProps {
    pub message: String,
}

#[function_component(EmptyResult)]
pub fn empty_result(props: &MessageProps) -> Html {
    html! {
        <p class="message-paragraph">{&props.message}</p>
    }
}
