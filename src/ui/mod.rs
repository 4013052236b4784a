/// Search front-end
pub mod app;
pub mod components;
pub mod login;
pub mod route;
pub mod search;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::Error;
use route::Route;
use url::Url;

/// Session key holding the path to return to after a login round-trip
pub const REDIRECT_KEY: &str = "redirect";

/// The service sets its session cookie on its own origin, so the front-end
/// always sends credentials.
pub(crate) fn api_client() -> ApiClient {
    ApiClient::with_session(&Config::from_build_env().api_base)
}

fn window() -> Result<web_sys::Window, Error> {
    web_sys::window().ok_or(Error::MissingGlobal("window"))
}

pub(crate) fn navigate(route: &Route) {
    let result = window().and_then(|window| Ok(window.location().set_href(&route.path())?));
    if let Err(e) = result {
        log::error!("Navigation to {:?} failed: {}", route, e);
    }
}

/// Remember the current path, then leave for a login or logout endpoint
pub(crate) fn redirect_via(target: &Url) -> Result<(), Error> {
    let window = window()?;
    let location = window.location();

    if let Some(storage) = window.session_storage()? {
        storage.set_item(REDIRECT_KEY, &location.pathname()?)?;
    }
    location.replace(target.as_str())?;
    Ok(())
}

/// Go back to the path stored before a login round-trip, if any
pub(crate) fn return_after_login() -> Result<(), Error> {
    let window = window()?;
    let Some(storage) = window.session_storage()? else {
        return Ok(());
    };

    if let Some(path) = storage.get_item(REDIRECT_KEY)? {
        storage.remove_item(REDIRECT_KEY)?;

        let location = window.location();
        if location.pathname()? != path {
            log::debug!("Returning to {} after login", path);
            location.replace(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use web_sys::RequestCredentials;

    #[test]
    fn test_front_end_client_sends_session_cookie() {
        assert_eq!(api_client().credentials(), RequestCredentials::Include);
    }
}
