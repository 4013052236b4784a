/// Front-end routes under `/app`
use crate::error::Error;
use crate::protocol::LookupRequest;

pub const APP_BASE: &str = "/app";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    ById(u64),
    /// A screen name, a comma-separated batch, or a `prefix*` search
    ByScreenName(String),
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let path = path.strip_prefix(APP_BASE).unwrap_or(path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["tw", "id", id] => id.parse().map(Route::ById).unwrap_or(Route::NotFound),
            ["tw", screen_name] => Route::ByScreenName(screen_name.to_string()),
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home | Route::NotFound => format!("{}/", APP_BASE),
            Route::ById(id) => format!("{}/tw/id/{}", APP_BASE, id),
            Route::ByScreenName(screen_name) => format!("{}/tw/{}", APP_BASE, screen_name),
        }
    }

    pub fn request(&self) -> Option<LookupRequest> {
        match self {
            Route::ById(id) => Some(LookupRequest::by_id(*id)),
            Route::ByScreenName(screen_name) => LookupRequest::by_screen_name(screen_name).ok(),
            Route::Home | Route::NotFound => None,
        }
    }

    /// Route for the screen-name field; empty input is not a search.
    ///
    /// Only screen-name characters plus `,` (batch) and `*` (prefix) are
    /// accepted, so the query can go into a path as it is.
    pub fn from_screen_name_input(text: &str) -> Result<Option<Route>, Error> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let text = text.trim_start_matches('@');
        if !text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ',' | '*'))
        {
            return Err(Error::InvalidQuery(text.to_string()));
        }
        match LookupRequest::by_screen_name(text)? {
            LookupRequest::ByScreenName { screen_name } => Ok(Some(Route::ByScreenName(screen_name))),
            LookupRequest::ById { id } => Ok(Some(Route::ById(id))),
        }
    }

    /// Route for the Twitter id field; empty input is not a search
    pub fn from_id_input(text: &str) -> Result<Option<Route>, Error> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        match LookupRequest::parse_id(text)? {
            LookupRequest::ById { id } => Ok(Some(Route::ById(id))),
            LookupRequest::ByScreenName { screen_name } => Ok(Some(Route::ByScreenName(screen_name))),
        }
    }
}
