/// HTTP access to the memory.lol service
use crate::error::Error;
use crate::model::{LoginStatus, LookupResult, Provider};
use crate::protocol::LookupRequest;
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCredentials, RequestInit, Response, Window, WorkerGlobalScope};

#[derive(Debug, Clone, PartialEq)]
pub struct ApiClient {
    base: Url,
    credentials: RequestCredentials,
}

impl ApiClient {
    /// A client that sends no cookies to another origin
    pub fn new(base: &Url) -> ApiClient {
        ApiClient {
            base: base.clone(),
            credentials: RequestCredentials::SameOrigin,
        }
    }

    /// A client that sends the session cookie along, even when the service
    /// lives on another origin than the page.
    pub fn with_session(base: &Url) -> ApiClient {
        ApiClient {
            base: base.clone(),
            credentials: RequestCredentials::Include,
        }
    }

    pub fn credentials(&self) -> RequestCredentials {
        self.credentials
    }

    fn url_for<I, S>(&self, segments: I) -> Result<Url, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidQuery(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn lookup_url(&self, request: &LookupRequest) -> Result<Url, Error> {
        self.url_for(request.path_segments())
    }

    pub fn login_status_url(&self) -> Result<Url, Error> {
        self.url_for(["login", "status"])
    }

    pub fn login_url(&self, provider: Provider) -> Result<Url, Error> {
        self.url_for(["login", provider.slug()])
    }

    pub fn logout_url(&self) -> Result<Url, Error> {
        self.url_for(["logout"])
    }

    /// Raw JSON text of a lookup
    pub async fn lookup(&self, request: &LookupRequest) -> Result<String, Error> {
        let url = self.lookup_url(request)?;
        log::debug!("Looking up {}", url);
        fetch_text(&url, self.credentials).await
    }

    pub async fn lookup_result(&self, request: &LookupRequest) -> Result<LookupResult, Error> {
        let body = self.lookup(request).await?;
        Ok(LookupResult::from_json(&body)?)
    }

    pub async fn login_status(&self) -> Result<LoginStatus, Error> {
        let body = fetch_text(&self.login_status_url()?, self.credentials).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// GET `url` and return the body as text.
///
/// Works from a page (`Window`) and from an extension service worker.
async fn fetch_text(url: &Url, credentials: RequestCredentials) -> Result<String, Error> {
    let init = RequestInit::new();
    init.set_method("GET");
    init.set_credentials(credentials);

    let request = Request::new_with_str_and_init(url.as_str(), &init)?;
    request.headers().set("Accept", "application/json")?;

    let global = js_sys::global();
    let promise = if let Some(window) = global.dyn_ref::<Window>() {
        window.fetch_with_request(&request)
    } else if let Some(scope) = global.dyn_ref::<WorkerGlobalScope>() {
        scope.fetch_with_request(&request)
    } else {
        return Err(Error::MissingGlobal("fetch"));
    };

    let response: Response = JsFuture::from(promise).await?.dyn_into()?;
    if !response.ok() {
        return Err(Error::Http(response.status()));
    }

    JsFuture::from(response.text()?)
        .await?
        .as_string()
        .ok_or_else(|| Error::Js("response body is not text".to_string()))
}
