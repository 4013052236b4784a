/// Extension message relay between content scripts and the background worker
use crate::api::ApiClient;
use crate::error::Error;
use crate::protocol::{LookupRequest, LookupResponse};
use js_sys::Promise;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

// Import JS bridge functions
#[wasm_bindgen(module = "/extension.js")]
extern "C" {
    fn addLookupListener(handler: &Closure<dyn FnMut(JsValue) -> Promise>);

    #[wasm_bindgen(catch)]
    async fn sendLookup(request: JsValue) -> Result<JsValue, JsValue>;
}

pub type LookupFuture = Pin<Box<dyn Future<Output = Result<String, Error>>>>;

/// Where the watcher sends lookups; resolves to the raw JSON body
pub trait LookupTransport {
    fn lookup(&self, request: LookupRequest) -> LookupFuture;
}

/// Content-script side: forwards lookups to the background worker
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeRelay;

impl LookupTransport for RuntimeRelay {
    fn lookup(&self, request: LookupRequest) -> LookupFuture {
        Box::pin(async move {
            let message = serde_wasm_bindgen::to_value(&request)?;
            let reply = sendLookup(message).await?;
            let response: LookupResponse = serde_wasm_bindgen::from_value(reply)?;
            response.into_result()
        })
    }
}

/// Background side: answer every lookup message through `client`.
///
/// The listener never rejects; failures travel back as `LookupResponse::failure`.
pub fn start_background(client: ApiClient) {
    let client = Rc::new(client);

    let handler = Closure::<dyn FnMut(JsValue) -> Promise>::new(move |message: JsValue| {
        let client = client.clone();

        future_to_promise(async move {
            let response = match handle_message(&client, message).await {
                Ok(body) => LookupResponse::success(body),
                Err(e) => {
                    log::warn!("Lookup failed: {}", e);
                    LookupResponse::failure(&e)
                }
            };

            serde_wasm_bindgen::to_value(&response).map_err(JsValue::from)
        })
    });

    addLookupListener(&handler);
    // The listener lives as long as the worker.
    handler.forget();
    log::info!("Background relay listening");
}

async fn handle_message(client: &ApiClient, message: JsValue) -> Result<String, Error> {
    let request: LookupRequest = serde_wasm_bindgen::from_value(message)?;
    client.lookup(&request).await
}
