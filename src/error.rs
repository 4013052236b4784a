/// Error type shared by the front-end, the relay and the watcher
use wasm_bindgen::JsValue;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("JavaScript error: {0}")]
    Js(String),
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
    #[error("JS bridge conversion error: {0}")]
    Bridge(String),
    #[error("Invalid URL")]
    Url(#[from] url::ParseError),
    #[error("Unexpected HTTP status {0}")]
    Http(u16),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Missing global: {0}")]
    MissingGlobal(&'static str),
}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        Error::Js(format!("{:?}", value))
    }
}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(error: serde_wasm_bindgen::Error) -> Self {
        Error::Bridge(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message() {
        assert_eq!(Error::Http(404).to_string(), "Unexpected HTTP status 404");
    }

    #[test]
    fn test_json_error_conversion() {
        let error: Error = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(matches!(error, Error::Json(_)));
    }
}
