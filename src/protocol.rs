/// Messages exchanged between the content script and the background relay
use crate::error::Error;
use serde::{Deserialize, Serialize};

/// A lookup the content script asks the relay to perform.
///
/// Account ids travel as strings: JS numbers cannot hold every 64-bit id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupRequest {
    ById {
        #[serde(with = "id_string")]
        id: u64,
    },
    ByScreenName {
        screen_name: String,
    },
}

impl LookupRequest {
    pub fn by_id(id: u64) -> LookupRequest {
        LookupRequest::ById { id }
    }

    pub fn by_screen_name(screen_name: &str) -> Result<LookupRequest, Error> {
        let screen_name = screen_name.trim();

        if screen_name.is_empty() || screen_name.contains('/') {
            Err(Error::InvalidQuery(screen_name.to_string()))
        } else {
            Ok(LookupRequest::ByScreenName {
                screen_name: screen_name.to_string(),
            })
        }
    }

    /// Parse a user-typed numeric id
    pub fn parse_id(text: &str) -> Result<LookupRequest, Error> {
        text.trim()
            .parse::<u64>()
            .map(LookupRequest::by_id)
            .map_err(|_| Error::InvalidQuery(text.to_string()))
    }

    /// Path segments below the API base
    pub fn path_segments(&self) -> Vec<String> {
        match self {
            LookupRequest::ById { id } => vec!["tw".to_string(), "id".to_string(), id.to_string()],
            LookupRequest::ByScreenName { screen_name } => {
                vec!["tw".to_string(), screen_name.clone()]
            }
        }
    }
}

/// The relay's answer: the remote JSON text, untouched, or an error message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LookupResponse {
    pub fn success(body: String) -> LookupResponse {
        LookupResponse {
            body: Some(body),
            error: None,
        }
    }

    pub fn failure(error: &Error) -> LookupResponse {
        LookupResponse {
            body: None,
            error: Some(error.to_string()),
        }
    }

    pub fn into_result(self) -> Result<String, Error> {
        match (self.body, self.error) {
            (Some(body), None) => Ok(body),
            (_, Some(error)) => Err(Error::Js(error)),
            (None, None) => Err(Error::Js("empty relay response".to_string())),
        }
    }
}

/// Serialize a `u64` as a decimal string, accepting either form on input
mod id_string {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(id: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text.parse().map_err(D::Error::custom),
            RawId::Number(id) => Ok(id),
        }
    }
}
