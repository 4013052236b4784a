/// Data structures returned by the memory.lol lookup service
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Observation dates for one screen name: `[first]` or `[first, last]`
pub type Dates = Option<Vec<NaiveDate>>;

/// An account and its screen-name history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_str: Option<String>,
    #[serde(rename = "screen-names", alias = "screen_names")]
    pub screen_names: IndexMap<String, Dates>,
}

impl Account {
    /// Stable display form of the id, preferring the service's string form
    pub fn id_string(&self) -> String {
        self.id_str.clone().unwrap_or_else(|| self.id.to_string())
    }

    pub fn has_screen_name(&self, screen_name: &str) -> bool {
        let target = screen_name.to_lowercase();
        self.screen_names
            .keys()
            .any(|screen_name| screen_name.to_lowercase() == target)
    }

    /// Whether `screen_name` is the last one the service saw for this account
    pub fn is_latest_screen_name(&self, screen_name: &str) -> bool {
        self.screen_names
            .last()
            .is_some_and(|(latest, _)| latest.eq_ignore_ascii_case(screen_name))
    }
}

/// Accounts matching a single screen-name query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenNameResult {
    pub accounts: Vec<Account>,
}

/// The three shapes a lookup can answer with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupResult {
    Account(Account),
    Accounts(ScreenNameResult),
    Batch(IndexMap<String, ScreenNameResult>),
}

impl LookupResult {
    /// Parse a raw response body; parsing from text keeps 64-bit ids exact
    pub fn from_json(body: &str) -> Result<LookupResult, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Flatten any shape into `(query, account)` pairs in response order
    pub fn entries(&self) -> Vec<(Option<&str>, &Account)> {
        match self {
            LookupResult::Account(account) => vec![(None, account)],
            LookupResult::Accounts(result) => {
                result.accounts.iter().map(|account| (None, account)).collect()
            }
            LookupResult::Batch(results) => results
                .iter()
                .flat_map(|(query, result)| {
                    result
                        .accounts
                        .iter()
                        .map(move |account| (Some(query.as_str()), account))
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Login providers supported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GitHub,
    Google,
    Twitter,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::GitHub, Provider::Google, Provider::Twitter];

    /// Path segment used by `/login/{provider}`
    pub fn slug(self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::Google => "google",
            Provider::Twitter => "twitter",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Provider::GitHub => "GitHub",
            Provider::Google => "Google",
            Provider::Twitter => "Twitter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub access: Vec<String>,
}

impl ProviderStatus {
    pub fn is_trusted(&self) -> bool {
        self.access.iter().any(|level| level == "trusted")
    }
}

/// Answer of `GET /login/status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginStatus {
    #[serde(default)]
    pub github: Option<ProviderStatus>,
    #[serde(default)]
    pub google: Option<ProviderStatus>,
    #[serde(default)]
    pub twitter: Option<ProviderStatus>,
}

impl LoginStatus {
    pub fn provider(&self, provider: Provider) -> Option<&ProviderStatus> {
        match provider {
            Provider::GitHub => self.github.as_ref(),
            Provider::Google => self.google.as_ref(),
            Provider::Twitter => self.twitter.as_ref(),
        }
    }

    pub fn any_signed_in(&self) -> bool {
        Provider::ALL
            .iter()
            .any(|provider| self.provider(*provider).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT_JSON: &str = r#"{
        "id": 1470631321496084481,
        "screen-names": {
            "i_am_not_a_nazi": ["2022-05-19", "2022-06-08"],
            "WLMact": ["2022-06-10"],
            "ghost": null
        }
    }"#;

    #[test]
    fn test_parse_single_account() {
        let result = LookupResult::from_json(ACCOUNT_JSON).unwrap();

        match result {
            LookupResult::Account(account) => {
                assert_eq!(account.id, 1470631321496084481);
                let names: Vec<&str> = account.screen_names.keys().map(|s| s.as_str()).collect();
                assert_eq!(names, vec!["i_am_not_a_nazi", "WLMact", "ghost"]);
                assert_eq!(
                    account.screen_names["WLMact"],
                    Some(vec![NaiveDate::from_ymd_opt(2022, 6, 10).unwrap()])
                );
                assert_eq!(account.screen_names["ghost"], None);
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn test_parse_underscore_alias_and_id_str() {
        let json = r#"{"id": 12, "id_str": "12", "screen_names": {"a": null}}"#;
        let result = LookupResult::from_json(json).unwrap();

        match result {
            LookupResult::Account(account) => assert_eq!(account.id_string(), "12"),
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn test_parse_accounts() {
        let json = format!(r#"{{"accounts": [{}]}}"#, ACCOUNT_JSON);
        let result = LookupResult::from_json(&json).unwrap();

        assert!(matches!(result, LookupResult::Accounts(ref r) if r.accounts.len() == 1));
        assert_eq!(result.entries()[0].0, None);
    }

    #[test]
    fn test_parse_batch() {
        let json = format!(
            r#"{{"wlmact": {{"accounts": [{}]}}, "nobody": {{"accounts": []}}}}"#,
            ACCOUNT_JSON
        );
        let result = LookupResult::from_json(&json).unwrap();

        let entries = result.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, Some("wlmact"));
        assert_eq!(entries[0].1.id, 1470631321496084481);
    }

    #[test]
    fn test_empty_batch() {
        let result = LookupResult::from_json("{}").unwrap();
        assert!(matches!(result, LookupResult::Batch(_)));
        assert!(result.is_empty());
    }

    #[test]
    fn test_reject_other_shapes() {
        assert!(LookupResult::from_json("[1, 2, 3]").is_err());
        assert!(LookupResult::from_json(r#"{"id": "nope"}"#).is_err());
    }

    #[test]
    fn test_screen_name_matching_case_insensitive() {
        let account: Account = serde_json::from_str(ACCOUNT_JSON).unwrap();

        assert!(account.has_screen_name("wlmACT"));
        assert!(!account.is_latest_screen_name("wlmACT"));
        assert!(account.is_latest_screen_name("GHOST"));
        assert!(!account.has_screen_name("someone_else"));
    }

    #[test]
    fn test_login_status() {
        let json = r#"{
            "github": {"id": "1", "name": "octo", "access": ["trusted", "gist"]},
            "google": null,
            "twitter": {"id": "2", "name": "bird", "access": []}
        }"#;
        let status: LoginStatus = serde_json::from_str(json).unwrap();

        assert!(status.any_signed_in());
        assert!(status.provider(Provider::GitHub).unwrap().is_trusted());
        assert!(status.provider(Provider::Google).is_none());
        assert!(!status.provider(Provider::Twitter).unwrap().is_trusted());
    }

    #[test]
    fn test_login_status_signed_out() {
        let status: LoginStatus = serde_json::from_str("{}").unwrap();
        assert!(!status.any_signed_in());
    }
}
