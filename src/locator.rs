/// Finding profile data and anchors inside the host page.
///
/// The host page exposes no typed API, so everything here is a structural
/// heuristic. The watcher only talks to [`ProfileLocator`], which keeps the
/// selectors swappable without touching rendering.
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use web_sys::{Document, Element};

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z0-9_]{1,15})$").expect("valid handle regex"));

static PROFILE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(\w{1,15})/?$").expect("valid profile path regex"));

/// Top-level routes of the host app that look like profile paths but are not
const RESERVED_PATHS: &[&str] = &[
    "home",
    "explore",
    "notifications",
    "messages",
    "search",
    "settings",
    "compose",
    "login",
    "logout",
    "signup",
    "tos",
    "privacy",
    "i",
];

/// Who the page is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileIdentity {
    pub id: Option<u64>,
    pub screen_name: String,
}

/// Host classes copied onto the injected panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleClasses {
    pub container: Option<String>,
    pub link: Option<String>,
    pub separator: Option<String>,
}

/// Extract the profile from the page's JSON-LD block.
///
/// Older layouts put the person under `author`, newer ones under `mainEntity`.
pub fn parse_ld_json(text: &str) -> Option<ProfileIdentity> {
    let value: Value = serde_json::from_str(text).ok()?;
    let person = value.get("mainEntity").or_else(|| value.get("author"))?;

    let screen_name = person.get("additionalName")?.as_str()?.trim();
    if screen_name.is_empty() {
        return None;
    }

    let id = match person.get("identifier")? {
        Value::String(id) => id.trim().parse::<u64>().ok()?,
        Value::Number(id) => id.as_u64()?,
        _ => return None,
    };

    Some(ProfileIdentity {
        id: Some(id),
        screen_name: screen_name.to_string(),
    })
}

/// `"@jack"` → `"jack"`
pub fn parse_handle(text: &str) -> Option<String> {
    HANDLE_RE
        .captures(text.trim())
        .map(|captures| captures[1].to_string())
}

/// Screen name of a profile URL path such as `/jack`
pub fn screen_name_from_path(path: &str) -> Option<String> {
    let screen_name = PROFILE_PATH_RE.captures(path)?.get(1)?.as_str();

    if RESERVED_PATHS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(screen_name))
    {
        None
    } else {
        Some(screen_name.to_string())
    }
}

/// Structural queries the watcher needs from the host page
pub trait ProfileLocator {
    /// Whether `element` is the metadata block describing the profile
    fn is_metadata(&self, element: &Element) -> bool;

    fn metadata(&self, document: &Document) -> Option<Element>;

    /// Visible `@handle` on profiles without metadata (suspended, missing)
    fn degraded_handle(&self, document: &Document) -> Option<String>;

    /// Element the panel is inserted after
    fn anchor(&self, document: &Document) -> Option<Element>;

    fn style_template(&self, document: &Document) -> Option<StyleClasses>;

    fn identity_from_metadata(&self, element: &Element) -> Option<ProfileIdentity> {
        parse_ld_json(&element.text_content()?)
    }
}

/// Selectors for the twitter.com / x.com profile layout
#[derive(Debug, Clone, Copy, Default)]
pub struct TwitterLocator;

impl TwitterLocator {
    const METADATA: &'static str = "script[type='application/ld+json']";
    const USER_NAME: &'static str = "div[data-testid='UserName']";
    const USER_NAME_SPANS: &'static str = "div[data-testid='UserName'] span";
    const STYLE_LINK: &'static str = "a[href='/i/keyboard_shortcuts']";
}

impl ProfileLocator for TwitterLocator {
    fn is_metadata(&self, element: &Element) -> bool {
        element.tag_name().eq_ignore_ascii_case("script")
            && element.get_attribute("type").as_deref() == Some("application/ld+json")
    }

    fn metadata(&self, document: &Document) -> Option<Element> {
        document.query_selector(Self::METADATA).ok().flatten()
    }

    fn degraded_handle(&self, document: &Document) -> Option<String> {
        let spans = document.query_selector_all(Self::USER_NAME_SPANS).ok()?;

        (0..spans.length())
            .filter_map(|index| spans.get(index))
            .filter_map(|node| node.text_content())
            .find_map(|text| parse_handle(&text))
    }

    fn anchor(&self, document: &Document) -> Option<Element> {
        document.query_selector(Self::USER_NAME).ok().flatten()
    }

    fn style_template(&self, document: &Document) -> Option<StyleClasses> {
        let link = document.query_selector(Self::STYLE_LINK).ok().flatten()?;
        let sibling = link.previous_element_sibling();

        Some(StyleClasses {
            container: sibling.as_ref().and_then(|s| s.get_attribute("class")),
            link: link.get_attribute("class"),
            separator: sibling
                .as_ref()
                .and_then(|s| s.query_selector("span").ok().flatten())
                .and_then(|span| span.get_attribute("class")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ld_json_author() {
        let text = r#"{
            "@context": "http://schema.org",
            "@type": "ProfilePage",
            "author": {
                "@type": "Person",
                "additionalName": "WLMact",
                "identifier": "1470631321496084481"
            }
        }"#;

        assert_eq!(
            parse_ld_json(text),
            Some(ProfileIdentity {
                id: Some(1470631321496084481),
                screen_name: "WLMact".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_ld_json_main_entity() {
        let text = r#"{"mainEntity": {"additionalName": "jack", "identifier": 12}}"#;

        let identity = parse_ld_json(text).unwrap();
        assert_eq!(identity.id, Some(12));
        assert_eq!(identity.screen_name, "jack");
    }

    #[test]
    fn test_parse_ld_json_rejects_incomplete() {
        assert_eq!(parse_ld_json("not json"), None);
        assert_eq!(parse_ld_json(r#"{"author": {"additionalName": "jack"}}"#), None);
        assert_eq!(
            parse_ld_json(r#"{"author": {"additionalName": "", "identifier": "1"}}"#),
            None
        );
        assert_eq!(
            parse_ld_json(r#"{"author": {"additionalName": "jack", "identifier": "abc"}}"#),
            None
        );
    }

    #[test]
    fn test_parse_handle() {
        assert_eq!(parse_handle("@jack"), Some("jack".to_string()));
        assert_eq!(parse_handle("  @Some_User1 "), Some("Some_User1".to_string()));
        assert_eq!(parse_handle("jack"), None);
        assert_eq!(parse_handle("@"), None);
        assert_eq!(parse_handle("@has space"), None);
        assert_eq!(parse_handle("@waytoolongforahandle"), None);
    }

    #[test]
    fn test_screen_name_from_path() {
        assert_eq!(screen_name_from_path("/jack"), Some("jack".to_string()));
        assert_eq!(screen_name_from_path("/jack/"), Some("jack".to_string()));
        assert_eq!(screen_name_from_path("/home"), None);
        assert_eq!(screen_name_from_path("/Explore"), None);
        assert_eq!(screen_name_from_path("/jack/status/20"), None);
        assert_eq!(screen_name_from_path("/"), None);
    }
}
