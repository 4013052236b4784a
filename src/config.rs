/// Build-time configuration for the front-end and the extension
use log::Level;
use std::str::FromStr;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.memory.lol/v1/";
pub const DEFAULT_ARCHIVE_BASE: &str = "https://web.archive.org/";
pub const DEFAULT_LOG_LEVEL: Level = Level::Info;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: Url,
    pub archive_base: Url,
    pub log_level: Level,
}

impl Config {
    /// Configuration baked in at compile time through `MEMORY_LOL_*` variables
    pub fn from_build_env() -> Config {
        Config::from_values(
            option_env!("MEMORY_LOL_API_BASE"),
            option_env!("MEMORY_LOL_ARCHIVE_BASE"),
            option_env!("MEMORY_LOL_LOG"),
        )
    }

    /// Invalid values fall back to the defaults.
    pub fn from_values(
        api_base: Option<&str>,
        archive_base: Option<&str>,
        log_level: Option<&str>,
    ) -> Config {
        Config {
            api_base: parse_base(api_base, DEFAULT_API_BASE),
            archive_base: parse_base(archive_base, DEFAULT_ARCHIVE_BASE),
            log_level: log_level
                .and_then(|value| Level::from_str(value).ok())
                .unwrap_or(DEFAULT_LOG_LEVEL),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::from_values(None, None, None)
    }
}

/// Parse a base URL, forcing a trailing slash so joins keep the path prefix
fn parse_base(value: Option<&str>, default: &str) -> Url {
    let candidate = value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            if value.ends_with('/') {
                value.to_string()
            } else {
                format!("{}/", value)
            }
        });

    match candidate.as_deref().map(Url::parse) {
        Some(Ok(url)) if !url.cannot_be_a_base() => url,
        Some(_) => {
            log::warn!("Ignoring invalid base URL {:?}, using {}", value, default);
            default_url(default)
        }
        None => default_url(default),
    }
}

fn default_url(default: &str) -> Url {
    Url::parse(default).expect("default base URLs are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.api_base.as_str(), DEFAULT_API_BASE);
        assert_eq!(config.archive_base.as_str(), DEFAULT_ARCHIVE_BASE);
        assert_eq!(config.log_level, Level::Info);
    }

    #[test]
    fn test_trailing_slash_added() {
        let config = Config::from_values(Some("http://127.0.0.1:8000/v1"), None, None);

        assert_eq!(config.api_base.as_str(), "http://127.0.0.1:8000/v1/");
        assert_eq!(
            config.api_base.join("tw/id/1").unwrap().as_str(),
            "http://127.0.0.1:8000/v1/tw/id/1"
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_values(Some("not a url"), Some(""), Some("loud"));

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_log_level() {
        let config = Config::from_values(None, None, Some("debug"));
        assert_eq!(config.log_level, Level::Debug);
    }
}
