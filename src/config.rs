//! Process configuration
//!
//! Built once at startup and handed to the fetcher and importer. Nothing in
//! the crate reads the environment after this point.

use std::env;
use std::time::Duration;

use reqwest::header::HeaderValue;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_SITE_ORIGIN: &str = "https://quizlet.com";

#[derive(Debug, Clone, Default)]
pub struct ImporterConfig {
    pub fetch: FetchConfig,
    pub heuristics: Heuristics,
    pub limits: FieldLimits,
}

impl ImporterConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values are treated the same as unset ones
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut fetch = FetchConfig {
            proxy: get("QUIZLET_IMPORT_PROXY"),
            cookie: get("QUIZLET_COOKIE")
                .map(|v| header_value("QUIZLET_COOKIE", v))
                .transpose()?,
            clearance: get("QUIZLET_CF_CLEARANCE")
                .map(|v| header_value("QUIZLET_CF_CLEARANCE", v))
                .transpose()?,
            ..FetchConfig::default()
        };
        if let Some(ua) = get("QUIZLET_IMPORT_USER_AGENT") {
            fetch.user_agent = header_value("QUIZLET_IMPORT_USER_AGENT", ua)?;
        }
        if let Some(origin) = get("QUIZLET_SITE_ORIGIN") {
            fetch.site_origin = Url::parse(&origin).map_err(|_| ConfigError::InvalidValue {
                name: "QUIZLET_SITE_ORIGIN",
                value: origin.clone(),
            })?;
        }
        if let Some(secs) = get("QUIZLET_IMPORT_TIMEOUT_SECS") {
            fetch.timeout = Duration::from_secs(parse_number("QUIZLET_IMPORT_TIMEOUT_SECS", &secs)?);
        }

        let heuristics = match get("QUIZLET_IMPORT_HEURISTICS") {
            Some(path) => Heuristics::from_file(&path)?,
            None => Heuristics::default(),
        };

        let mut limits = FieldLimits::default();
        if let Some(v) = get("IMPORT_MAX_TERM_CHARS") {
            limits.max_term_chars = parse_number("IMPORT_MAX_TERM_CHARS", &v)?;
        }
        if let Some(v) = get("IMPORT_MAX_TITLE_CHARS") {
            limits.max_title_chars = parse_number("IMPORT_MAX_TITLE_CHARS", &v)?;
        }

        Ok(Self {
            fetch,
            heuristics,
            limits,
        })
    }
}

/// Values sent as request headers must be valid header text
fn header_value(name: &'static str, value: String) -> Result<String, ConfigError> {
    match HeaderValue::from_str(&value) {
        Ok(_) => Ok(value),
        Err(_) => Err(ConfigError::InvalidValue { name, value }),
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

/// Outbound request settings
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Either a template containing `{url}` or a plain prefix
    pub proxy: Option<String>,
    /// Full cookie header, sent verbatim
    pub cookie: Option<String>,
    /// Challenge clearance token, sent as `cf_clearance=<token>`
    pub clearance: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
    /// Scheme and host of the canonical set URL
    pub site_origin: Url,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            cookie: None,
            clearance: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            site_origin: Url::parse(DEFAULT_SITE_ORIGIN).unwrap(),
        }
    }
}

/// Per-field character caps applied before censoring
#[derive(Debug, Clone, Copy)]
pub struct FieldLimits {
    pub max_term_chars: usize,
    pub max_title_chars: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            max_term_chars: 1000,
            max_title_chars: 255,
        }
    }
}

/// Site-specific markers and field aliases
///
/// These drift whenever the site changes its markup, so they can be
/// replaced from a JSON file without rebuilding. Missing keys keep their
/// defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Lowercase substrings that identify a challenge page
    pub challenge_markers: Vec<String>,
    /// `id` of the hydration-data script tag
    pub hydration_script_id: String,
    /// Text preceding the inline page-data object
    pub page_data_marker: String,
    /// Object fields that may hold a set's term collection
    pub term_collection_fields: Vec<String>,
    pub word_fields: Vec<String>,
    pub word_rich_fields: Vec<String>,
    pub definition_fields: Vec<String>,
    pub definition_rich_fields: Vec<String>,
    pub word_side_labels: Vec<String>,
    pub definition_side_labels: Vec<String>,
    /// Fields tried, in order, when pulling text out of a rich object
    pub text_fields: Vec<String>,
    pub max_text_depth: usize,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            challenge_markers: strings(&[
                "cf-mitigated",
                "just a moment",
                "challenge-platform",
                "captcha",
            ]),
            hydration_script_id: "__NEXT_DATA__".to_string(),
            page_data_marker: "Quizlet.setPageData".to_string(),
            term_collection_fields: strings(&[
                "terms",
                "studiableItems",
                "studiableItemData",
                "termIdToTerm",
                "items",
            ]),
            word_fields: strings(&["term", "word", "front", "question"]),
            word_rich_fields: strings(&["wordRichText", "termText"]),
            definition_fields: strings(&["definition", "back", "answer"]),
            definition_rich_fields: strings(&["definitionRichText", "definitionText"]),
            word_side_labels: strings(&["word", "term", "front"]),
            definition_side_labels: strings(&["definition", "back"]),
            text_fields: strings(&[
                "plainText",
                "text",
                "content",
                "value",
                "term",
                "word",
                "definition",
            ]),
            max_text_depth: 8,
        }
    }
}

impl Heuristics {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::HeuristicsRead {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::HeuristicsParse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let mut heuristics: Self = serde_json::from_str(raw)?;
        // Challenge detection compares against a lowercased body
        for marker in &mut heuristics.challenge_markers {
            *marker = marker.to_lowercase();
        }
        Ok(heuristics)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
