//! URL import orchestration
//!
//! Validates the set URL, fetches the canonical page, locates the embedded
//! JSON blocks and keeps the best extraction across them.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::config::{Heuristics, ImporterConfig};
use crate::error::ImportError;
use crate::extract::extract_best;
use crate::fetch::Fetcher;
use crate::locator::locate_json_blocks;
use crate::types::{FetchOutcome, ImportResult};

static QUIZLET_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)quizlet\.com/(\d+)").unwrap());

/// External sources sets can be imported from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integration {
    Quizlet,
}

impl Integration {
    pub const ALL: [Integration; 1] = [Integration::Quizlet];

    pub fn name(self) -> &'static str {
        match self {
            Integration::Quizlet => "Quizlet",
        }
    }

    /// Build the importer for this source
    pub fn importer(self, config: &ImporterConfig) -> Result<Box<dyn SetImporter>, ImportError> {
        match self {
            Integration::Quizlet => Ok(Box::new(QuizletImporter::new(config)?)),
        }
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Integration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quizlet" => Ok(Integration::Quizlet),
            other => Err(format!("unknown integration: {other}")),
        }
    }
}

/// Operations an integration can offer
#[async_trait]
pub trait SetImporter: Send + Sync {
    fn integration(&self) -> Integration;

    /// Import a single set from its public URL
    async fn import_from_url(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ImportResult, ImportError>;

    /// Import every set published by a profile
    async fn import_profile(
        &self,
        profile_url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ImportResult>, ImportError>;
}

pub struct QuizletImporter {
    fetcher: Fetcher,
    heuristics: Heuristics,
    site_origin: Url,
}

impl QuizletImporter {
    pub fn new(config: &ImporterConfig) -> Result<Self, ImportError> {
        Ok(Self {
            fetcher: Fetcher::new(&config.fetch, &config.heuristics.challenge_markers)?,
            heuristics: config.heuristics.clone(),
            site_origin: config.fetch.site_origin.clone(),
        })
    }
}

#[async_trait]
impl SetImporter for QuizletImporter {
    fn integration(&self) -> Integration {
        Integration::Quizlet
    }

    async fn import_from_url(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ImportResult, ImportError> {
        let id = extract_set_id(url).ok_or(ImportError::InvalidUrl)?;
        let target = canonical_set_url(&self.site_origin, id)?;

        let html = match self.fetcher.fetch_html(target.as_str(), cancel).await? {
            FetchOutcome::Success { html, .. } => html,
            FetchOutcome::Blocked { status, .. } => return Err(ImportError::Blocked { status }),
            FetchOutcome::HttpError { status } => return Err(ImportError::Http { status }),
        };

        let result = parse_set_page(&html, &self.heuristics);
        if result.terms.is_empty() {
            return Err(ImportError::Unparsable);
        }
        debug!(set_id = id, terms = result.terms.len(), "extracted set");
        Ok(result)
    }

    async fn import_profile(
        &self,
        _profile_url: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<ImportResult>, ImportError> {
        Err(ImportError::Unsupported {
            integration: Integration::Quizlet.name(),
            operation: "profile import",
        })
    }
}

/// Numeric set id in a Quizlet URL
pub fn extract_set_id(url: &str) -> Option<&str> {
    QUIZLET_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `<origin>/<id>`, whatever variant of the set URL was supplied
pub fn canonical_set_url(origin: &Url, id: &str) -> Result<Url, ImportError> {
    origin.join(id).map_err(|_| ImportError::InvalidUrl)
}

/// Best extraction across all candidate blocks in a set page
///
/// A later block only wins with strictly more terms.
pub fn parse_set_page(html: &str, heuristics: &Heuristics) -> ImportResult {
    let mut best = ImportResult::default();
    for (index, block) in locate_json_blocks(html, heuristics).iter().enumerate() {
        let candidate = extract_best(block, heuristics);
        debug!(index, terms = candidate.terms.len(), "evaluated candidate block");
        if candidate.terms.len() > best.terms.len() {
            best = candidate;
        }
    }
    best
}
