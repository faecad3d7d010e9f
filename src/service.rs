//! Import entry points that end in a stored set
//!
//! Both the URL path and the pasted-export path converge on the same
//! storage request and the same [`ImportSummary`].

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{FieldLimits, ImporterConfig};
use crate::error::ImportError;
use crate::importer::{Integration, SetImporter};
use crate::parser::parse_export;
use crate::store::{sanitize_field, Censor, NewStudySet, NewTerm, SetStore};
use crate::types::{ImportOptions, ImportSummary, TermPair};

pub const FALLBACK_TITLE: &str = "Imported set";
pub const MIN_EXPORT_TERMS: usize = 2;

pub struct ImportService<S, C> {
    limits: FieldLimits,
    /// One per integration, built up front so HTTP connections are pooled
    importers: Vec<Box<dyn SetImporter>>,
    store: S,
    censor: C,
}

impl<S: SetStore, C: Censor> ImportService<S, C> {
    pub fn new(config: ImporterConfig, store: S, censor: C) -> Result<Self, ImportError> {
        let importers = Integration::ALL
            .iter()
            .map(|integration| integration.importer(&config))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            limits: config.limits,
            importers,
            store,
            censor,
        })
    }

    /// The shared importer for `integration`
    pub fn importer(&self, integration: Integration) -> Result<&dyn SetImporter, ImportError> {
        self.importers
            .iter()
            .find(|importer| importer.integration() == integration)
            .map(|importer| &**importer)
            .ok_or(ImportError::Unsupported {
                integration: integration.name(),
                operation: "url import",
            })
    }

    /// Import a set from a third-party URL and store it for `requester_id`
    pub async fn import_from_url(
        &self,
        integration: Integration,
        url: &str,
        requester_id: &str,
        options: ImportOptions,
        cancel: &CancellationToken,
    ) -> Result<ImportSummary, ImportError> {
        info!(%integration, url, session = options.session, "importing set from url");
        let importer = self.importer(integration)?;
        self.import_with(importer, url, requester_id, options, cancel)
            .await
    }

    /// Same as [`Self::import_from_url`] with an already-built importer
    pub async fn import_with(
        &self,
        importer: &dyn SetImporter,
        url: &str,
        requester_id: &str,
        options: ImportOptions,
        cancel: &CancellationToken,
    ) -> Result<ImportSummary, ImportError> {
        let result = importer.import_from_url(url, cancel).await?;

        let limits = self.limits;
        let mut title = sanitize_field(&result.title, limits.max_title_chars, &self.censor);
        if title.is_empty() {
            title = FALLBACK_TITLE.to_string();
        }

        let created_at = options
            .published_timestamp
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or_else(Utc::now);

        self.save(requester_id, title, created_at, &result.terms, limits)
            .await
    }

    /// Create a set from a pasted plain-text export
    pub async fn import_from_export(
        &self,
        title: &str,
        text: &str,
        requester_id: &str,
    ) -> Result<ImportSummary, ImportError> {
        let limits = self.limits;
        let title = sanitize_field(title, limits.max_title_chars, &self.censor);
        if title.is_empty() {
            return Err(ImportError::Validation("Title is required.".to_string()));
        }

        let terms = parse_export(text);
        if terms.len() < MIN_EXPORT_TERMS {
            return Err(ImportError::Validation(
                "Paste a Quizlet export with at least two terms (tab-separated).".to_string(),
            ));
        }

        info!(terms = terms.len(), "importing set from pasted export");
        self.save(requester_id, title, Utc::now(), &terms, limits)
            .await
    }

    async fn save(
        &self,
        requester_id: &str,
        title: String,
        created_at: DateTime<Utc>,
        terms: &[TermPair],
        limits: FieldLimits,
    ) -> Result<ImportSummary, ImportError> {
        let terms = terms
            .iter()
            .enumerate()
            .map(|(rank, term)| NewTerm {
                word: sanitize_field(&term.word, limits.max_term_chars, &self.censor),
                definition: sanitize_field(&term.definition, limits.max_term_chars, &self.censor),
                rank,
            })
            .collect();

        let created = self
            .store
            .create_set(NewStudySet {
                requester_id: requester_id.to_string(),
                title,
                created_at,
                terms,
            })
            .await
            .map_err(ImportError::Storage)?;

        info!(set_id = %created.id, terms = created.term_count, "stored imported set");
        Ok(ImportSummary {
            created_set_id: created.id,
            title: created.title,
            terms: created.term_count,
        })
    }
}
