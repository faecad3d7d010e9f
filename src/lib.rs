//! Flashcard set importer
//!
//! Builds (term, definition) lists from external sources:
//! - Quizlet set pages (hydration JSON or inline page data, searched heuristically)
//! - Pasted plain-text exports (tab, whitespace-run or dash separated)

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod importer;
pub mod locator;
pub mod parser;
pub mod service;
pub mod store;
pub mod types;

pub use config::{FetchConfig, FieldLimits, Heuristics, ImporterConfig};
pub use error::{ConfigError, ImportError, StoreError};
pub use extract::extract_best;
pub use fetch::Fetcher;
pub use importer::{parse_set_page, Integration, QuizletImporter, SetImporter};
pub use locator::locate_json_blocks;
pub use parser::{parse_count, parse_export, split_line};
pub use service::ImportService;
pub use store::{Censor, CreatedSet, NewStudySet, NewTerm, PassThrough, SetStore};
pub use types::{FetchOutcome, ImportOptions, ImportResult, ImportSummary, TermPair};
