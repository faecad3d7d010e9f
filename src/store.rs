//! Interfaces to the storage and text-sanitization collaborators

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;

/// Request to persist a new study set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudySet {
    pub requester_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub terms: Vec<NewTerm>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTerm {
    pub word: String,
    pub definition: String,
    pub rank: usize,
}

/// What the store hands back after creating a set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSet {
    pub id: String,
    pub title: String,
    pub term_count: usize,
}

#[async_trait]
pub trait SetStore: Send + Sync {
    async fn create_set(&self, set: NewStudySet) -> Result<CreatedSet, StoreError>;
}

/// Text transform applied to every stored field
pub trait Censor: Send + Sync {
    fn censor(&self, text: &str) -> String;
}

impl<F> Censor for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn censor(&self, text: &str) -> String {
        self(text)
    }
}

/// Censor that leaves text untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Censor for PassThrough {
    fn censor(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Cap `text` at `max_chars` characters, censor it, then trim
pub fn sanitize_field(text: &str, max_chars: usize, censor: &dyn Censor) -> String {
    let capped = match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    };
    censor.censor(capped).trim().to_string()
}
