use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use flashcard_import::{
    CreatedSet, ImportError, ImportOptions, ImportService, ImporterConfig, Integration,
    NewStudySet, PassThrough, SetStore, StoreError,
};
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone, Default)]
struct MemoryStore {
    sets: Arc<Mutex<Vec<NewStudySet>>>,
}

impl MemoryStore {
    fn saved(&self) -> Vec<NewStudySet> {
        self.sets.lock().unwrap().clone()
    }
}

#[async_trait]
impl SetStore for MemoryStore {
    async fn create_set(&self, set: NewStudySet) -> Result<CreatedSet, StoreError> {
        let mut sets = self.sets.lock().unwrap();
        let created = CreatedSet {
            id: format!("set-{}", sets.len() + 1),
            title: set.title.clone(),
            term_count: set.terms.len(),
        };
        sets.push(set);
        Ok(created)
    }
}

struct FailingStore;

#[async_trait]
impl SetStore for FailingStore {
    async fn create_set(&self, _set: NewStudySet) -> Result<CreatedSet, StoreError> {
        Err("database unavailable".into())
    }
}

fn config_for(server: &MockServer) -> ImporterConfig {
    let mut config = ImporterConfig::default();
    config.fetch.site_origin = Url::parse(&server.uri()).unwrap();
    config
}

async fn serve_set(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/555"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_url_import_stores_ranked_terms_with_fallback_title() {
    let server = serve_set(
        r#"<script id="__NEXT_DATA__" type="application/json">
        {"props":{"terms":[{"term":"one","definition":"uno"},{"term":"two","definition":"dos"}]}}
        </script>"#,
    )
    .await;
    let store = MemoryStore::default();
    let service = ImportService::new(config_for(&server), store.clone(), PassThrough).unwrap();

    let options = ImportOptions {
        session: false,
        published_timestamp: Some(1_700_000_000_000),
    };
    let summary = service
        .import_from_url(
            Integration::Quizlet,
            "https://quizlet.com/555/numbers-flash-cards/",
            "user-1",
            options,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.created_set_id, "set-1");
    assert_eq!(summary.title, "Imported set");
    assert_eq!(summary.terms, 2);

    let saved = store.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].requester_id, "user-1");
    assert_eq!(saved[0].created_at, Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
    assert_eq!(saved[0].terms[1].word, "two");
    assert_eq!(saved[0].terms[1].rank, 1);
}

#[tokio::test]
async fn test_url_import_truncates_then_censors() {
    let long_definition = "x".repeat(20);
    let page = format!(
        r#"<script id="__NEXT_DATA__" type="application/json">
        {{"set":{{"title":"Darn Good Set"}},"terms":[{{"term":"darn","definition":"{long_definition}"}}]}}
        </script>"#
    );
    let server = serve_set(&page).await;

    let mut config = config_for(&server);
    config.limits.max_term_chars = 10;
    config.limits.max_title_chars = 9;
    let store = MemoryStore::default();
    let censor = |text: &str| text.replace("Darn", "****").replace("darn", "****");
    let service = ImportService::new(config, store.clone(), censor).unwrap();

    let summary = service
        .import_from_url(
            Integration::Quizlet,
            "https://quizlet.com/555",
            "user-1",
            ImportOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.title, "**** Good");
    let saved = store.saved();
    assert_eq!(saved[0].terms[0].word, "****");
    assert_eq!(saved[0].terms[0].definition, "x".repeat(10));
}

#[tokio::test]
async fn test_url_import_errors_are_not_stored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Just a moment..."))
        .mount(&server)
        .await;
    let store = MemoryStore::default();
    let service = ImportService::new(config_for(&server), store.clone(), PassThrough).unwrap();

    let err = service
        .import_from_url(
            Integration::Quizlet,
            "https://quizlet.com/555",
            "user-1",
            ImportOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Blocked { status: 503 }));
    assert!(store.saved().is_empty());
}

#[tokio::test]
async fn test_export_import() {
    let store = MemoryStore::default();
    let service = ImportService::new(ImporterConfig::default(), store.clone(), PassThrough).unwrap();

    let summary = service
        .import_from_export("  Spanish  ", "gato\tcat\nperro  dog\njunk\n", "user-2")
        .await
        .unwrap();

    assert_eq!(summary.title, "Spanish");
    assert_eq!(summary.terms, 2);
    let saved = store.saved();
    assert_eq!(saved[0].terms[0].word, "gato");
    assert_eq!(saved[0].terms[1].definition, "dog");
    assert_eq!(saved[0].terms[1].rank, 1);
}

#[tokio::test]
async fn test_export_requires_title() {
    let service = ImportService::new(ImporterConfig::default(), MemoryStore::default(), PassThrough).unwrap();
    let err = service
        .import_from_export("   ", "a\tb\nc\td", "user-2")
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Validation(msg) if msg == "Title is required."));
}

#[tokio::test]
async fn test_export_requires_two_terms() {
    let store = MemoryStore::default();
    let service = ImportService::new(ImporterConfig::default(), store.clone(), PassThrough).unwrap();
    let err = service
        .import_from_export("Title", "only\tone\nnothing here", "user-2")
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Validation(_)));
    assert!(store.saved().is_empty());
}

#[tokio::test]
async fn test_storage_failure_is_reported() {
    let service = ImportService::new(ImporterConfig::default(), FailingStore, PassThrough).unwrap();
    let err = service
        .import_from_export("Title", "a\tb\nc\td", "user-2")
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Storage(_)));
    assert!(err.to_string().contains("database unavailable"));
}

#[tokio::test]
async fn test_service_reuses_one_importer_across_imports() {
    let server = serve_set(
        r#"<script id="__NEXT_DATA__" type="application/json">
        {"terms":[{"term":"one","definition":"uno"}]}
        </script>"#,
    )
    .await;
    let store = MemoryStore::default();
    let service = ImportService::new(config_for(&server), store.clone(), PassThrough).unwrap();

    let first = service.importer(Integration::Quizlet).unwrap();
    let second = service.importer(Integration::Quizlet).unwrap();
    assert!(std::ptr::addr_eq(first, second));

    for _ in 0..2 {
        service
            .import_from_url(
                Integration::Quizlet,
                "https://quizlet.com/555",
                "user-1",
                ImportOptions::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
    }
    assert_eq!(store.saved().len(), 2);
}
