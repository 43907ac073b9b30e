mod common;

use std::sync::Arc;

use mockito::Matcher;

use common::{FixtureLauncher, RESULTS_HTML, summary_body, test_config};
use profile_finder::{
    FileProfileStore, KnowledgePanel, MemoryProfileStore, ProfileAggregator, ProfileError,
    ProfileQuery, ProfileRecord, ProfileService, ProfileStore, QueryError, RecordSource,
    ReferenceSummary, SnippetList,
};

fn stored_record(name: &str) -> (ProfileQuery, ProfileRecord) {
    let query = ProfileQuery::new(name).unwrap();
    let record = ProfileRecord::new(
        &query,
        SnippetList::new(vec!["A cached snippet that is long enough.".to_string()]),
        KnowledgePanel::default(),
        ReferenceSummary {
            extract: "Cached extract.".to_string(),
            title: name.to_string(),
            thumbnail: None,
        },
    );
    (query, record)
}

#[tokio::test]
async fn cached_record_is_returned_without_a_session() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("GET", Matcher::Any).expect(0).create_async().await;

    let launcher = FixtureLauncher::serving(RESULTS_HTML);
    let aggregator = ProfileAggregator::new(launcher.clone(), test_config(&server.url())).unwrap();

    let store = Arc::new(MemoryProfileStore::new());
    let (query, record) = stored_record("Ada Lovelace");
    store.put(&query, &record).await.unwrap();

    let service = ProfileService::new(aggregator, store);
    let (found, source) = service.get_or_resolve("Ada Lovelace").await.unwrap();

    assert_eq!(source, RecordSource::Cache);
    assert_eq!(found, record);
    assert_eq!(launcher.counters.acquired(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn miss_resolves_and_stores() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Any)
        .with_status(200)
        .with_body(summary_body("An English mathematician.", "Ada Lovelace", None))
        .expect(1)
        .create_async()
        .await;

    let launcher = FixtureLauncher::serving(RESULTS_HTML);
    let aggregator = ProfileAggregator::new(launcher.clone(), test_config(&server.url())).unwrap();
    let store = Arc::new(MemoryProfileStore::new());
    let service = ProfileService::new(aggregator, store.clone());

    let (first, source) = service.get_or_resolve("Ada Lovelace").await.unwrap();
    assert_eq!(source, RecordSource::Fresh);
    assert_eq!(store.len(), 1);

    let (second, source) = service.get_or_resolve("Ada Lovelace").await.unwrap();
    assert_eq!(source, RecordSource::Cache);
    assert_eq!(first, second);
    assert_eq!(launcher.counters.acquired(), 1);
}

#[tokio::test]
async fn refresh_bypasses_the_store_and_overwrites_it() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Any)
        .with_status(200)
        .with_body(summary_body("Fresh extract.", "Ada Lovelace", None))
        .create_async()
        .await;

    let launcher = FixtureLauncher::serving(RESULTS_HTML);
    let aggregator = ProfileAggregator::new(launcher.clone(), test_config(&server.url())).unwrap();
    let store = Arc::new(MemoryProfileStore::new());
    let (query, stale) = stored_record("Ada Lovelace");
    store.put(&query, &stale).await.unwrap();

    let service = ProfileService::new(aggregator, store.clone());
    let fresh = service.refresh("Ada Lovelace").await.unwrap();

    assert_eq!(fresh.reference.extract, "Fresh extract.");
    assert_eq!(store.get(&query).await.unwrap(), Some(fresh));
    assert_eq!(launcher.counters.acquired(), 1);
}

#[tokio::test]
async fn blank_name_is_rejected_before_any_work() {
    let server = mockito::Server::new_async().await;
    let launcher = FixtureLauncher::serving(RESULTS_HTML);
    let aggregator = ProfileAggregator::new(launcher.clone(), test_config(&server.url())).unwrap();
    let service = ProfileService::new(aggregator, Arc::new(MemoryProfileStore::new()));

    let err = service.get_or_resolve("   ").await.unwrap_err();
    assert!(matches!(err, ProfileError::InvalidQuery(QueryError::Empty)));
    assert_eq!(launcher.counters.acquired(), 0);
}

#[tokio::test]
async fn file_store_survives_a_new_service() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Any)
        .with_status(200)
        .with_body(summary_body("An English mathematician.", "Ada Lovelace", None))
        .expect(1)
        .create_async()
        .await;

    let first_launcher = FixtureLauncher::serving(RESULTS_HTML);
    let service = ProfileService::new(
        ProfileAggregator::new(first_launcher.clone(), test_config(&server.url())).unwrap(),
        Arc::new(FileProfileStore::new(dir.path())),
    );
    let (fresh, _) = service.get_or_resolve("Ada Lovelace").await.unwrap();

    let second_launcher = FixtureLauncher::serving(RESULTS_HTML);
    let service = ProfileService::new(
        ProfileAggregator::new(second_launcher.clone(), test_config(&server.url())).unwrap(),
        Arc::new(FileProfileStore::new(dir.path())),
    );
    let (cached, source) = service.get_or_resolve("Ada Lovelace").await.unwrap();

    assert_eq!(source, RecordSource::Cache);
    assert_eq!(cached, fresh);
    assert_eq!(second_launcher.counters.acquired(), 0);
}

#[tokio::test]
async fn unreadable_store_entry_falls_back_to_resolving() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Ada%20Lovelace.json"), b"{ truncated").unwrap();

    let mut server = mockito::Server::new_async().await;
    server.mock("GET", Matcher::Any).with_status(404).create_async().await;

    let launcher = FixtureLauncher::serving(RESULTS_HTML);
    let service = ProfileService::new(
        ProfileAggregator::new(launcher.clone(), test_config(&server.url())).unwrap(),
        Arc::new(FileProfileStore::new(dir.path())),
    );

    let (record, source) = service.get_or_resolve("Ada Lovelace").await.unwrap();
    assert_eq!(source, RecordSource::Fresh);
    assert_eq!(record.snippets.len(), 2);
    assert_eq!(launcher.counters.acquired(), 1);
}
