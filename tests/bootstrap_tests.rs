// Bootstrap tests - cold start builds the index, warm start reloads it.

mod common;

use common::KeywordEmbedder;
use research_indexer::application::bootstrap::{self, BootstrapError, BootstrapMode};
use research_indexer::infrastructure::corpus::CorpusError;
use research_indexer::infrastructure::index::{DEFAULT_EMBED_BATCH_SIZE, DOCSTORE_FILE, IndexError};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn seed_corpus(dir: &std::path::Path) {
    fs::create_dir_all(dir).expect("create data dir");
    fs::write(dir.join("attention.txt"), "Attention replaces recurrence.").expect("write");
    fs::write(dir.join("resnet.txt"), "Residual connections ease training.").expect("write");
    fs::write(dir.join("gan.txt"), "Generators compete with discriminators.").expect("write");
    fs::write(dir.join(".hidden"), "ignored").expect("write");
}

#[tokio::test]
async fn cold_start_embeds_every_corpus_document_once() {
    let root = tempdir().expect("tempdir");
    let data = root.path().join("data");
    let persist = root.path().join("agent_dir");
    seed_corpus(&data);

    let embedder = Arc::new(KeywordEmbedder::default());
    let mut status = Vec::new();
    let (index, mode) =
        bootstrap::open_or_create(&persist, &data, embedder.clone(), 2, &mut status)
            .await
            .expect("bootstrap");

    assert_eq!(mode, BootstrapMode::Created { documents: 3 });
    assert_eq!(embedder.embedded(), 3);
    assert_eq!(embedder.requests(), 2);
    assert_eq!(index.len().await, 3);
    assert!(persist.join(DOCSTORE_FILE).exists());
    let status = String::from_utf8(status).expect("utf8");
    assert_eq!(status, "Index not found, creating one...\n");
}

#[tokio::test]
async fn warm_start_loads_without_embedding() {
    let root = tempdir().expect("tempdir");
    let data = root.path().join("data");
    let persist = root.path().join("agent_dir");
    seed_corpus(&data);

    let first = Arc::new(KeywordEmbedder::default());
    bootstrap::open_or_create(
        &persist,
        &data,
        first,
        DEFAULT_EMBED_BATCH_SIZE,
        &mut std::io::sink(),
    )
    .await
    .expect("cold start");

    let second = Arc::new(KeywordEmbedder::default());
    let mut status = Vec::new();
    let (index, mode) = bootstrap::open_or_create(
        &persist,
        &data,
        second.clone(),
        DEFAULT_EMBED_BATCH_SIZE,
        &mut status,
    )
    .await
    .expect("warm start");

    assert_eq!(mode, BootstrapMode::Loaded { documents: 3 });
    assert_eq!(second.embedded(), 0);
    let titles: Vec<String> = index
        .documents()
        .await
        .into_iter()
        .map(|doc| doc.metadata.title)
        .collect();
    assert_eq!(titles, vec!["attention.txt", "gan.txt", "resnet.txt"]);
    let status = String::from_utf8(status).expect("utf8");
    assert!(status.starts_with("Index found, loading from directory: "));
}

#[tokio::test]
async fn missing_corpus_on_cold_start_is_fatal() {
    let root = tempdir().expect("tempdir");
    let err = bootstrap::open_or_create(
        &root.path().join("agent_dir"),
        &root.path().join("absent"),
        Arc::new(KeywordEmbedder::default()),
        DEFAULT_EMBED_BATCH_SIZE,
        &mut std::io::sink(),
    )
    .await
    .err()
    .expect("missing corpus");

    assert!(matches!(err, BootstrapError::Corpus(CorpusError::Missing { .. })));
}

#[tokio::test]
async fn unreadable_persisted_index_is_fatal() {
    let root = tempdir().expect("tempdir");
    let persist = root.path().join("agent_dir");
    fs::create_dir_all(&persist).expect("create persist dir");
    fs::write(persist.join(DOCSTORE_FILE), "{ broken").expect("write");

    let err = bootstrap::open_or_create(
        &persist,
        &root.path().join("data"),
        Arc::new(KeywordEmbedder::default()),
        DEFAULT_EMBED_BATCH_SIZE,
        &mut std::io::sink(),
    )
    .await
    .err()
    .expect("corrupt index");

    assert!(matches!(err, BootstrapError::Index(IndexError::Corrupt { .. })));
}
