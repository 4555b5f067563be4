//! Engine flows against the disk-backed storage, including persistence
//! across reopen.

use tempfile::TempDir;

use ordex::{
    DiskStorage, DiskStorageConfig, DocumentInput, Engine, EngineConfig, Storage,
};

fn doc(title: &str, text: &str, url: &str, rank: u32) -> DocumentInput {
    DocumentInput {
        title: title.to_string(),
        text: text.to_string(),
        url: url.to_string(),
        rank,
    }
}

fn storage_config(dir: &TempDir) -> DiskStorageConfig {
    DiskStorageConfig::new(dir.path().to_path_buf()).with_hash_rows(256)
}

async fn open_engine(dir: &TempDir) -> Engine<DiskStorage> {
    let storage = DiskStorage::open(storage_config(dir)).await.unwrap();
    Engine::new(EngineConfig::default(), storage)
}

async fn index_planets(engine: &Engine<DiskStorage>) {
    engine
        .add(doc(
            "Jupiter",
            "Jupiter is the fifth planet from the Sun and a bright gas giant \
             known to ancient civilizations since before recorded history.",
            "https://en.wikipedia.org/wiki/Jupiter",
            10,
        ))
        .await
        .unwrap();
    engine
        .add(doc(
            "Saturn",
            "Saturn is a gas giant best known for its prominent ring system.",
            "https://en.wikipedia.org/wiki/Saturn",
            20,
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_disk_search_ranks_by_doc_id() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir).await;
    index_planets(&engine).await;

    let hits = engine.search("giant", 100).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title, "Jupiter");
    assert_eq!(hits[1].title, "Saturn");
    assert!(hits[0].introduction.contains("\"giant\""));
}

#[tokio::test]
async fn test_disk_phrase_query() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir).await;
    index_planets(&engine).await;

    let hits = engine.search("\"gas giant\"", 100).await.unwrap();
    assert_eq!(hits.len(), 2);

    let hits = engine.search("\"giant gas\"", 100).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_disk_index_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let engine = open_engine(&dir).await;
        index_planets(&engine).await;
    }

    let engine = open_engine(&dir).await;
    assert_eq!(engine.storage().document_count().await.unwrap(), 2);

    let hits = engine.search("civilizations", 100).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Jupiter");
    assert!(hits[0].introduction.contains("\"civilizations\""));

    // URL uniqueness also survives reopen
    let err = engine
        .add(doc("Jupiter", "again", "https://en.wikipedia.org/wiki/Jupiter", 30))
        .await
        .unwrap_err();
    assert!(matches!(err, ordex::OrdexError::DuplicateUrl(_)));
}

#[tokio::test]
async fn test_disk_add_more_documents_after_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let engine = open_engine(&dir).await;
        index_planets(&engine).await;
    }

    let engine = open_engine(&dir).await;
    engine
        .add(doc(
            "Neptune",
            "Neptune is an ice giant and the most distant known planet.",
            "https://en.wikipedia.org/wiki/Neptune",
            30,
        ))
        .await
        .unwrap();

    let hits = engine.search("giant", 100).await.unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[2].title, "Neptune");
}

#[tokio::test]
async fn test_disk_rank_collision_takes_next_free_slot() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir).await;

    engine
        .add(doc("First", "alpha beta", "https://a", 5))
        .await
        .unwrap();
    engine
        .add(doc("Second", "alpha gamma", "https://b", 5))
        .await
        .unwrap();

    // the second document landed at rank 4 and therefore wins ties
    let hits = engine.search("alpha", 100).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title, "Second");
}
