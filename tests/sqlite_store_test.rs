use anyhow::Result;
use media_etl::category::CategoryMap;
use media_etl::db::SqliteDocumentStore;
use media_etl::loader::Loader;
use media_etl::record::OutputRecord;
use media_etl::storage::{DocumentMap, DocumentStore, UpsertOne};
use media_etl::transform::{Transformer, VideoTransformer};
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

fn doc(value: serde_json::Value) -> DocumentMap {
    value.as_object().cloned().unwrap()
}

fn video_records() -> Vec<OutputRecord> {
    let transformer = VideoTransformer::new(Arc::new(CategoryMap::builtin().unwrap()));
    let items = vec![
        json!({
            "id": "v1",
            "snippet": {"title": "T", "channelTitle": "C", "categoryId": "10"},
            "statistics": {"viewCount": "100"},
            "contentDetails": {"duration": "PT3M"}
        }),
        json!({"id": "v2", "snippet": {"categoryId": "999"}}),
    ];
    transformer.transform(&items).records
}

#[tokio::test]
async fn upserts_are_idempotent_across_reopen() -> Result<()> {
    let dir = tempdir()?;
    let uri = format!("sqlite://{}", dir.path().join("store").join("etl.db").display());

    {
        let store = Arc::new(SqliteDocumentStore::open(&uri)?);
        let loader = Loader::new(store.clone());
        let first = loader.load("youtube_videos", &video_records()).await?;
        assert_eq!((first.inserted, first.updated), (2, 0));
    }

    let store = Arc::new(SqliteDocumentStore::open(&uri)?);
    let loader = Loader::new(store.clone());
    let second = loader.load("youtube_videos", &video_records()).await?;
    assert_eq!((second.inserted, second.updated), (0, 2));
    assert_eq!(store.count("youtube_videos").await?, 2);

    let v1 = store.find_by_key("youtube_videos", "v1").await?.unwrap();
    assert_eq!(v1["category_title"], json!("Music"));
    assert_eq!(v1["duration_seconds"], json!(180));
    let v2 = store.find_by_key("youtube_videos", "v2").await?.unwrap();
    assert_eq!(v2["category_title"], json!("Unknown"));
    Ok(())
}

#[tokio::test]
async fn set_semantics_keep_unlisted_fields() -> Result<()> {
    let store = SqliteDocumentStore::open(":memory:")?;
    store
        .bulk_upsert(
            "spotify_tracks",
            &[UpsertOne::new(
                "track_id",
                "t1",
                doc(json!({"track_id": "t1", "name": "Old", "label": "Indie"})),
            )],
        )
        .await?;

    let result = store
        .bulk_upsert(
            "spotify_tracks",
            &[UpsertOne::new(
                "track_id",
                "t1",
                doc(json!({"track_id": "t1", "name": "New"})),
            )],
        )
        .await?;
    assert_eq!(result.inserted, 0);
    assert_eq!(result.matched, 1);
    assert_eq!(result.modified, 1);

    let stored = store.find_by_key("spotify_tracks", "t1").await?.unwrap();
    assert_eq!(stored, doc(json!({"track_id": "t1", "name": "New", "label": "Indie"})));
    Ok(())
}

#[tokio::test]
async fn unchanged_documents_match_without_modifying() -> Result<()> {
    let store = SqliteDocumentStore::open(":memory:")?;
    let ops = [UpsertOne::new("video_id", "v9", doc(json!({"video_id": "v9", "view_count": 5})))];
    store.bulk_upsert("youtube_videos", &ops).await?;
    let again = store.bulk_upsert("youtube_videos", &ops).await?;
    assert_eq!((again.inserted, again.matched, again.modified), (0, 1, 0));
    Ok(())
}

#[tokio::test]
async fn failed_batch_leaves_no_partial_writes() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("etl.db");
    let store = SqliteDocumentStore::open_at(&path)?;
    let seed = [UpsertOne::new("track_id", "t1", doc(json!({"track_id": "t1"})))];
    store.bulk_upsert("spotify_tracks", &seed).await?;

    // Damage the stored document behind the store's back
    let raw = rusqlite::Connection::open(&path)?;
    raw.execute(
        r#"UPDATE "spotify_tracks" SET document = 'not json' WHERE natural_key = 't1'"#,
        [],
    )?;

    let batch = [
        UpsertOne::new("track_id", "t2", doc(json!({"track_id": "t2", "name": "Fresh"}))),
        UpsertOne::new("track_id", "t1", doc(json!({"track_id": "t1", "name": "Retry"}))),
    ];
    assert!(store.bulk_upsert("spotify_tracks", &batch).await.is_err());

    assert_eq!(store.count("spotify_tracks").await?, 1);
    assert!(store.find_by_key("spotify_tracks", "t2").await?.is_none());
    let untouched: String = raw.query_row(
        r#"SELECT document FROM "spotify_tracks" WHERE natural_key = 't1'"#,
        [],
        |row| row.get(0),
    )?;
    assert_eq!(untouched, "not json");
    Ok(())
}

#[tokio::test]
async fn unknown_collections_read_as_empty() -> Result<()> {
    let store = SqliteDocumentStore::open(":memory:")?;
    assert_eq!(store.count("nothing_here").await?, 0);
    assert!(store.find_by_key("nothing_here", "x").await?.is_none());
    assert!(store.count("bad name").await.is_err());
    Ok(())
}

#[test]
fn foreign_store_uri_is_a_config_error() {
    let err = SqliteDocumentStore::open("mongodb://localhost:27017/").err().unwrap();
    assert!(err.is_config());
}
