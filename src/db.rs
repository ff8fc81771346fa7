use crate::error::{EtlError, Result};
use crate::storage::{
    apply_set, lock, new_document, validate_collection, BulkWriteResult, DocumentMap,
    DocumentStore, UpsertOne,
};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Where the document database lives, parsed from the store connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl StoreLocation {
    /// Accepts `sqlite://path`, `sqlite:path`, `file:path`, `:memory:` or a plain path.
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(EtlError::Config("store URI is empty".to_string()));
        }
        let path = uri
            .strip_prefix("sqlite://")
            .or_else(|| uri.strip_prefix("sqlite:"))
            .or_else(|| uri.strip_prefix("file:"))
            .unwrap_or(uri);

        if path == ":memory:" {
            return Ok(StoreLocation::Memory);
        }
        if path.is_empty() || path.contains("://") {
            return Err(EtlError::Config(format!(
                "unsupported store URI '{}': expected a sqlite:// path",
                uri
            )));
        }
        Ok(StoreLocation::File(PathBuf::from(path)))
    }
}

/// SQLite-backed document store: one table per collection, one JSON document
/// per natural key. Each batch runs inside a single transaction.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    pub fn open(uri: &str) -> Result<Self> {
        match StoreLocation::parse(uri)? {
            StoreLocation::Memory => Self::open_in_memory(),
            StoreLocation::File(path) => Self::open_at(path),
        }
    }

    pub fn open_at<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!("Opened document store at {}", db_path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn ensure_collection(conn: &Connection, collection: &str) -> Result<()> {
    validate_collection(collection)?;
    conn.execute_batch(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{}" (
               natural_key TEXT PRIMARY KEY,
               document    TEXT NOT NULL
           );"#,
        collection
    ))?;
    Ok(())
}

fn collection_exists(conn: &Connection, collection: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    let mut rows = stmt.query(params![collection])?;
    Ok(rows.next()?.is_some())
}

fn load_document(conn: &Connection, collection: &str, key: &str) -> Result<Option<DocumentMap>> {
    let mut stmt = conn.prepare(&format!(
        r#"SELECT document FROM "{}" WHERE natural_key = ?1"#,
        collection
    ))?;
    let mut rows = stmt.query(params![key])?;
    if let Some(row) = rows.next()? {
        let raw: String = row.get(0)?;
        Ok(Some(serde_json::from_str(&raw)?))
    } else {
        Ok(None)
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn bulk_upsert(&self, collection: &str, ops: &[UpsertOne]) -> Result<BulkWriteResult> {
        validate_collection(collection)?;
        let mut conn = lock(&self.conn);
        let tx = conn.transaction()?;
        ensure_collection(&tx, collection)?;

        let insert_sql = format!(
            r#"INSERT INTO "{}" (natural_key, document) VALUES (?1, ?2)"#,
            collection
        );
        let update_sql = format!(
            r#"UPDATE "{}" SET document = ?2 WHERE natural_key = ?1"#,
            collection
        );

        let mut result = BulkWriteResult::default();
        for op in ops {
            match load_document(&tx, collection, &op.key)? {
                Some(mut doc) => {
                    result.matched += 1;
                    if apply_set(&mut doc, &op.set) {
                        tx.execute(&update_sql, params![op.key, serde_json::to_string(&doc)?])?;
                        result.modified += 1;
                    }
                }
                None => {
                    let doc = new_document(op);
                    tx.execute(&insert_sql, params![op.key, serde_json::to_string(&doc)?])?;
                    result.inserted += 1;
                }
            }
        }
        // Dropping an uncommitted transaction rolls the whole batch back
        tx.commit()?;

        debug!(
            "Upserted into {}: {} inserted, {} matched, {} modified",
            collection, result.inserted, result.matched, result.modified
        );
        Ok(result)
    }

    async fn find_by_key(&self, collection: &str, key: &str) -> Result<Option<DocumentMap>> {
        validate_collection(collection)?;
        let conn = lock(&self.conn);
        if !collection_exists(&conn, collection)? {
            return Ok(None);
        }
        load_document(&conn, collection, key)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        validate_collection(collection)?;
        let conn = lock(&self.conn);
        if !collection_exists(&conn, collection)? {
            return Ok(0);
        }
        let n: i64 = conn.query_row(
            &format!(r#"SELECT COUNT(*) FROM "{}""#, collection),
            [],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_store_uris() {
        assert_eq!(StoreLocation::parse(":memory:").unwrap(), StoreLocation::Memory);
        assert_eq!(StoreLocation::parse("sqlite://:memory:").unwrap(), StoreLocation::Memory);
        assert_eq!(
            StoreLocation::parse("sqlite://data/etl.db").unwrap(),
            StoreLocation::File(PathBuf::from("data/etl.db"))
        );
        assert_eq!(
            StoreLocation::parse("file:/tmp/etl.db").unwrap(),
            StoreLocation::File(PathBuf::from("/tmp/etl.db"))
        );
        assert_eq!(
            StoreLocation::parse("etl.db").unwrap(),
            StoreLocation::File(PathBuf::from("etl.db"))
        );
    }

    #[test]
    fn rejects_foreign_uris() {
        assert!(StoreLocation::parse("").is_err());
        assert!(StoreLocation::parse("mongodb://localhost:27017/").is_err());
        assert!(StoreLocation::parse("sqlite://").is_err());
    }
}
