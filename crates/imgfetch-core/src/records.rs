//! Persistent image record store (SQLite via sqlx).
//!
//! Holds scraped image records whose `src` URLs the record-backed download
//! path consumes. The downloader only ever reads; inserts exist so the CLI
//! and tests can seed the store.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

/// One stored image record. Only `src` is consumed by the downloader.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub id: i64,
    pub source_index: Option<i64>,
    pub tag: Option<String>,
    pub src: String,
}

/// Percent-encode a path for a sqlite:// URI so spaces and special
/// characters survive parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut encoded = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => encoded.push_str("%25"),
            ' ' => encoded.push_str("%20"),
            '#' => encoded.push_str("%23"),
            '?' => encoded.push_str("%3F"),
            '&' => encoded.push_str("%26"),
            c => encoded.push(c),
        }
    }
    format!("sqlite://{}?mode=rwc", encoded)
}

/// Handle to the SQLite-backed image record store.
///
/// The default database file lives under the XDG state directory:
/// `~/.local/state/imgfetch/images.db`.
#[derive(Clone)]
pub struct ImageStore {
    pool: Pool<Sqlite>,
}

impl ImageStore {
    /// Open (or create) the default store and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("imgfetch")?;
        let state_dir = xdg_dirs.get_state_home();
        let db_path = state_dir.join("images.db");

        tokio::fs::create_dir_all(&state_dir).await?;
        Self::connect(&db_path).await
    }

    /// Open (or create) a store at a specific path. Creates parent dirs if
    /// needed. Intended for tests and the CLI's `--db` override.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Self::connect(path).await
    }

    async fn connect(path: &Path) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&path_to_sqlite_uri(path))
            .await?;

        let store = ImageStore { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS image_tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_index INTEGER,
                tag TEXT,
                src TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert one record, returning its id.
    pub async fn add_record(
        &self,
        source_index: Option<i64>,
        tag: Option<&str>,
        src: &str,
    ) -> Result<i64> {
        let result =
            sqlx::query("INSERT INTO image_tags (source_index, tag, src) VALUES (?1, ?2, ?3)")
                .bind(source_index)
                .bind(tag)
                .bind(src)
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// All records, oldest first.
    pub async fn list_records(&self) -> Result<Vec<ImageRecord>> {
        let rows = sqlx::query("SELECT id, source_index, tag, src FROM image_tags ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ImageRecord {
                id: row.get("id"),
                source_index: row.get("source_index"),
                tag: row.get("tag"),
                src: row.get("src"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn add_and_list_roundtrip() {
        let dir = tempdir().unwrap();
        let store = ImageStore::open_at(dir.path().join("images.db"))
            .await
            .unwrap();

        let first = store
            .add_record(Some(3), Some("cat"), "http://x.test/cat.png")
            .await
            .unwrap();
        let second = store
            .add_record(None, None, "http://x.test/dog.png")
            .await
            .unwrap();
        assert!(second > first);

        let records = store.list_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, first);
        assert_eq!(records[0].source_index, Some(3));
        assert_eq!(records[0].tag.as_deref(), Some("cat"));
        assert_eq!(records[0].src, "http://x.test/cat.png");
        assert_eq!(records[1].source_index, None);
        assert_eq!(records[1].tag, None);
    }

    #[tokio::test]
    async fn open_at_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("state dir").join("images.db");
        let store = ImageStore::open_at(&nested).await.unwrap();
        store.add_record(None, None, "http://x.test/a.png").await.unwrap();
        assert!(nested.exists());
    }

    #[tokio::test]
    async fn reopen_sees_existing_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("images.db");
        {
            let store = ImageStore::open_at(&path).await.unwrap();
            store
                .add_record(Some(1), Some("t"), "http://x.test/a.png")
                .await
                .unwrap();
        }
        let store = ImageStore::open_at(&path).await.unwrap();
        let records = store.list_records().await.unwrap();
        assert_eq!(records.len(), 1);
    }
}
