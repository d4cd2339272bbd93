use crate::config::Config;
use crate::error::StoreError;
use crate::model::{Book, BookFields};
use anyhow::Result;
use libsql::{Builder, Connection, Database as LibsqlDatabase, Row, Rows};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

const SCHEMA: &str = include_str!("schema.sql");

const SELECT_BOOKS: &str = "SELECT id, doc FROM books";

/// Document store for book records.
///
/// Each book is one row holding its id and its JSON document. All lookups
/// are done against the document with the JSON1 functions.
pub struct Database {
    // keeps the replica (and its sync loop) alive for the connection
    _db: LibsqlDatabase,
    conn: Connection,
}

impl Database {
    pub async fn new(cfg: &Config, data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(cfg.store.get_db());

        let db = match cfg.store.remote() {
            Some((url, token)) => {
                tracing::info!(path = ?path, "[db] running in synced database mode");
                let sync_interval = Duration::from_secs(cfg.store.sync_interval_seconds);
                Builder::new_synced_database(&path, url.to_string(), token.to_string())
                    .sync_interval(sync_interval)
                    .build()
                    .await?
            }
            None => {
                tracing::info!(path = ?path, "[db] running in local mode");
                Builder::new_local(&path).build().await?
            }
        };

        Self::open(db).await
    }

    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::open(db).await
    }

    async fn open(db: LibsqlDatabase) -> Result<Self> {
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;
        conn.execute_batch(SCHEMA)
            .await
            .map_err(|e| anyhow::anyhow!("failed to apply store schema: {e}"))?;

        Ok(Database { _db: db, conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn row_to_book(row: &Row) -> Result<Book, StoreError> {
        let id: String = row.get(0)?;
        let doc: String = row.get(1)?;
        let fields: BookFields =
            serde_json::from_str(&doc).map_err(|source| StoreError::Document { id: id.clone(), source })?;
        Ok(Book { id, fields })
    }

    async fn collect(mut rows: Rows) -> Result<Vec<Book>, StoreError> {
        let mut books = vec![];
        while let Some(row) = rows.next().await? {
            books.push(Self::row_to_book(&row)?);
        }
        Ok(books)
    }

    async fn first(mut rows: Rows) -> Result<Option<Book>, StoreError> {
        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_book(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn insert_book(&self, fields: &BookFields) -> Result<Book, StoreError> {
        let query = r#"
            INSERT INTO books (id, doc)
            VALUES (lower(hex(randomblob(12))), json(?))
            RETURNING id, doc
        "#;

        let doc = serde_json::to_string(fields)?;
        let rows = self.conn.query(query, libsql::params![doc]).await?;
        Self::first(rows).await?.ok_or(StoreError::NoRowReturned)
    }

    pub async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        let query = format!("{SELECT_BOOKS} ORDER BY rowid");
        let rows = self.conn.query(&query, ()).await?;
        Self::collect(rows).await
    }

    pub async fn find_one_by_title(&self, title: &str) -> Result<Option<Book>, StoreError> {
        let query = format!("{SELECT_BOOKS} WHERE json_extract(doc, '$.title') = ? ORDER BY rowid LIMIT 1");
        let rows = self.conn.query(&query, libsql::params![title]).await?;
        Self::first(rows).await
    }

    pub async fn find_by_author(&self, author: &str) -> Result<Vec<Book>, StoreError> {
        let query = format!("{SELECT_BOOKS} WHERE json_extract(doc, '$.author') = ? ORDER BY rowid");
        let rows = self.conn.query(&query, libsql::params![author]).await?;
        Self::collect(rows).await
    }

    pub async fn find_by_genre(&self, genre: &str) -> Result<Vec<Book>, StoreError> {
        let query = format!(
            "{SELECT_BOOKS} WHERE EXISTS (SELECT 1 FROM json_each(books.doc, '$.genre') WHERE json_each.value = ?) ORDER BY rowid"
        );
        let rows = self.conn.query(&query, libsql::params![genre]).await?;
        Self::collect(rows).await
    }

    /// The year arrives as path text and is compared with the stored value
    /// rendered as text, so `"1965"` matches a stored `1965`.
    pub async fn find_by_year(&self, year: &str) -> Result<Vec<Book>, StoreError> {
        let query = format!(
            "{SELECT_BOOKS} WHERE CAST(json_extract(doc, '$.publishedYear') AS TEXT) = ? ORDER BY rowid"
        );
        let rows = self.conn.query(&query, libsql::params![year]).await?;
        Self::collect(rows).await
    }

    /// Merges `patch` into the document with the given id and returns the
    /// updated record, or `None` when no such id exists.
    pub async fn update_by_id<P: Serialize>(&self, id: &str, patch: &P) -> Result<Option<Book>, StoreError> {
        let query = r#"
            UPDATE books SET doc = json_patch(doc, json(?))
            WHERE id = ?
            RETURNING id, doc
        "#;

        let patch = serde_json::to_string(patch)?;
        let rows = self.conn.query(query, libsql::params![patch, id]).await?;
        Self::first(rows).await
    }

    /// Merges `patch` into the first document (in insertion order) whose
    /// title equals `title`.
    pub async fn update_one_by_title<P: Serialize>(
        &self,
        title: &str,
        patch: &P,
    ) -> Result<Option<Book>, StoreError> {
        let query = r#"
            UPDATE books SET doc = json_patch(doc, json(?))
            WHERE id = (
                SELECT id FROM books
                WHERE json_extract(doc, '$.title') = ?
                ORDER BY rowid LIMIT 1
            )
            RETURNING id, doc
        "#;

        let patch = serde_json::to_string(patch)?;
        let rows = self.conn.query(query, libsql::params![patch, title]).await?;
        Self::first(rows).await
    }

    /// Returns whether a record was removed.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let query = "DELETE FROM books WHERE id = ? RETURNING id";
        let mut rows = self.conn.query(query, libsql::params![id]).await?;
        Ok(rows.next().await?.is_some())
    }
}
