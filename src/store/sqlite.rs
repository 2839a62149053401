use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use rusqlite_migration::{Migrations, M};

use crate::app::{NewsreelError, Result};
use crate::domain::{Article, ArticleSummary};
use crate::store::ArticleCache;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const UPSERT_SQL: &str =
    "INSERT INTO articles (id, source_name, title, thumbnail_url, published_at, url, author, description, content)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
     ON CONFLICT(id) DO UPDATE SET
        source_name = excluded.source_name,
        title = excluded.title,
        thumbnail_url = excluded.thumbnail_url,
        published_at = excluded.published_at,
        url = excluded.url,
        author = excluded.author,
        description = excluded.description,
        content = excluded.content";

pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.run_migrations()?;
        Ok(cache)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.run_migrations()?;
        Ok(cache)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| NewsreelError::Cache(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            NewsreelError::Cache(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn write_all(tx: &Transaction<'_>, articles: &[Article]) -> Result<usize> {
        let mut stmt = tx.prepare_cached(UPSERT_SQL)?;
        let mut count = 0;

        for article in articles {
            count += stmt.execute(params![
                article.id,
                article.source_name,
                article.title,
                article.thumbnail_url,
                article.published_at,
                article.url,
                article.author,
                article.description,
                article.content,
            ])?;
        }

        Ok(count)
    }

    fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
        Ok(Article {
            id: row.get(0)?,
            source_name: row.get(1)?,
            title: row.get(2)?,
            thumbnail_url: row.get(3)?,
            published_at: row.get(4)?,
            url: row.get(5)?,
            author: row.get(6)?,
            description: row.get(7)?,
            content: row.get(8)?,
        })
    }
}

impl ArticleCache for SqliteCache {
    fn replace_all(&self, articles: &[Article]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM articles", [])?;
        Self::write_all(&tx, articles)?;

        tx.commit()?;
        Ok(())
    }

    fn upsert(&self, articles: &[Article]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let count = Self::write_all(&tx, articles)?;

        tx.commit()?;
        Ok(count)
    }

    fn read_all(&self) -> Result<Vec<ArticleSummary>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, source_name, title, thumbnail_url, published_at
             FROM articles ORDER BY published_at DESC, id",
        )?;

        let summaries = stmt
            .query_map([], |row| {
                Ok(ArticleSummary {
                    id: row.get(0)?,
                    source_name: row.get(1)?,
                    title: row.get(2)?,
                    thumbnail_url: row.get(3)?,
                    published_at: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    fn read_by_id(&self, id: &str) -> Result<Option<Article>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT id, source_name, title, thumbnail_url, published_at, url, author, description, content
                 FROM articles WHERE id = ?1",
                params![id],
                Self::article_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM articles", [])?;
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
