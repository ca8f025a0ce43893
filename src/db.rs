use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

pub struct CacheDatabase {
    conn: Connection,
}

impl CacheDatabase {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create cache directory {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open progress cache at {}", path.display()))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory cache")?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS video_progress_cache (
                cache_key TEXT PRIMARY KEY,
                video_id TEXT NOT NULL,
                record TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_video_progress_cache_video ON video_progress_cache(video_id);
            "#,
        )?;
        Ok(())
    }

    pub fn upsert_record(&self, cache_key: &str, video_id: &str, record_json: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r#"
            INSERT INTO video_progress_cache (cache_key, video_id, record, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(cache_key) DO UPDATE SET
                video_id = excluded.video_id,
                record = excluded.record,
                updated_at = excluded.updated_at
            "#,
            params![cache_key, video_id, record_json, now],
        )?;
        Ok(())
    }

    pub fn record_json(&self, cache_key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT record FROM video_progress_cache WHERE cache_key = ?1")?;
        let mut rows = stmt.query(params![cache_key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get(0)?));
        }
        Ok(None)
    }
}
