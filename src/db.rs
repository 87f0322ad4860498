use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::models::StoryId;

/// Storage key holding the JSON array of bookmarked story ids.
pub const BOOKMARKS_KEY: &str = "articleIds";

const DB_FILE: &str = "reader.db";

/// Durable home of the bookmark list.
pub trait BookmarkStore: Send + Sync {
    fn load(&self) -> Result<Vec<StoryId>>;
    fn save(&self, ids: &[StoryId]) -> Result<()>;
}

/// Decodes the stored value. Absent or malformed content reads as empty.
pub fn parse_bookmarks(raw: Option<&str>) -> Vec<StoryId> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<StoryId>>(raw) {
        Ok(ids) => ids,
        Err(err) => {
            log::warn!("ignoring malformed {} value {:?}: {}", BOOKMARKS_KEY, raw, err);
            Vec::new()
        }
    }
}

/// Key/value table in a local SQLite file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens `reader.db` inside `data_dir`, creating the directory if needed.
    pub fn open_in(data_dir: &Path) -> Result<Self> {
        if !data_dir.exists() {
            std::fs::create_dir_all(data_dir)
                .with_context(|| format!("creating {}", data_dir.display()))?;
        }
        Self::open(&data_dir.join(DB_FILE))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("opening {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| anyhow!("Failed to lock database connection"))?;
        let value: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| anyhow!("Failed to lock database connection"))?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl BookmarkStore for SqliteStore {
    fn load(&self) -> Result<Vec<StoryId>> {
        let raw = self.get(BOOKMARKS_KEY)?;
        Ok(parse_bookmarks(raw.as_deref()))
    }

    fn save(&self, ids: &[StoryId]) -> Result<()> {
        let value = serde_json::to_string(ids)?;
        self.set(BOOKMARKS_KEY, &value)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    ids: Mutex<Vec<StoryId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookmarkStore for MemoryStore {
    fn load(&self) -> Result<Vec<StoryId>> {
        let ids = self.ids.lock().map_err(|_| anyhow!("bookmark store poisoned"))?;
        Ok(ids.clone())
    }

    fn save(&self, ids: &[StoryId]) -> Result<()> {
        let mut stored = self.ids.lock().map_err(|_| anyhow!("bookmark store poisoned"))?;
        *stored = ids.to_vec();
        Ok(())
    }
}

/// Append-only bookmark list over an injected store.
///
/// `add_bookmark` is a plain read-modify-write. Two processes adding at the
/// same time can lose one update (last write wins).
#[derive(Clone)]
pub struct Bookmarks {
    store: Arc<dyn BookmarkStore>,
}

impl Bookmarks {
    pub fn new(store: Arc<dyn BookmarkStore>) -> Self {
        Self { store }
    }

    /// Appends `id` without checking for duplicates and returns the new list.
    pub fn add_bookmark(&self, id: StoryId) -> Result<Vec<StoryId>> {
        let mut ids = self.store.load()?;
        ids.push(id);
        self.store.save(&ids)?;
        log::info!("bookmarked story {} ({} total)", id, ids.len());
        Ok(ids)
    }

    pub fn list_bookmarks(&self) -> Result<Vec<StoryId>> {
        self.store.load()
    }
}
