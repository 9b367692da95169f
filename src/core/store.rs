//! # Idea Store
//!
//! Append-only record of every idea that has already been delivered.
//!
//! Backed by a single SQLite table `(id TEXT PRIMARY KEY, text TEXT)`.
//! Ids are assigned as `row count + 1`, so they stay dense starting at 1.
//! Each operation opens its own connection and drops it before returning;
//! nothing is held across a run.

use std::fmt;
use std::path::PathBuf;

use log::{debug, info};
use rusqlite::{Connection, params};

/// One stored idea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaRecord {
    pub id: String,
    pub text: String,
}

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// Table names are spliced into SQL, so only `[A-Za-z0-9_]` is allowed.
    InvalidTable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "store error: {e}"),
            StoreError::InvalidTable(name) => write!(f, "invalid table name: {name:?}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}

pub trait IdeaStore: Send + Sync {
    /// Every stored idea text, in insertion order.
    fn list_all(&self) -> Result<Vec<String>, StoreError>;

    /// Stores `text` under the next sequential id.
    fn append(&self, text: &str) -> Result<(), StoreError>;
}

/// SQLite-backed [`IdeaStore`].
pub struct SqliteIdeaStore {
    path: PathBuf,
    table: String,
}

impl SqliteIdeaStore {
    /// Points the store at a database file. Nothing is opened until first use.
    pub fn new(path: impl Into<PathBuf>, table: &str) -> Result<Self, StoreError> {
        let valid = !table.is_empty()
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !table.starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            return Err(StoreError::InvalidTable(table.to_string()));
        }
        Ok(Self {
            path: path.into(),
            table: table.to_string(),
        })
    }

    /// Opens a connection and creates the table if it does not exist yet.
    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (id TEXT NOT NULL PRIMARY KEY, text TEXT);",
            self.table
        ))?;
        Ok(conn)
    }

    /// All rows with their ids, in insertion order.
    pub fn records(&self) -> Result<Vec<IdeaRecord>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, text FROM {} ORDER BY rowid",
            self.table
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(IdeaRecord {
                id: row.get(0)?,
                text: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

impl IdeaStore for SqliteIdeaStore {
    fn list_all(&self) -> Result<Vec<String>, StoreError> {
        let ideas: Vec<String> = self.records()?.into_iter().map(|r| r.text).collect();
        debug!("Loaded {} stored ideas from {}", ideas.len(), self.path.display());
        Ok(ideas)
    }

    fn append(&self, text: &str) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        let id = (count + 1).to_string();
        conn.execute(
            &format!("INSERT INTO {} (id, text) VALUES (?1, ?2)", self.table),
            params![id, text],
        )?;
        info!("Stored idea #{}: {}", id, text);
        Ok(())
    }
}
