use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::schema;

const IN_MEMORY: &str = ":memory:";
/// How long a write waits on a lock held by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The schedule database: one SQLite connection with foreign keys on, so
/// deleting a note cascades to its time blocks.
pub struct Database {
    conn: Connection,
    path: String,
}

impl Database {
    /// Open (or create) the database at `path`. `":memory:"` gives a private
    /// in-memory database, as the tests use.
    ///
    /// # Examples
    /// ```
    /// use timebox_notes::services::database::Database;
    /// let db = Database::new(":memory:").unwrap();
    /// db.initialize_schema().unwrap();
    /// assert!(db.is_in_memory());
    /// ```
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path))?;

        conn.pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign keys")?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set busy timeout")?;
        if path != IN_MEMORY {
            let mode: String = conn
                .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
                .context("Failed to switch to WAL journal")?;
            log::debug!("Journal mode for {}: {}", path, mode);
        }

        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }

    /// Create the notes, time block and subscription tables if missing and
    /// apply column migrations.
    pub fn initialize_schema(&self) -> Result<()> {
        schema::initialize_schema(self.connection())
    }
}
