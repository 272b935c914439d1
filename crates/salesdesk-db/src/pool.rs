//! # Database Handle
//!
//! Opens the SQLite pool that every repository shares and owns the
//! per-kind [`NumberLocks`].
//!
//! ## Opening Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DbConfig::new("salesdesk.db")          DbConfig::in_memory()          │
//! │       │  journal WAL                         │  journal MEMORY          │
//! │       │  busy timeout 5s                     │  one connection          │
//! │       └──────────────┬───────────────────────┘                         │
//! │                      ▼                                                  │
//! │            SqliteConnectOptions (foreign keys ON, sync NORMAL)         │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │            SqlitePool ──► migrations ──► Database { pool, locks }      │
//! │                                               │                         │
//! │                         documents() ◄─────────┤                         │
//! │                         line_items() ◄────────┘                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `DocumentRepository` handed out by one `Database` shares its locks,
//! so two creates of the same kind never scan numbers at the same time.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::locks::NumberLocks;
use crate::migrations;
use crate::repository::document::DocumentRepository;
use crate::repository::line_item::LineItemRepository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the documents live and how many connections may touch them.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/salesdesk/salesdesk.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub path: PathBuf,

    /// Pool size. Default: 5
    pub max_connections: u32,

    /// How long a caller waits for a free connection. Default: 30 seconds
    pub acquire_timeout: Duration,

    /// How long SQLite waits on a locked file before failing a write.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Apply pending migrations when opening. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// A file-backed database. The file is created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: path.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// A private in-memory database, gone when the pool closes.
    ///
    /// Limited to one connection: each SQLite connection to `:memory:`
    /// would otherwise see its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            ..DbConfig::new(MEMORY_PATH)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == Path::new(MEMORY_PATH)
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
                .journal_mode(SqliteJournalMode::Memory)
        } else {
            SqliteConnectOptions::new()
                .filename(&self.path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        Ok(options
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle to the sales document store.
///
/// Clones share the pool and the number locks.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    locks: Arc<NumberLocks>,
}

impl Database {
    /// Opens the pool and, unless disabled, brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.path.display(),
            max_connections = config.max_connections,
            "Opening sales document store"
        );

        if config.max_connections > 1 && config.is_in_memory() {
            warn!("In-memory database with more than one connection; each connection sees its own data");
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!("Pool connected");

        let db = Database {
            pool,
            locks: Arc::new(NumberLocks::default()),
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Repository over `sales_documents`, sharing this handle's number locks.
    pub fn documents(&self) -> DocumentRepository {
        DocumentRepository::new(self.pool.clone(), Arc::clone(&self.locks))
    }

    pub fn line_items(&self) -> LineItemRepository {
        LineItemRepository::new(self.pool.clone())
    }

    /// Closes every connection. Repositories fail afterwards.
    pub async fn close(&self) {
        info!("Closing sales document store");
        self.pool.close().await;
    }

    /// True when the document table answers a query.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales_documents LIMIT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}
