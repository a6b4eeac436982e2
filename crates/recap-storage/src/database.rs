// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes. Read-only
//! connections may be opened alongside the writer when WAL mode is on.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use recap_config::model::StorageConfig;
use recap_core::RecapError;
use rusqlite::OpenFlags;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Converts a tokio-rusqlite error into `RecapError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> RecapError {
    RecapError::Storage {
        source: Box::new(e),
    }
}

/// Connection settings derived from `[storage]`.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub wal_mode: bool,
    pub read_pool_size: usize,
    pub busy_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            wal_mode: true,
            read_pool_size: 0,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

impl From<&StorageConfig> for DatabaseOptions {
    fn from(config: &StorageConfig) -> Self {
        Self {
            wal_mode: config.wal_mode,
            read_pool_size: config.read_pool_size,
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
        }
    }
}

/// Handle to the message store: one writer plus an optional set of readers.
pub struct Database {
    writer: Connection,
    readers: Vec<Connection>,
    next_reader: AtomicUsize,
}

impl Database {
    /// Opens the database at `path` with default options and runs migrations.
    pub async fn open(path: &str) -> Result<Self, RecapError> {
        Self::open_with(path, &DatabaseOptions::default()).await
    }

    /// Opens the database at `path`, applies PRAGMAs, runs migrations, then
    /// opens `read_pool_size` read-only connections.
    ///
    /// Readers are skipped for in-memory databases and when WAL is off, since
    /// they would not observe the writer's data concurrently.
    pub async fn open_with(path: &str, options: &DatabaseOptions) -> Result<Self, RecapError> {
        let writer = Connection::open(path)
            .await
            .map_err(|e| RecapError::Storage {
                source: Box::new(e),
            })?;

        let wal = options.wal_mode;
        let busy_ms = options.busy_timeout.as_millis() as u64;
        writer
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal {
                    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
                }
                conn.execute_batch(&format!(
                    "PRAGMA synchronous = NORMAL;
                     PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = {busy_ms};"
                ))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        writer
            .call(|conn| -> Result<Result<(), RecapError>, rusqlite::Error> {
                Ok(migrations::run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)??;

        let in_memory = path == ":memory:" || path.is_empty();
        let reader_count = if wal && !in_memory {
            options.read_pool_size
        } else {
            0
        };

        let mut readers = Vec::with_capacity(reader_count);
        for _ in 0..reader_count {
            let reader = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .await
            .map_err(|e| RecapError::Storage {
                source: Box::new(e),
            })?;
            reader
                .call(move |conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch(&format!(
                        "PRAGMA busy_timeout = {busy_ms};
                         PRAGMA query_only = ON;"
                    ))
                })
                .await
                .map_err(map_tr_err)?;
            readers.push(reader);
        }

        debug!(path, wal, readers = readers.len(), "database opened");
        Ok(Self {
            writer,
            readers,
            next_reader: AtomicUsize::new(0),
        })
    }

    /// The single writer connection. All mutations go through here.
    pub fn connection(&self) -> &Connection {
        &self.writer
    }

    /// A connection for read-only queries, chosen round-robin. Falls back to
    /// the writer when no readers are open.
    pub fn reader(&self) -> &Connection {
        if self.readers.is_empty() {
            return &self.writer;
        }
        let idx = self.next_reader.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        &self.readers[idx]
    }

    /// Truncating WAL checkpoint on the writer.
    pub async fn checkpoint(&self) -> Result<(), RecapError> {
        self.writer
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
