//! ConnectionPool: writer + read pool with round-robin selection.
//!
//! The only place in the storage crate that holds `Mutex<Connection>`.
//! All other code accesses storage through `IAuditStorage` trait methods.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::Connection;

use pagescore_core::errors::{AuditError, AuditResult};

use crate::pragmas;

/// Default number of reader connections.
const DEFAULT_READ_POOL_SIZE: usize = 2;

/// Connection pool: 1 writer + N readers.
pub struct ConnectionPool {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    read_index: AtomicUsize,
}

impl ConnectionPool {
    /// Open a file-backed connection pool.
    ///
    /// `prepare_writer` runs on the writer before any reader is opened, so
    /// readers never observe a database without its schema.
    pub fn open<F>(path: &Path, read_pool_size: usize, prepare_writer: F) -> AuditResult<Self>
    where
        F: FnOnce(&Connection) -> AuditResult<()>,
    {
        let pool_size = if read_pool_size == 0 {
            DEFAULT_READ_POOL_SIZE
        } else {
            read_pool_size
        };

        let writer = Connection::open(path)
            .map_err(|e| AuditError::Config(format!("Failed to open database writer: {}", e)))?;
        pragmas::configure_connection(&writer)?;
        prepare_writer(&writer)?;

        let mut readers = Vec::with_capacity(pool_size);
        for i in 0..pool_size {
            let reader = Connection::open_with_flags(
                path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| {
                AuditError::Config(format!("Failed to open database reader {}: {}", i, e))
            })?;
            pragmas::configure_readonly_connection(&reader)?;
            readers.push(Mutex::new(reader));
        }

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            read_index: AtomicUsize::new(0),
        })
    }

    /// Open an in-memory pool. Readers are empty, so reads go through the writer.
    pub fn open_in_memory<F>(prepare_writer: F) -> AuditResult<Self>
    where
        F: FnOnce(&Connection) -> AuditResult<()>,
    {
        let writer = Connection::open_in_memory()
            .map_err(|e| AuditError::Config(format!("Failed to open in-memory writer: {}", e)))?;
        pragmas::configure_connection(&writer)?;
        prepare_writer(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            read_index: AtomicUsize::new(0),
        })
    }

    /// Execute a closure with the writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> AuditResult<T>
    where
        F: FnOnce(&Connection) -> AuditResult<T>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| AuditError::Config(format!("Writer lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Execute a closure with a reader connection (round-robin).
    /// Falls back to the writer when there are no readers (in-memory mode).
    pub fn with_reader<F, T>(&self, f: F) -> AuditResult<T>
    where
        F: FnOnce(&Connection) -> AuditResult<T>,
    {
        if self.readers.is_empty() {
            return self.with_writer(f);
        }

        let index = self.read_index.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[index]
            .lock()
            .map_err(|e| AuditError::Config(format!("Reader lock poisoned: {}", e)))?;
        f(&conn)
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    /// Check WAL mode on the writer connection.
    pub fn is_wal_mode(&self) -> bool {
        self.with_writer(|conn| {
            let mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .unwrap_or_default();
            Ok(mode.eq_ignore_ascii_case("wal"))
        })
        .unwrap_or(false)
    }
}
