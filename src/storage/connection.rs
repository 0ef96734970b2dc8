//! Shared `SQLite` connection handling.
//!
//! Connections are held in a `Mutex` and configured for concurrent readers.

use crate::{Error, Result};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Busy timeout applied to every connection, in milliseconds.
pub const BUSY_TIMEOUT_MS: u32 = 5000;

/// Acquires a mutex lock, recovering the inner value if the mutex is poisoned.
///
/// A panic while the lock was held leaves the connection itself usable, so the
/// poison is logged and cleared rather than propagated.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            ::metrics::counter!("amem_sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Configures a connection: WAL journal, NORMAL synchronous, busy timeout.
///
/// In-memory databases keep their `memory` journal mode.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the busy timeout cannot be set.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    // journal_mode returns a row, so failures here are ignored rather than batched.
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    conn.busy_timeout(Duration::from_millis(u64::from(BUSY_TIMEOUT_MS)))
        .map_err(|e| Error::failed("configure_connection", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_acquire_lock_concurrent() {
        let mutex = Arc::new(Mutex::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let mutex = Arc::clone(&mutex);
                thread::spawn(move || *acquire_lock(&mutex) += 1)
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*acquire_lock(&mutex), 8);
    }

    #[test]
    fn test_acquire_lock_recovers_from_poison() {
        let mutex = Arc::new(Mutex::new(1));
        let clone = Arc::clone(&mutex);
        let _ = thread::spawn(move || {
            let _guard = clone.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(mutex.is_poisoned());
        assert_eq!(*acquire_lock(&mutex), 1);
    }

    #[test]
    fn test_configure_connection() {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(dir.path().join("test.db")).unwrap();
        configure_connection(&conn).unwrap();

        let journal_mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        assert_eq!(journal_mode.to_lowercase(), "wal");

        let synchronous: i32 = conn
            .pragma_query_value(None, "synchronous", |row| row.get(0))
            .unwrap();
        assert_eq!(synchronous, 1);

        let busy_timeout: u32 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .unwrap();
        assert_eq!(busy_timeout, BUSY_TIMEOUT_MS);
    }
}
