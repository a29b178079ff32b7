//! Fixed-size pool of DuckDB connections
//!
//! DuckDB `Connection` is `Send` but not `Sync`, so each pooled connection
//! sits behind its own mutex. All connections are cloned from one root and
//! therefore share a single database instance.

use crate::{HeroscopeError, Result};
use duckdb::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};

pub struct ConnectionPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ConnectionPool {
    /// Build a pool of `size` connections from a root connection
    pub fn new(root: Connection, size: usize) -> Result<Self> {
        let size = size.max(1);
        let mut connections = Vec::with_capacity(size);
        for _ in 1..size {
            let clone = root.try_clone().map_err(|e| {
                HeroscopeError::ConnectionError(format!("Failed to clone connection: {}", e))
            })?;
            connections.push(Mutex::new(clone));
        }
        connections.push(Mutex::new(root));

        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }

    /// Take a connection, preferring an idle one and waiting otherwise
    pub fn acquire(&self) -> Result<MutexGuard<'_, Connection>> {
        let n = self.connections.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed) % n;

        for offset in 0..n {
            match self.connections[(start + offset) % n].try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::WouldBlock) => continue,
                Err(TryLockError::Poisoned(e)) => {
                    return Err(HeroscopeError::InternalError(format!(
                        "Connection lock poisoned: {}",
                        e
                    )))
                }
            }
        }

        self.connections[start].lock().map_err(|e| {
            HeroscopeError::InternalError(format!("Failed to lock connection: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_connections_share_database() {
        let root = Connection::open_in_memory().unwrap();
        let pool = ConnectionPool::new(root, 3).unwrap();
        assert_eq!(pool.size(), 3);

        {
            let conn = pool.acquire().unwrap();
            conn.execute_batch("CREATE TABLE t(x INTEGER); INSERT INTO t VALUES (42);")
                .unwrap();
        }

        // Hold two connections so the third acquisition lands elsewhere
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();
        for conn in [&a, &b, &c] {
            let x: i32 = conn.query_row("SELECT x FROM t", [], |r| r.get(0)).unwrap();
            assert_eq!(x, 42);
        }
    }

    #[test]
    fn test_zero_size_is_promoted() {
        let root = Connection::open_in_memory().unwrap();
        let pool = ConnectionPool::new(root, 0).unwrap();
        assert_eq!(pool.size(), 1);
        assert!(pool.acquire().is_ok());
    }
}
