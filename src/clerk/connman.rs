use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;

use super::{Connection, ShardClerk, lock};
use crate::Result;

/// Multiplexes logical clerks over a cache of physical connections,
/// one per distinct address. Safe to share across clerk pools.
#[derive(Default)]
pub struct ConnManager {
    conns: Mutex<HashMap<String, Arc<Mutex<Connection>>>>,
}

impl ConnManager {
    /// Creates a manager with no open connections.
    pub fn new() -> ConnManager {
        ConnManager::default()
    }

    fn connection(&self, addr: &str) -> Result<Arc<Mutex<Connection>>> {
        let mut conns = lock(&self.conns)?;
        if let Some(conn) = conns.get(addr) {
            return Ok(Arc::clone(conn));
        }
        debug!("connection manager dialing {}", addr);
        let conn = Arc::new(Mutex::new(Connection::connect(addr)?));
        conns.insert(addr.to_string(), Arc::clone(&conn));
        Ok(conn)
    }

    fn evict(&self, addr: &str) -> Result<()> {
        lock(&self.conns)?.remove(addr);
        Ok(())
    }
}

/// A pool of logical clerks against one coordinator, all sharing the
/// manager's physical connections.
pub struct ConnManClerkPool {
    coord: String,
    manager: Arc<ConnManager>,
    clerks: usize,
    next: AtomicUsize,
}

impl ConnManClerkPool {
    /// Builds `clerks` logical clerks against the coordinator at
    /// `coord`, multiplexed over `manager`.
    pub fn new(coord: impl Into<String>, manager: Arc<ConnManager>, clerks: usize) -> ConnManClerkPool {
        ConnManClerkPool {
            coord: coord.into(),
            manager,
            clerks: clerks.max(1),
            next: AtomicUsize::new(0),
        }
    }

    fn round_trip<T>(&self, op: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        // Logical clerks carry no state of their own; the slot is
        // tracked so round trips are attributable in the logs.
        let slot = self.next.fetch_add(1, Ordering::Relaxed) % self.clerks;
        debug!("logical clerk {} using {}", slot, self.coord);

        let conn = self.manager.connection(&self.coord)?;
        let result = {
            let mut conn = lock(&conn)?;
            op(&mut conn)
        };
        if result.is_err() {
            // Connection state is unknown after a failed round trip;
            // the next call redials.
            self.manager.evict(&self.coord)?;
        }
        result
    }
}

impl ShardClerk for ConnManClerkPool {
    fn get(&self, key: u64) -> Result<Vec<u8>> {
        self.round_trip(|conn| conn.get(&key.to_be_bytes()))
    }

    fn put(&self, key: u64, value: &[u8]) -> Result<()> {
        self.round_trip(|conn| conn.put(&key.to_be_bytes(), value))
    }
}
