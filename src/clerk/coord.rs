use std::sync::Mutex;

use log::debug;

use super::{ByteClerk, Connection, lock};
use crate::Result;

/// A pool clerk bound to a single coordinator address.
///
/// Connections are dialed on demand and kept on a free list between
/// round trips, so concurrent callers each get a connection to
/// themselves. A connection that fails mid round trip is dropped
/// rather than returned to the pool.
pub struct CoordClerkPool {
    addr: String,
    idle: Mutex<Vec<Connection>>,
}

impl CoordClerkPool {
    /// Binds a pool to the coordinator at `addr`. No connection is
    /// dialed until the first operation.
    pub fn connect(addr: impl Into<String>) -> CoordClerkPool {
        CoordClerkPool {
            addr: addr.into(),
            idle: Mutex::new(Vec::new()),
        }
    }

    fn checkout(&self) -> Result<Connection> {
        if let Some(conn) = lock(&self.idle)?.pop() {
            return Ok(conn);
        }
        debug!("dialing coordinator at {}", self.addr);
        Connection::connect(&self.addr)
    }

    fn checkin(&self, conn: Connection) -> Result<()> {
        lock(&self.idle)?.push(conn);
        Ok(())
    }
}

impl ByteClerk for CoordClerkPool {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let mut conn = self.checkout()?;
        let value = conn.get(key)?;
        self.checkin(conn)?;
        Ok(value)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut conn = self.checkout()?;
        conn.put(key, value)?;
        self.checkin(conn)?;
        Ok(())
    }
}
