use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;

use super::{Connection, ShardClerk, lock};
use crate::Result;

/// The fixed shard topology: one address per shard server. Numeric
/// keys route to `key % SHARD_ADDRS.len()`.
const SHARD_ADDRS: &[&str] = &["127.0.0.1:4100"];

/// A logical client: one lazily dialed connection per shard it has
/// talked to.
#[derive(Default)]
struct LogicalClient {
    conns: HashMap<usize, Connection>,
}

/// A pool of logical clients over the fixed shard topology.
///
/// Callers are spread round-robin across the logical clients; each
/// client serializes its own round trips, so the pool size bounds
/// in-flight concurrency.
pub struct ShardClerkPool {
    clients: Vec<Mutex<LogicalClient>>,
    next: AtomicUsize,
}

impl ShardClerkPool {
    /// Builds a pool of `clients` logical clients.
    pub fn new(clients: usize) -> ShardClerkPool {
        let clients = clients.max(1);
        ShardClerkPool {
            clients: (0..clients).map(|_| Mutex::new(LogicalClient::default())).collect(),
            next: AtomicUsize::new(0),
        }
    }

    fn with_shard<T>(
        &self,
        key: u64,
        op: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let shard = (key % SHARD_ADDRS.len() as u64) as usize;
        let slot = self.next.fetch_add(1, Ordering::Relaxed) % self.clients.len();

        let mut client = lock(&self.clients[slot])?;
        if !client.conns.contains_key(&shard) {
            debug!("client {} dialing shard {} at {}", slot, shard, SHARD_ADDRS[shard]);
            let conn = Connection::connect(SHARD_ADDRS[shard])?;
            client.conns.insert(shard, conn);
        }
        let conn = client.conns.get_mut(&shard).expect("inserted above");

        let result = op(conn);
        if result.is_err() {
            // Connection state is unknown after a failed round trip.
            client.conns.remove(&shard);
        }
        result
    }
}

impl ShardClerk for ShardClerkPool {
    fn get(&self, key: u64) -> Result<Vec<u8>> {
        self.with_shard(key, |conn| conn.get(&key.to_be_bytes()))
    }

    fn put(&self, key: u64, value: &[u8]) -> Result<()> {
        self.with_shard(key, |conn| conn.put(&key.to_be_bytes(), value))
    }
}
