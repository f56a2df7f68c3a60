//! Client-side clerks for the backend clusters.
//!
//! Each clerk embodies the minimal surface the adapters consume: a
//! blocking `get` and `put`. Everything else about the backends
//! (replication, sharding, retry) is behind the wire and none of this
//! layer's business.

use std::io::{BufReader, BufWriter, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::{AdapterError, Result};

mod connman;
mod coord;
mod sharded;

pub use self::connman::{ConnManClerkPool, ConnManager};
pub use self::coord::CoordClerkPool;
pub use self::sharded::ShardClerkPool;

/// A clerk over a backend keyed by opaque byte strings.
pub trait ByteClerk: Send + Sync + 'static {
    /// Blocking point read. Absence behavior is backend-defined.
    fn get(&self, key: &[u8]) -> Result<Vec<u8>>;

    /// Blocking upsert.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;
}

/// A clerk over a backend keyed by unsigned 64-bit integers.
pub trait ShardClerk: Send + Sync + 'static {
    /// Blocking point read by numeric key.
    fn get(&self, key: u64) -> Result<Vec<u8>>;

    /// Blocking upsert by numeric key.
    fn put(&self, key: u64, value: &[u8]) -> Result<()>;
}

#[derive(Serialize, Deserialize, Debug)]
enum Request {
    Get { key: Vec<u8> },
    Put { key: Vec<u8>, value: Vec<u8> },
}

#[derive(Serialize, Deserialize, Debug)]
enum GetResponse {
    Ok(Vec<u8>),
    Err(String),
}

#[derive(Serialize, Deserialize, Debug)]
enum PutResponse {
    Ok(()),
    Err(String),
}

/// One framed TCP connection to a backend node.
///
/// Frames are a u32 big-endian length prefix followed by a bincode
/// payload, request and response alike.
pub(crate) struct Connection {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Connection {
    pub(crate) fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let tcp_reader = TcpStream::connect(addr)?;
        let tcp_writer = tcp_reader.try_clone()?;
        Ok(Connection {
            reader: BufReader::new(tcp_reader),
            writer: BufWriter::new(tcp_writer),
        })
    }

    fn send<T: Serialize>(&mut self, request: &T) -> Result<()> {
        let serialized = bincode::serialize(request)?;

        let len = serialized.len() as u32;
        self.writer.write_all(&len.to_be_bytes())?;
        self.writer.write_all(&serialized)?;
        self.writer.flush()?;

        Ok(())
    }

    fn receive<T: for<'de> Deserialize<'de>>(&mut self) -> Result<T> {
        let mut len_bytes = [0u8; 4];
        self.reader.read_exact(&mut len_bytes)?;
        let len = u32::from_be_bytes(len_bytes) as usize;

        let mut buf = vec![0; len];
        self.reader.read_exact(&mut buf)?;
        let result = bincode::deserialize(&buf)?;

        Ok(result)
    }

    pub(crate) fn get(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        self.send(&Request::Get { key: key.to_vec() })?;

        match self.receive()? {
            GetResponse::Ok(value) => Ok(value),
            GetResponse::Err(e) => Err(AdapterError::TransportFailure(e)),
        }
    }

    pub(crate) fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.send(&Request::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;

        match self.receive()? {
            PutResponse::Ok(()) => Ok(()),
            PutResponse::Err(e) => Err(AdapterError::TransportFailure(e)),
        }
    }
}

/// Locks a clerk-internal mutex, surfacing poisoning as a transport
/// failure rather than panicking in a harness worker thread.
pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| AdapterError::TransportFailure("clerk mutex poisoned".into()))
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory stand-ins for the wire clerks, for adapter tests.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::{ByteClerk, ShardClerk};
    use crate::Result;

    /// `Get`/`Put` over an in-memory map with byte-string keys. A
    /// missing key reads as empty bytes, matching the wire clerks'
    /// no-absence-translation behavior.
    #[derive(Clone, Default)]
    pub(crate) struct MockByteStore {
        data: Arc<Mutex<HashMap<Vec<u8>, Vec<u8>>>>,
    }

    impl MockByteStore {
        pub(crate) fn new() -> Self {
            MockByteStore::default()
        }

        /// The value stored under `key`, if any.
        pub(crate) fn stored(&self, key: &[u8]) -> Option<Vec<u8>> {
            self.data.lock().unwrap().get(key).cloned()
        }
    }

    impl ByteClerk for MockByteStore {
        fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
            Ok(self.data.lock().unwrap().get(key).cloned().unwrap_or_default())
        }

        fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
            self.data.lock().unwrap().insert(key.to_vec(), value.to_vec());
            Ok(())
        }
    }

    /// `Get`/`Put` over an in-memory map with numeric keys.
    #[derive(Clone, Default)]
    pub(crate) struct MockShardStore {
        data: Arc<Mutex<HashMap<u64, Vec<u8>>>>,
    }

    impl MockShardStore {
        pub(crate) fn new() -> Self {
            MockShardStore::default()
        }

        pub(crate) fn stored(&self, key: u64) -> Option<Vec<u8>> {
            self.data.lock().unwrap().get(&key).cloned()
        }
    }

    impl ShardClerk for MockShardStore {
        fn get(&self, key: u64) -> Result<Vec<u8>> {
            Ok(self.data.lock().unwrap().get(&key).cloned().unwrap_or_default())
        }

        fn put(&self, key: u64, value: &[u8]) -> Result<()> {
            self.data.lock().unwrap().insert(key, value.to_vec());
            Ok(())
        }
    }
}
