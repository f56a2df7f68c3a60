use log::info;

use super::{FieldMap, KeyEncoding, KvAdapter, single_field, single_value};
use crate::clerk::{ShardClerk, ShardClerkPool};
use crate::properties::Properties;
use crate::registry::AdapterFactory;
use crate::{AdapterError, Result};

/// Registry name of the sharded-pool adapter.
pub const SHARDED_ADAPTER: &str = "shardkv";

/// Property: number of logical clients in the pool.
pub const SHARDED_CLIENTS: &str = "shardkv.clients";

/// Default pool size when the property is absent.
pub const SHARDED_CLIENTS_DEFAULT: u64 = 100;

/// Adapter over a sharded backend keyed by unsigned 64-bit integers.
///
/// The record key must be the decimal form of a u64; the table name is
/// dropped. The backend's protocol only has an idempotent upsert, so
/// Insert is refused outright to keep callers on Update. Delete and
/// Scan are not in its protocol.
pub struct ShardedPoolAdapter<C: ShardClerk> {
    clerk: C,
    encoding: KeyEncoding,
}

impl<C: ShardClerk> ShardedPoolAdapter<C> {
    /// Wraps a clerk pool. The adapter owns it for the benchmark run.
    pub fn new(clerk: C) -> Self {
        ShardedPoolAdapter {
            clerk,
            encoding: KeyEncoding::DecimalUint64,
        }
    }
}

impl<C: ShardClerk> KvAdapter for ShardedPoolAdapter<C> {
    fn read(&self, table: &str, key: &str, fields: &[&str]) -> Result<FieldMap> {
        let field = single_field(fields)?;
        let backend_key = self.encoding.encode(table, key)?.into_numeric()?;
        let value = self.clerk.get(backend_key)?;
        Ok(FieldMap::from([(field.to_string(), value)]))
    }

    fn insert(&self, _table: &str, _key: &str, _values: &FieldMap) -> Result<()> {
        // Refused before any argument validation: there is no create
        // operation to map this onto, only the upsert behind update.
        Err(AdapterError::UnsupportedOperation("shardkv: use update instead of insert"))
    }

    fn update(&self, table: &str, key: &str, values: &FieldMap) -> Result<()> {
        let value = single_value(values)?;
        let backend_key = self.encoding.encode(table, key)?.into_numeric()?;
        self.clerk.put(backend_key, value)
    }

    fn delete(&self, _table: &str, _key: &str) -> Result<()> {
        Err(AdapterError::UnsupportedOperation("shardkv: delete unimplemented"))
    }

    fn scan(
        &self,
        _table: &str,
        _start_key: &str,
        _count: usize,
        _fields: &[&str],
    ) -> Result<Vec<FieldMap>> {
        Err(AdapterError::UnsupportedOperation("shardkv: scan not supported"))
    }
}

/// Builds a [`ShardedPoolAdapter`] over a live [`ShardClerkPool`].
pub struct ShardedPoolFactory;

impl AdapterFactory for ShardedPoolFactory {
    fn create(&self, props: &Properties) -> Result<Box<dyn KvAdapter>> {
        let clients = props.get_u64_or(SHARDED_CLIENTS, SHARDED_CLIENTS_DEFAULT)?;
        info!("shardkv: pool of {} logical clients", clients);
        let clerk = ShardClerkPool::new(clients as usize);
        Ok(Box::new(ShardedPoolAdapter::new(clerk)))
    }
}
