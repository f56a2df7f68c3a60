use std::sync::Arc;

use log::info;

use super::{FieldMap, KeyEncoding, KvAdapter, single_field, single_value};
use crate::clerk::{ConnManClerkPool, ConnManager, ShardClerk};
use crate::properties::Properties;
use crate::registry::AdapterFactory;
use crate::{AdapterError, Result};

/// Registry name of the connection-managed adapter.
pub const CONNMAN_ADAPTER: &str = "connkv";

/// Required property: address of the cluster coordinator.
pub const CONNMAN_COORD: &str = "connkv.coord";

/// Property: number of logical clerks multiplexed over the manager.
pub const CONNMAN_CLIENTS: &str = "connkv.clients";

/// Default logical clerk count when the property is absent.
pub const CONNMAN_CLIENTS_DEFAULT: u64 = 100;

/// Adapter over a numeric-keyed backend reached through a coordinator
/// clerk whose connections come from a shared connection manager.
///
/// Same contract surface as the sharded-pool adapter: decimal-u64
/// keys, table dropped, Insert refused in favor of the upsert behind
/// Update, no Delete or Scan.
pub struct ConnManagedAdapter<C: ShardClerk> {
    clerk: C,
    encoding: KeyEncoding,
}

impl<C: ShardClerk> ConnManagedAdapter<C> {
    /// Wraps a clerk. The adapter owns it for the benchmark run.
    pub fn new(clerk: C) -> Self {
        ConnManagedAdapter {
            clerk,
            encoding: KeyEncoding::DecimalUint64,
        }
    }
}

impl<C: ShardClerk> KvAdapter for ConnManagedAdapter<C> {
    fn read(&self, table: &str, key: &str, fields: &[&str]) -> Result<FieldMap> {
        let field = single_field(fields)?;
        let backend_key = self.encoding.encode(table, key)?.into_numeric()?;
        let value = self.clerk.get(backend_key)?;
        Ok(FieldMap::from([(field.to_string(), value)]))
    }

    fn insert(&self, _table: &str, _key: &str, _values: &FieldMap) -> Result<()> {
        Err(AdapterError::UnsupportedOperation("connkv: use update instead of insert"))
    }

    fn update(&self, table: &str, key: &str, values: &FieldMap) -> Result<()> {
        let value = single_value(values)?;
        let backend_key = self.encoding.encode(table, key)?.into_numeric()?;
        self.clerk.put(backend_key, value)
    }

    fn delete(&self, _table: &str, _key: &str) -> Result<()> {
        Err(AdapterError::UnsupportedOperation("connkv: delete unimplemented"))
    }

    fn scan(
        &self,
        _table: &str,
        _start_key: &str,
        _count: usize,
        _fields: &[&str],
    ) -> Result<Vec<FieldMap>> {
        Err(AdapterError::UnsupportedOperation("connkv: scan not supported"))
    }
}

/// Builds a [`ConnManagedAdapter`] over a [`ConnManClerkPool`].
///
/// The factory holds the connection manager, so every adapter it
/// creates shares the same physical connections.
pub struct ConnManagedFactory {
    manager: Arc<ConnManager>,
}

impl ConnManagedFactory {
    /// Builds a factory multiplexing over `manager`.
    pub fn new(manager: Arc<ConnManager>) -> Self {
        ConnManagedFactory { manager }
    }
}

impl Default for ConnManagedFactory {
    fn default() -> Self {
        ConnManagedFactory::new(Arc::new(ConnManager::new()))
    }
}

impl AdapterFactory for ConnManagedFactory {
    fn create(&self, props: &Properties) -> Result<Box<dyn KvAdapter>> {
        let coord = props
            .get(CONNMAN_COORD)
            .ok_or(AdapterError::MissingProperty(CONNMAN_COORD))?;
        let clients = props.get_u64_or(CONNMAN_CLIENTS, CONNMAN_CLIENTS_DEFAULT)?;
        info!("connkv: {} logical clerks against coordinator {}", clients, coord);
        let clerk = ConnManClerkPool::new(coord, Arc::clone(&self.manager), clients as usize);
        Ok(Box::new(ConnManagedAdapter::new(clerk)))
    }
}
