use log::info;

use super::{FieldMap, KeyEncoding, KvAdapter, single_field, single_value};
use crate::clerk::{ByteClerk, CoordClerkPool};
use crate::properties::Properties;
use crate::registry::AdapterFactory;
use crate::{AdapterError, Result};

/// Registry name of the coordinator-clerk adapter.
pub const COORD_ADAPTER: &str = "replkv";

/// Required property: address of the cluster coordinator.
pub const COORD_CONFIG_ADDR: &str = "replkv.configAddr";

/// Adapter over a replicated backend reached through one coordinator.
///
/// Records are keyed by the byte string `table + "/" + key`. The
/// backend has no create/update distinction, so Insert and Update are
/// the same upsert. Delete and Scan are not in its protocol.
pub struct CoordClerkAdapter<C: ByteClerk> {
    clerk: C,
    encoding: KeyEncoding,
}

impl<C: ByteClerk> CoordClerkAdapter<C> {
    /// Wraps a clerk. The adapter owns it for the benchmark run.
    pub fn new(clerk: C) -> Self {
        CoordClerkAdapter {
            clerk,
            encoding: KeyEncoding::StringConcat,
        }
    }
}

impl<C: ByteClerk> KvAdapter for CoordClerkAdapter<C> {
    fn read(&self, table: &str, key: &str, fields: &[&str]) -> Result<FieldMap> {
        let field = single_field(fields)?;
        let backend_key = self.encoding.encode(table, key)?.into_bytes()?;

        // Absence is not translated here: whatever the clerk returns
        // for a missing key goes back to the harness.
        let value = self.clerk.get(&backend_key)?;

        Ok(FieldMap::from([(field.to_string(), value)]))
    }

    fn insert(&self, table: &str, key: &str, values: &FieldMap) -> Result<()> {
        // Same upsert as update against this backend.
        self.update(table, key, values)
    }

    fn update(&self, table: &str, key: &str, values: &FieldMap) -> Result<()> {
        let value = single_value(values)?;
        let backend_key = self.encoding.encode(table, key)?.into_bytes()?;
        self.clerk.put(&backend_key, value)
    }

    fn delete(&self, _table: &str, _key: &str) -> Result<()> {
        Err(AdapterError::UnsupportedOperation("replkv: delete unimplemented"))
    }

    fn scan(
        &self,
        _table: &str,
        _start_key: &str,
        _count: usize,
        _fields: &[&str],
    ) -> Result<Vec<FieldMap>> {
        Err(AdapterError::UnsupportedOperation("replkv: scan not supported"))
    }
}

/// Builds a [`CoordClerkAdapter`] over a live [`CoordClerkPool`].
pub struct CoordClerkFactory;

impl AdapterFactory for CoordClerkFactory {
    fn create(&self, props: &Properties) -> Result<Box<dyn KvAdapter>> {
        let addr = props
            .get(COORD_CONFIG_ADDR)
            .ok_or(AdapterError::MissingProperty(COORD_CONFIG_ADDR))?;
        info!("replkv: clerk pool bound to coordinator {}", addr);
        let clerk = CoordClerkPool::connect(addr);
        Ok(Box::new(CoordClerkAdapter::new(clerk)))
    }
}
