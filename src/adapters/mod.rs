//! The abstract contract a benchmark harness drives and the three
//! backend adapters that implement it.

use std::collections::HashMap;

use crate::{AdapterError, Result};

mod connman;
mod coord;
mod sharded;

pub use self::connman::{
    CONNMAN_ADAPTER, CONNMAN_CLIENTS, CONNMAN_COORD, ConnManagedAdapter, ConnManagedFactory,
};
pub use self::coord::{COORD_ADAPTER, COORD_CONFIG_ADDR, CoordClerkAdapter, CoordClerkFactory};
pub use self::sharded::{
    SHARDED_ADAPTER, SHARDED_CLIENTS, ShardedPoolAdapter, ShardedPoolFactory,
};

/// A harness record's fields: field name to opaque bytes.
pub type FieldMap = HashMap<String, Vec<u8>>;

/// Opaque token the harness threads through the lifecycle hooks.
///
/// Adapters never inspect it; the default hooks return it unchanged,
/// which is the policy that no per-thread state exists and concurrent
/// calls need no setup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadContext(u64);

impl ThreadContext {
    /// Creates a context carrying an arbitrary harness-chosen token.
    pub fn new(token: u64) -> Self {
        ThreadContext(token)
    }
}

/// How an adapter turns a `(table, key)` record identity into its
/// backend's native key. Selected once at construction; the two
/// encodings target incompatible backend keyspaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEncoding {
    /// `table + "/" + key`, used verbatim as an opaque byte string.
    StringConcat,
    /// `key` parsed as a base-10 u64; the table name is dropped.
    DecimalUint64,
}

/// A backend-native key produced by a [`KeyEncoding`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKey {
    /// Opaque byte-string key
    Bytes(Vec<u8>),
    /// Numeric key
    Numeric(u64),
}

impl KeyEncoding {
    /// Encodes a record identity into the backend keyspace.
    pub fn encode(&self, table: &str, key: &str) -> Result<BackendKey> {
        match self {
            KeyEncoding::StringConcat => {
                Ok(BackendKey::Bytes(format!("{}/{}", table, key).into_bytes()))
            }
            KeyEncoding::DecimalUint64 => key
                .parse::<u64>()
                .map(BackendKey::Numeric)
                .map_err(|_| AdapterError::InvalidKeyFormat(key.to_string())),
        }
    }
}

impl BackendKey {
    fn describe(&self) -> &'static str {
        match self {
            BackendKey::Bytes(_) => "byte-string",
            BackendKey::Numeric(_) => "numeric",
        }
    }

    /// The byte-string form, or an error if the encoding produced a
    /// numeric key.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            BackendKey::Bytes(k) => Ok(k),
            other => Err(AdapterError::InvalidKeyFormat(other.describe().into())),
        }
    }

    /// The numeric form, or an error if the encoding produced a
    /// byte-string key.
    pub fn into_numeric(self) -> Result<u64> {
        match self {
            BackendKey::Numeric(k) => Ok(k),
            other => Err(AdapterError::InvalidKeyFormat(other.describe().into())),
        }
    }
}

/// The contract every backend adapter implements.
///
/// `&self` methods plus `Send + Sync`: one adapter instance is shared
/// by all harness worker threads, and thread-safety of the underlying
/// round trips is the clerk's guarantee, not the adapter's. Each call
/// is a direct synchronous round trip; adapters do no queuing,
/// batching, retrying, or caching.
pub trait KvAdapter: Send + Sync {
    /// Reads the record's single field.
    ///
    /// `fields` must name exactly one field; the returned map has one
    /// entry keyed by that name.
    fn read(&self, table: &str, key: &str, fields: &[&str]) -> Result<FieldMap>;

    /// Inserts a record with a single value.
    fn insert(&self, table: &str, key: &str, values: &FieldMap) -> Result<()>;

    /// Updates a record with a single value.
    fn update(&self, table: &str, key: &str, values: &FieldMap) -> Result<()>;

    /// Deletes a record.
    fn delete(&self, table: &str, key: &str) -> Result<()>;

    /// Scans `count` records starting at `start_key`.
    fn scan(
        &self,
        table: &str,
        start_key: &str,
        count: usize,
        fields: &[&str],
    ) -> Result<Vec<FieldMap>>;

    /// Releases the adapter. The clerks manage their own resources, so
    /// the default is a no-op that cannot fail.
    fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Per-thread setup hook. The default returns the context
    /// unchanged: adapters keep no per-thread state.
    fn init_thread(&self, ctx: ThreadContext, _thread_id: usize, _thread_count: usize) -> ThreadContext {
        ctx
    }

    /// Per-thread teardown hook, a no-op by default.
    fn cleanup_thread(&self, _ctx: ThreadContext) {}
}

/// Enforces the exactly-one-field invariant on a Read field list.
pub(crate) fn single_field<'a>(fields: &[&'a str]) -> Result<&'a str> {
    match fields {
        [field] => Ok(field),
        _ => Err(AdapterError::InvalidFieldCount {
            expected: 1,
            got: fields.len(),
        }),
    }
}

/// Enforces the exactly-one-value invariant on Insert/Update values.
///
/// The field name is discarded: the backends store a single opaque
/// value per key, not a multi-field row.
pub(crate) fn single_value(values: &FieldMap) -> Result<&[u8]> {
    if values.len() != 1 {
        return Err(AdapterError::InvalidFieldCount {
            expected: 1,
            got: values.len(),
        });
    }
    let value = values.values().next().expect("len checked above");
    Ok(value.as_slice())
}
