#![deny(missing_docs)]
//! Adapters that let a generic key/value benchmark harness drive
//! several distributed KV backends through one uniform contract.

pub use adapters::{FieldMap, KeyEncoding, KvAdapter, ThreadContext};
pub use error::{AdapterError, Result};
pub use properties::Properties;
pub use registry::{AdapterFactory, AdapterRegistry};

pub mod adapters;
pub mod clerk;
mod error;
mod properties;
mod registry;
