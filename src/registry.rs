use std::collections::HashMap;

use log::debug;

use crate::adapters::{
    CONNMAN_ADAPTER, COORD_ADAPTER, ConnManagedFactory, CoordClerkFactory, KvAdapter,
    SHARDED_ADAPTER, ShardedPoolFactory,
};
use crate::properties::Properties;
use crate::{AdapterError, Result};

/// Turns declarative configuration into a live adapter.
pub trait AdapterFactory: Send + Sync {
    /// Builds an adapter from the property store. The store is read
    /// here once and never again.
    fn create(&self, props: &Properties) -> Result<Box<dyn KvAdapter>>;
}

impl<F> AdapterFactory for F
where
    F: Fn(&Properties) -> Result<Box<dyn KvAdapter>> + Send + Sync,
{
    fn create(&self, props: &Properties) -> Result<Box<dyn KvAdapter>> {
        self(props)
    }
}

/// Named table of adapter factories.
///
/// Built once at startup and handed to whatever component creates
/// adapters; there is no process-global registry. Registration under
/// an existing name replaces the previous factory (last writer wins),
/// a caveat rather than an error.
#[derive(Default)]
pub struct AdapterRegistry {
    factories: HashMap<String, Box<dyn AdapterFactory>>,
}

impl AdapterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        AdapterRegistry::default()
    }

    /// Creates a registry with the three stock adapters installed.
    pub fn with_builtin() -> Self {
        let mut registry = AdapterRegistry::new();
        registry.register(COORD_ADAPTER, Box::new(CoordClerkFactory));
        registry.register(SHARDED_ADAPTER, Box::new(ShardedPoolFactory));
        registry.register(CONNMAN_ADAPTER, Box::new(ConnManagedFactory::default()));
        registry
    }

    /// Installs a factory under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, factory: Box<dyn AdapterFactory>) {
        let name = name.into();
        debug!("registering adapter factory {:?}", name);
        self.factories.insert(name, factory);
    }

    /// Looks up the factory for `name` and invokes it.
    pub fn create(&self, name: &str, props: &Properties) -> Result<Box<dyn KvAdapter>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| AdapterError::UnknownAdapter(name.to_string()))?;
        factory.create(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{CONNMAN_COORD, COORD_CONFIG_ADDR, CoordClerkAdapter};
    use crate::clerk::mock::MockByteStore;

    fn mock_factory(marker: &'static str) -> Box<dyn AdapterFactory> {
        Box::new(move |props: &Properties| {
            if props.get("marker") == Some(marker) {
                Ok(Box::new(CoordClerkAdapter::new(MockByteStore::new())) as Box<dyn KvAdapter>)
            } else {
                Err(AdapterError::MissingProperty("marker"))
            }
        })
    }

    #[test]
    fn unknown_names_are_rejected() {
        let registry = AdapterRegistry::with_builtin();
        assert!(matches!(
            registry.create("nosuchkv", &Properties::new()),
            Err(AdapterError::UnknownAdapter(_))
        ));
    }

    #[test]
    fn registered_factories_are_invoked_with_the_properties() {
        let mut registry = AdapterRegistry::new();
        registry.register("mockkv", mock_factory("a"));

        let mut props = Properties::new();
        props.set("marker", "a");
        assert!(registry.create("mockkv", &props).is_ok());
        assert!(registry.create("mockkv", &Properties::new()).is_err());
    }

    #[test]
    fn reregistration_is_last_writer_wins() {
        let mut registry = AdapterRegistry::new();
        registry.register("mockkv", mock_factory("a"));
        registry.register("mockkv", mock_factory("b"));

        let mut props = Properties::new();
        props.set("marker", "b");
        assert!(registry.create("mockkv", &props).is_ok());

        props.set("marker", "a");
        assert!(registry.create("mockkv", &props).is_err());
    }

    #[test]
    fn builtin_factories_enforce_their_required_properties() {
        let registry = AdapterRegistry::with_builtin();

        assert!(matches!(
            registry.create("replkv", &Properties::new()),
            Err(AdapterError::MissingProperty(COORD_CONFIG_ADDR))
        ));
        assert!(matches!(
            registry.create("connkv", &Properties::new()),
            Err(AdapterError::MissingProperty(CONNMAN_COORD))
        ));

        // shardkv needs nothing: clients defaults to 100 and the pool
        // dials lazily.
        assert!(registry.create("shardkv", &Properties::new()).is_ok());
    }
}
