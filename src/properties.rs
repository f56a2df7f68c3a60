use std::collections::HashMap;

use crate::{AdapterError, Result};

/// Flat string-keyed property store handed to adapter factories.
///
/// Consumed once at construction time; factories never mutate or
/// re-read it afterwards. Keys follow the `section.key` convention
/// (`replkv.configAddr`, `shardkv.clients`).
#[derive(Debug, Default, Clone)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Creates an empty store.
    pub fn new() -> Self {
        Properties::default()
    }

    /// Sets a property, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Looks up a property.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Looks up a property, falling back to `default`.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Looks up an integer property, falling back to `default`.
    ///
    /// A present but non-numeric value is a configuration error.
    pub fn get_u64_or(&self, key: &str, default: u64) -> Result<u64> {
        match self.get(key) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AdapterError::InvalidProperties(format!("{}: expected an integer, got {:?}", key, raw))
            }),
            None => Ok(default),
        }
    }

    /// Parses a TOML document into properties.
    ///
    /// Top-level scalars map directly; one level of table nesting
    /// flattens to `section.key`. Deeper nesting is rejected.
    pub fn from_toml_str(input: &str) -> Result<Properties> {
        let table: toml::Table = input
            .parse()
            .map_err(|e: toml::de::Error| AdapterError::InvalidProperties(e.to_string()))?;

        let mut props = Properties::new();
        for (key, value) in table {
            match value {
                toml::Value::Table(section) => {
                    for (sub, value) in section {
                        let flat = format!("{}.{}", key, sub);
                        let rendered = scalar_to_string(&flat, value)?;
                        props.set(flat, rendered);
                    }
                }
                other => {
                    let rendered = scalar_to_string(&key, other)?;
                    props.set(key, rendered);
                }
            }
        }
        Ok(props)
    }
}

fn scalar_to_string(key: &str, value: toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        other => Err(AdapterError::InvalidProperties(format!(
            "{}: unsupported value {:?}",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AdapterError;

    #[test]
    fn get_or_falls_back() {
        let mut props = Properties::new();
        props.set("shardkv.clients", "8");
        assert_eq!(props.get_or("shardkv.clients", "100"), "8");
        assert_eq!(props.get_or("connkv.clients", "100"), "100");
    }

    #[test]
    fn get_u64_or_parses_and_defaults() {
        let mut props = Properties::new();
        props.set("shardkv.clients", "8");
        assert_eq!(props.get_u64_or("shardkv.clients", 100).unwrap(), 8);
        assert_eq!(props.get_u64_or("connkv.clients", 100).unwrap(), 100);
    }

    #[test]
    fn get_u64_or_rejects_garbage() {
        let mut props = Properties::new();
        props.set("shardkv.clients", "many");
        assert!(matches!(
            props.get_u64_or("shardkv.clients", 100),
            Err(AdapterError::InvalidProperties(_))
        ));
    }

    #[test]
    fn toml_sections_flatten() {
        let props = Properties::from_toml_str(
            r#"
            [replkv]
            configAddr = "127.0.0.1:4001"

            [shardkv]
            clients = 8
            "#,
        )
        .unwrap();
        assert_eq!(props.get("replkv.configAddr"), Some("127.0.0.1:4001"));
        assert_eq!(props.get("shardkv.clients"), Some("8"));
    }

    #[test]
    fn toml_garbage_is_rejected() {
        assert!(matches!(
            Properties::from_toml_str("not = toml ="),
            Err(AdapterError::InvalidProperties(_))
        ));
    }
}
