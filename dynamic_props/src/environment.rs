//! Layered property resolution.
//!
//! An [`Environment`] owns an ordered [`PropertySources`] chain and resolves
//! each key against the first layer that holds a non-null value for it.

use figment::value::Value;
use serde::de::DeserializeOwned;

use crate::value::is_null;
use crate::{DynamicPropertyError, PropertyResult, PropertySource};

/// Mutable, ordered chain of named property layers.
///
/// Index zero is searched first. Adding a layer whose name is already present
/// removes the existing layer before inserting the new one.
#[derive(Default)]
pub struct PropertySources {
    sources: Vec<Box<dyn PropertySource>>,
}

impl PropertySources {
    /// Create an empty chain.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Insert `source` with the highest precedence.
    pub fn add_first(&mut self, source: Box<dyn PropertySource>) {
        self.remove(source.name());
        self.sources.insert(0, source);
    }

    /// Insert `source` with the lowest precedence.
    pub fn add_last(&mut self, source: Box<dyn PropertySource>) {
        self.remove(source.name());
        self.sources.push(source);
    }

    /// Remove and return the layer named `name`.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn PropertySource>> {
        let slot = self.sources.iter().position(|s| s.name() == name)?;
        Some(self.sources.remove(slot))
    }

    /// Look up the layer named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn PropertySource> {
        self.sources
            .iter()
            .find(|s| s.name() == name)
            .map(|source| -> &dyn PropertySource { source.as_ref() })
    }

    /// Returns `true` when a layer named `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Layer names in precedence order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Iterate layers in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn PropertySource> {
        self.sources
            .iter()
            .map(|source| -> &dyn PropertySource { source.as_ref() })
    }

    /// Number of layers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` when the chain has no layers.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl std::fmt::Debug for PropertySources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Resolves properties against an ordered chain of layers.
#[derive(Debug, Default)]
pub struct Environment {
    sources: PropertySources,
}

impl Environment {
    /// Create an environment with no layers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: PropertySources::new(),
        }
    }

    /// The layer chain, in precedence order.
    #[must_use]
    pub const fn property_sources(&self) -> &PropertySources {
        &self.sources
    }

    /// Mutable access to the layer chain.
    pub const fn property_sources_mut(&mut self) -> &mut PropertySources {
        &mut self.sources
    }

    /// Returns `true` when any layer contains `key`.
    #[must_use]
    pub fn contains_property(&self, key: &str) -> bool {
        self.sources.iter().any(|s| s.contains_property(key))
    }

    /// Resolve `key` to the first non-null value in the chain.
    ///
    /// # Errors
    ///
    /// Propagates failures raised while producing a value.
    pub fn property(&self, key: &str) -> PropertyResult<Option<Value>> {
        for source in self.sources.iter() {
            match source.property(key)? {
                Some(value) if !is_null(&value) => {
                    tracing::trace!(key, source = source.name(), "resolved property");
                    return Ok(Some(value));
                }
                _ => {}
            }
        }
        tracing::trace!(key, "property not found in any source");
        Ok(None)
    }

    /// Resolve `key`, failing when no layer provides a value.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicPropertyError::MissingProperty`] when the key cannot
    /// be resolved, or any failure raised while producing the value.
    pub fn required_property(&self, key: &str) -> PropertyResult<Value> {
        self.property(key)?
            .ok_or_else(|| DynamicPropertyError::MissingProperty {
                key: key.to_owned(),
            })
    }

    /// Resolve `key` and deserialize it into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicPropertyError::Conversion`] when the value cannot be
    /// represented as `T`, or any failure raised while producing it.
    pub fn property_as<T: DeserializeOwned>(&self, key: &str) -> PropertyResult<Option<T>> {
        self.property(key)?
            .map(|value| {
                value
                    .deserialize::<T>()
                    .map_err(|err| DynamicPropertyError::conversion(key, err))
            })
            .transpose()
    }

    /// Resolve `key` into `T`, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicPropertyError::MissingProperty`] when the key cannot
    /// be resolved and [`DynamicPropertyError::Conversion`] when it cannot be
    /// represented as `T`.
    pub fn required_property_as<T: DeserializeOwned>(&self, key: &str) -> PropertyResult<T> {
        self.property_as(key)?
            .ok_or_else(|| DynamicPropertyError::MissingProperty {
                key: key.to_owned(),
            })
    }
}
