//! Named property layers consulted by an [`crate::Environment`].

use std::collections::HashMap;

use figment::Figment;
use figment::value::{Dict, Value};

use crate::value::ValueSupplier;
use crate::{DynamicPropertyError, DynamicPropertyValues, PropertyResult};

/// Name reserved for the layer installed by
/// [`crate::DynamicPropertiesContextCustomizer`].
pub const DYNAMIC_PROPERTIES_SOURCE_NAME: &str = "Dynamic Test Properties";

/// A named, enumerable source of property values.
pub trait PropertySource {
    /// Name identifying this layer within a [`crate::PropertySources`] chain.
    fn name(&self) -> &str;

    /// Resolve `key` in this layer.
    ///
    /// Returns `Ok(None)` when the key is absent. A present key may resolve
    /// to a null value (see [`crate::value::null_value`]).
    ///
    /// # Errors
    ///
    /// Returns an error when producing the value fails.
    fn property(&self, key: &str) -> PropertyResult<Option<Value>>;

    /// Returns `true` when `key` is present without producing its value.
    fn contains_property(&self, key: &str) -> bool;

    /// All keys in this layer, in the order the layer defines.
    fn property_names(&self) -> Vec<String>;
}

/// Ordered lookup table shared by the concrete layers.
#[derive(Debug)]
struct OrderedEntries<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> OrderedEntries<V> {
    /// Insert `value`, replacing an existing key in place.
    fn insert(&mut self, key: String, value: V) {
        if let Some(entry) = self
            .index
            .get(&key)
            .and_then(|&slot| self.entries.get_mut(slot))
        {
            entry.1 = value;
            return;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
    }

    fn get(&self, key: &str) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.entries.get(slot).map(|(_, value)| value)
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }
}

impl<V> FromIterator<(String, V)> for OrderedEntries<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut ordered = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for (key, value) in iter {
            ordered.insert(key, value);
        }
        ordered
    }
}

/// Layer whose values are produced lazily each time a key is read.
///
/// Suppliers are never cached: two reads of the same key invoke the supplier
/// twice and may observe different results.
#[derive(Debug)]
pub struct DynamicValuesPropertySource {
    name: String,
    suppliers: OrderedEntries<ValueSupplier>,
}

impl DynamicValuesPropertySource {
    /// Build a layer named `name` from the suppliers collected in `values`.
    ///
    /// # Errors
    ///
    /// Returns the first argument violation recorded by `values`.
    pub fn new(name: impl Into<String>, values: DynamicPropertyValues) -> PropertyResult<Self> {
        Ok(Self {
            name: name.into(),
            suppliers: values.into_suppliers()?.into_iter().collect(),
        })
    }
}

impl PropertySource for DynamicValuesPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn property(&self, key: &str) -> PropertyResult<Option<Value>> {
        let Some(supplier) = self.suppliers.get(key) else {
            return Ok(None);
        };
        tracing::trace!(source = %self.name, key, "invoking dynamic value supplier");
        supplier.get().map(Some).map_err(DynamicPropertyError::User)
    }

    fn contains_property(&self, key: &str) -> bool {
        self.suppliers.contains(key)
    }

    fn property_names(&self) -> Vec<String> {
        self.suppliers.keys()
    }
}

/// Layer holding fixed values, typically gathered from a [`Figment`].
#[derive(Debug)]
pub struct MapPropertySource {
    name: String,
    values: OrderedEntries<Value>,
}

impl MapPropertySource {
    /// Build a layer named `name` from key/value pairs, keeping their order.
    ///
    /// A repeated key keeps its first position and takes the last value.
    pub fn new<I, K>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }

    /// Gather `figment` and flatten nested tables into dotted keys.
    ///
    /// ```
    /// use dynamic_props::{MapPropertySource, PropertySource};
    /// use figment::{Figment, providers::{Format, Toml}};
    ///
    /// let figment = Figment::from(Toml::string("[test.redis]\nport = 6379"));
    /// let source = MapPropertySource::from_figment("application.toml", &figment)?;
    /// assert!(source.contains_property("test.redis.port"));
    /// # Ok::<_, dynamic_props::DynamicPropertyError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`DynamicPropertyError::Figment`] when the providers fail.
    pub fn from_figment(name: impl Into<String>, figment: &Figment) -> PropertyResult<Self> {
        let dict: Dict = figment.extract()?;
        let mut flattened = Vec::new();
        flatten_into(None, dict, &mut flattened);
        Ok(Self::new(name, flattened))
    }
}

fn flatten_into(prefix: Option<&str>, dict: Dict, out: &mut Vec<(String, Value)>) {
    for (key, value) in dict {
        let path = prefix.map_or_else(|| key.clone(), |p| format!("{p}.{key}"));
        match value {
            Value::Dict(_, nested) => flatten_into(Some(&path), nested, out),
            other => out.push((path, other)),
        }
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn property(&self, key: &str) -> PropertyResult<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn contains_property(&self, key: &str) -> bool {
        self.values.contains(key)
    }

    fn property_names(&self) -> Vec<String> {
        self.values.keys()
    }
}
