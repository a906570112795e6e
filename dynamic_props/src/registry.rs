//! Registry handed to dynamic property source methods.
//!
//! Marked methods receive a `&mut dyn DynamicPropertyRegistry` and record one
//! supplier per property name:
//!
//! ```
//! use dynamic_props::{DynamicPropertyRegistry, DynamicPropertyValues, PropertyResult};
//!
//! fn redis_properties(values: &mut dyn DynamicPropertyRegistry) -> PropertyResult<()> {
//!     values.add("test.redis.ip", || "127.0.0.1")?;
//!     values.add("test.redis.port", || 6379_u16)?;
//!     Ok(())
//! }
//!
//! let mut values = DynamicPropertyValues::new();
//! redis_properties(&mut values)?;
//! assert_eq!(values.names().collect::<Vec<_>>(), ["test.redis.ip", "test.redis.port"]);
//! # Ok::<_, dynamic_props::DynamicPropertyError>(())
//! ```

use std::collections::HashMap;

use crate::value::{IntoSuppliedValue, ValueSupplier};
use crate::{ArgumentError, PropertyResult};

/// Recorder capability passed to dynamic property source methods.
pub trait DynamicPropertyRegistry {
    /// Record `supplier` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::BlankName`] when `name` is blank and
    /// [`ArgumentError::MissingSupplier`] when `supplier` is `None`.
    fn add_supplier(&mut self, name: &str, supplier: Option<ValueSupplier>) -> PropertyResult<()>;
}

impl dyn DynamicPropertyRegistry + '_ {
    /// Record a closure producing the value of `name` on every read.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::BlankName`] when `name` is blank.
    pub fn add<F, R>(&mut self, name: &str, produce: F) -> PropertyResult<()>
    where
        F: Fn() -> R + 'static,
        R: IntoSuppliedValue + 'static,
    {
        self.add_supplier(name, Some(ValueSupplier::new(produce)))
    }
}

/// Characters that do not count as text in a property name.
///
/// Unicode whitespace without the no-break spaces (U+00A0, U+2007, U+202F)
/// and NEL (U+0085), plus the ASCII separators U+001C to U+001F.
const fn is_blank_char(c: char) -> bool {
    matches!(
        c,
        '\t'..='\r'
            | '\u{1c}'..='\u{1f}'
            | ' '
            | '\u{1680}'
            | '\u{2000}'..='\u{2006}'
            | '\u{2008}'..='\u{200a}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{205f}'
            | '\u{3000}'
    )
}

fn check_arguments(name: &str, supplier: Option<&ValueSupplier>) -> Result<(), ArgumentError> {
    if name.chars().all(is_blank_char) {
        return Err(ArgumentError::BlankName);
    }
    if supplier.is_none() {
        return Err(ArgumentError::MissingSupplier);
    }
    Ok(())
}

/// Ordered accumulator of property suppliers.
///
/// Re-adding a name replaces its supplier and keeps the original position.
/// The first argument violation is retained so callers can detect it even
/// when the method that triggered it discarded the returned `Result`.
#[derive(Debug, Default)]
pub struct DynamicPropertyValues {
    entries: Vec<(String, ValueSupplier)>,
    index: HashMap<String, usize>,
    violation: Option<ArgumentError>,
}

impl DynamicPropertyValues {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a closure producing the value of `name` on every read.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::BlankName`] when `name` is blank.
    pub fn add<F, R>(&mut self, name: &str, produce: F) -> PropertyResult<()>
    where
        F: Fn() -> R + 'static,
        R: IntoSuppliedValue + 'static,
    {
        self.add_supplier(name, Some(ValueSupplier::new(produce)))
    }

    /// Property names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of recorded properties.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first argument violation seen by this accumulator, if any.
    #[must_use]
    pub const fn violation(&self) -> Option<ArgumentError> {
        self.violation
    }

    /// Consume the accumulator and return the recorded suppliers in order.
    ///
    /// # Errors
    ///
    /// Returns the first recorded argument violation, discarding every
    /// supplier collected so far.
    pub fn into_suppliers(self) -> PropertyResult<Vec<(String, ValueSupplier)>> {
        match self.violation {
            Some(violation) => Err(violation.into()),
            None => Ok(self.entries),
        }
    }
}

impl DynamicPropertyRegistry for DynamicPropertyValues {
    fn add_supplier(&mut self, name: &str, supplier: Option<ValueSupplier>) -> PropertyResult<()> {
        if let Err(violation) = check_arguments(name, supplier.as_ref()) {
            self.violation.get_or_insert(violation);
            return Err(violation.into());
        }
        let Some(value_supplier) = supplier else {
            return Err(ArgumentError::MissingSupplier.into());
        };
        if let Some(&slot) = self.index.get(name) {
            if let Some(entry) = self.entries.get_mut(slot) {
                entry.1 = value_supplier;
            }
        } else {
            self.index.insert(name.to_owned(), self.entries.len());
            self.entries.push((name.to_owned(), value_supplier));
        }
        Ok(())
    }
}
