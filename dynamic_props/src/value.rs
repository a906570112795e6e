//! Deferred values produced on demand when a property is read.
//!
//! A [`ValueSupplier`] wraps a zero-argument closure. The closure runs every
//! time the property is read, so it may observe state that only becomes
//! available after the supplier was registered, such as the mapped port of a
//! service started later in the test lifecycle.
//!
//! ```
//! use dynamic_props::ValueSupplier;
//!
//! let supplier = ValueSupplier::new(|| "127.0.0.1");
//! let value = supplier.get()?;
//! assert_eq!(value.as_str(), Some("127.0.0.1"));
//! # Ok::<_, dynamic_props::BoxError>(())
//! ```

use std::fmt;

use figment::value::{Empty, Num, Tag, Value};

use crate::BoxError;

/// Outcome of invoking a supplier.
pub type SuppliedValue = Result<Value, BoxError>;

/// Returns the value used to represent a supplier that produced nothing.
#[must_use]
pub const fn null_value() -> Value {
    Value::Empty(Tag::Default, Empty::None)
}

/// Returns `true` when `value` is the null produced by [`null_value`].
#[must_use]
pub const fn is_null(value: &Value) -> bool {
    matches!(value, Value::Empty(_, Empty::None))
}

/// Conversion from a supplier's return type into a property value.
///
/// Implemented for strings, characters, booleans, numbers and
/// [`Value`]. `Option<T>` maps `None` to [`null_value`], and
/// `Result<T, E>` forwards the error unchanged.
pub trait IntoSuppliedValue {
    /// Convert `self` into a property value.
    ///
    /// # Errors
    ///
    /// Returns the supplier's own error when `self` is an `Err`.
    fn into_supplied_value(self) -> SuppliedValue;
}

impl IntoSuppliedValue for Value {
    fn into_supplied_value(self) -> SuppliedValue {
        Ok(self)
    }
}

impl IntoSuppliedValue for String {
    fn into_supplied_value(self) -> SuppliedValue {
        Ok(Value::String(Tag::Default, self))
    }
}

impl IntoSuppliedValue for &str {
    fn into_supplied_value(self) -> SuppliedValue {
        Ok(Value::String(Tag::Default, self.to_owned()))
    }
}

impl IntoSuppliedValue for char {
    fn into_supplied_value(self) -> SuppliedValue {
        Ok(Value::Char(Tag::Default, self))
    }
}

impl IntoSuppliedValue for bool {
    fn into_supplied_value(self) -> SuppliedValue {
        Ok(Value::Bool(Tag::Default, self))
    }
}

macro_rules! numeric_supplied_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl IntoSuppliedValue for $ty {
                fn into_supplied_value(self) -> SuppliedValue {
                    Ok(Value::Num(Tag::Default, Num::$variant(self)))
                }
            }
        )*
    };
}

numeric_supplied_value!(
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => USize,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => ISize,
    f32 => F32,
    f64 => F64,
);

impl<T: IntoSuppliedValue> IntoSuppliedValue for Option<T> {
    fn into_supplied_value(self) -> SuppliedValue {
        self.map_or_else(|| Ok(null_value()), IntoSuppliedValue::into_supplied_value)
    }
}

impl<T, E> IntoSuppliedValue for Result<T, E>
where
    T: IntoSuppliedValue,
    E: Into<BoxError>,
{
    fn into_supplied_value(self) -> SuppliedValue {
        self.map_err(Into::into)?.into_supplied_value()
    }
}

/// Zero-argument producer of a property value.
pub struct ValueSupplier {
    produce: Box<dyn Fn() -> SuppliedValue>,
}

impl ValueSupplier {
    /// Wrap `produce` so it can be stored in a property layer.
    pub fn new<F, R>(produce: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: IntoSuppliedValue + 'static,
    {
        Self {
            produce: Box::new(move || produce().into_supplied_value()),
        }
    }

    /// Invoke the wrapped closure.
    ///
    /// # Errors
    ///
    /// Returns whatever error the closure produced, unchanged.
    pub fn get(&self) -> SuppliedValue {
        (self.produce)()
    }
}

impl fmt::Debug for ValueSupplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSupplier").finish_non_exhaustive()
    }
}
