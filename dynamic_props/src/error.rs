//! Error types produced while discovering, installing and reading dynamic
//! properties.

use figment::Error as FigmentError;
use thiserror::Error;

/// Boxed error returned by user code: marked methods and value suppliers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type PropertyResult<T> = Result<T, DynamicPropertyError>;

/// Invalid arguments passed to a [`crate::DynamicPropertyRegistry`].
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ArgumentError {
    /// The property name was empty or contained only whitespace.
    #[error("'name' must not be null or blank")]
    BlankName,

    /// No value supplier was provided for the property.
    #[error("'valueSupplier' must not be null")]
    MissingSupplier,
}

/// Errors raised by dynamic property discovery, installation and lookup.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DynamicPropertyError {
    /// A marked method requires an instance receiver.
    #[error("dynamic property source method '{method}' must be static")]
    NonStaticMethod {
        /// Name of the offending method.
        method: String,
    },

    /// A marked method does not take exactly one registry argument.
    #[error(
        "dynamic property source method '{method}' must accept a single DynamicPropertyRegistry argument"
    )]
    InvalidSignature {
        /// Name of the offending method.
        method: String,
    },

    /// A marked method has the right shape but cannot be called through a
    /// plain function pointer.
    #[error(
        "dynamic property source method '{method}' must be a plain function, not async, unsafe or generic"
    )]
    UninvocableMethod {
        /// Name of the offending method.
        method: String,
    },

    /// A registry call received an invalid name or supplier.
    #[error(transparent)]
    InvalidArgument(#[from] ArgumentError),

    /// A required property is absent from every layer.
    #[error("required key '{key}' not found")]
    MissingProperty {
        /// Key that could not be resolved.
        key: String,
    },

    /// A resolved value could not be converted into the requested type.
    #[error("failed to convert property '{key}': {source}")]
    Conversion {
        /// Key whose value failed to convert.
        key: String,
        /// Underlying deserialization failure.
        #[source]
        source: Box<FigmentError>,
    },

    /// A static configuration layer could not be gathered.
    #[error("failed to gather configuration: {0}")]
    Figment(#[from] Box<FigmentError>),

    /// Failure raised by a marked method or a value supplier.
    #[error(transparent)]
    User(BoxError),
}

impl DynamicPropertyError {
    /// Construct a conversion error for `key`.
    #[must_use]
    pub fn conversion(key: impl Into<String>, source: FigmentError) -> Self {
        Self::Conversion {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a failure raised by user code without altering it.
    #[must_use]
    pub fn user(source: impl Into<BoxError>) -> Self {
        Self::User(source.into())
    }

    /// Returns the user error when this error originated in user code.
    #[must_use]
    pub fn as_user(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::User(source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<FigmentError> for DynamicPropertyError {
    fn from(source: FigmentError) -> Self {
        Self::Figment(Box::new(source))
    }
}
