//! Contracts between dynamic properties and the context being configured.

use crate::{ClassDescriptor, Environment, PropertyResult};

/// A context whose environment can be reconfigured before it is used.
pub trait ConfigurableContext {
    /// The context's environment.
    fn environment(&self) -> &Environment;

    /// Mutable access to the context's environment.
    fn environment_mut(&mut self) -> &mut Environment;
}

/// Minimal in-memory context, useful for tests and embedding.
#[derive(Debug, Default)]
pub struct TestContext {
    environment: Environment,
}

impl TestContext {
    /// Create a context with an empty environment.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            environment: Environment::new(),
        }
    }

    /// Create a context around an existing environment.
    #[must_use]
    pub const fn with_environment(environment: Environment) -> Self {
        Self { environment }
    }
}

impl ConfigurableContext for TestContext {
    fn environment(&self) -> &Environment {
        &self.environment
    }

    fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }
}

/// Mutates a context before it is used by a test.
pub trait ContextCustomizer {
    /// Apply this customization to `context`.
    ///
    /// # Errors
    ///
    /// Returns an error when the customization cannot be applied; the
    /// context must then be considered unusable.
    fn customize_context(&self, context: &mut dyn ConfigurableContext) -> PropertyResult<()>;
}

/// Configuration declared for a test class.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContextConfigurationAttributes {
    declaring_class: String,
    locations: Vec<String>,
}

impl ContextConfigurationAttributes {
    /// Attributes declared by `declaring_class`, with the given resource
    /// locations.
    #[must_use]
    pub fn new(declaring_class: impl Into<String>, locations: Vec<String>) -> Self {
        Self {
            declaring_class: declaring_class.into(),
            locations,
        }
    }

    /// Class that declared the configuration.
    #[must_use]
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    /// Configured resource locations.
    #[must_use]
    pub fn locations(&self) -> &[String] {
        &self.locations
    }
}

/// Creates a customizer for a test class, or declines when not applicable.
pub trait ContextCustomizerFactory {
    /// Customizer produced by this factory.
    type Customizer: ContextCustomizer;

    /// Inspect `test_class` and produce a customizer when it applies.
    ///
    /// # Errors
    ///
    /// Returns an error when the class is misconfigured.
    fn create_context_customizer(
        &self,
        test_class: &ClassDescriptor,
        attributes: &[ContextConfigurationAttributes],
    ) -> PropertyResult<Option<Self::Customizer>>;
}
