//! Installs the dynamic property layer into a context.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use crate::discovery::find_marked_methods;
use crate::{
    ClassDescriptor, ConfigurableContext, ContextConfigurationAttributes, ContextCustomizer,
    ContextCustomizerFactory, DYNAMIC_PROPERTIES_SOURCE_NAME, DynamicPropertyError,
    DynamicPropertyValues, DynamicValuesPropertySource, MethodDescriptor, ParamType,
    PropertyResult, PropertySourceFn, Receiver,
};

/// Customizer that runs dynamic property source methods and installs their
/// values as the highest-precedence layer.
///
/// Two customizers are equal when they hold the same set of methods, in any
/// order.
#[derive(Clone, Debug)]
pub struct DynamicPropertiesContextCustomizer {
    methods: Vec<MethodDescriptor>,
}

impl DynamicPropertiesContextCustomizer {
    /// Validate `methods` and build a customizer around them.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicPropertyError::NonStaticMethod`] for a method needing
    /// an instance, [`DynamicPropertyError::InvalidSignature`] for a method
    /// that does not take a single registry argument, and
    /// [`DynamicPropertyError::UninvocableMethod`] for an `async`, `unsafe` or
    /// generic method that has no invoker.
    pub fn new<I>(methods: I) -> PropertyResult<Self>
    where
        I: IntoIterator<Item = MethodDescriptor>,
    {
        let mut seen = BTreeSet::new();
        let mut validated = Vec::new();
        for method in methods {
            validate(&method)?;
            if seen.insert(method.clone()) {
                validated.push(method);
            }
        }
        tracing::debug!(count = validated.len(), "created dynamic properties customizer");
        Ok(Self { methods: validated })
    }

    /// The validated methods, in invocation order.
    #[must_use]
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    fn method_set(&self) -> BTreeSet<&MethodDescriptor> {
        self.methods.iter().collect()
    }
}

fn validate(method: &MethodDescriptor) -> PropertyResult<PropertySourceFn> {
    if method.receiver() != Receiver::Static {
        return Err(DynamicPropertyError::NonStaticMethod {
            method: method.name().to_owned(),
        });
    }
    if !matches!(method.signature().params(), [ParamType::PropertyRegistry]) {
        return Err(DynamicPropertyError::InvalidSignature {
            method: method.name().to_owned(),
        });
    }
    method
        .invoker()
        .ok_or_else(|| DynamicPropertyError::UninvocableMethod {
            method: method.name().to_owned(),
        })
}

impl ContextCustomizer for DynamicPropertiesContextCustomizer {
    fn customize_context(&self, context: &mut dyn ConfigurableContext) -> PropertyResult<()> {
        let mut values = DynamicPropertyValues::new();
        for method in &self.methods {
            let invoker = validate(method)?;
            let outcome = invoker(&mut values);
            if let Some(violation) = values.violation() {
                return Err(violation.into());
            }
            outcome.map_err(|err| {
                tracing::debug!(method = method.name(), "dynamic property source method failed");
                DynamicPropertyError::User(err)
            })?;
        }
        let count = values.len();
        let source = DynamicValuesPropertySource::new(DYNAMIC_PROPERTIES_SOURCE_NAME, values)?;
        context
            .environment_mut()
            .property_sources_mut()
            .add_first(Box::new(source));
        tracing::debug!(
            source = DYNAMIC_PROPERTIES_SOURCE_NAME,
            properties = count,
            "installed dynamic property source"
        );
        Ok(())
    }
}

impl PartialEq for DynamicPropertiesContextCustomizer {
    fn eq(&self, other: &Self) -> bool {
        self.method_set() == other.method_set()
    }
}

impl Eq for DynamicPropertiesContextCustomizer {}

impl Hash for DynamicPropertiesContextCustomizer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.method_set().hash(state);
    }
}

/// Factory producing [`DynamicPropertiesContextCustomizer`] for classes with
/// marked methods.
#[derive(Clone, Copy, Debug, Default)]
pub struct DynamicPropertiesContextCustomizerFactory;

impl DynamicPropertiesContextCustomizerFactory {
    /// Create the factory.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ContextCustomizerFactory for DynamicPropertiesContextCustomizerFactory {
    type Customizer = DynamicPropertiesContextCustomizer;

    fn create_context_customizer(
        &self,
        test_class: &ClassDescriptor,
        _attributes: &[ContextConfigurationAttributes],
    ) -> PropertyResult<Option<Self::Customizer>> {
        let methods = find_marked_methods(test_class);
        if methods.is_empty() {
            return Ok(None);
        }
        DynamicPropertiesContextCustomizer::new(methods).map(Some)
    }
}
