//! Lazily evaluated, test-scoped property layers.
//!
//! Test types mark associated functions with `#[dynamic_property_source]`.
//! Each marked function receives a [`DynamicPropertyRegistry`] and records
//! property names paired with closures. Those closures run only when the
//! property is read, so they can report values that are unknown when the
//! context is configured, such as the port of a service started afterwards.
//!
//! [`DynamicPropertiesContextCustomizerFactory`] discovers the marked
//! functions across a type's ancestry and validates their shape.
//! [`DynamicPropertiesContextCustomizer`] runs them and installs the result as
//! the highest-precedence layer of a context's [`Environment`].
//!
//! ```
//! use dynamic_props::{
//!     ConfigurableContext, ContextCustomizer, ContextCustomizerFactory,
//!     DynamicPropertiesContextCustomizerFactory, DynamicPropertyRegistry, TestClass,
//!     TestContext, dynamic_property_sources,
//! };
//!
//! struct RedisTests;
//!
//! #[dynamic_property_sources]
//! impl RedisTests {
//!     #[dynamic_property_source]
//!     fn redis_properties(values: &mut dyn DynamicPropertyRegistry) -> dynamic_props::PropertyResult<()> {
//!         values.add("test.redis.ip", || "127.0.0.1")?;
//!         values.add("test.redis.port", || 6379_u16)
//!     }
//! }
//!
//! let factory = DynamicPropertiesContextCustomizerFactory::new();
//! let customizer = factory
//!     .create_context_customizer(&RedisTests::descriptor(), &[])?
//!     .expect("RedisTests declares a dynamic property source");
//! let mut context = TestContext::new();
//! customizer.customize_context(&mut context)?;
//!
//! let port: u16 = context.environment().required_property_as("test.redis.port")?;
//! assert_eq!(port, 6379);
//! # Ok::<_, dynamic_props::DynamicPropertyError>(())
//! ```

pub use dynamic_props_macros::{dynamic_property_source, dynamic_property_sources};

mod class;
mod context;
mod customizer;
pub mod discovery;
mod environment;
mod error;
mod registry;
mod source;
pub mod value;

pub use class::{
    ClassDescriptor, ClassDescriptorBuilder, IntoMethodResult, MethodDescriptor, MethodSignature,
    ParamType, PropertySourceFn, Receiver, TestClass,
};
pub use context::{
    ConfigurableContext, ContextConfigurationAttributes, ContextCustomizer,
    ContextCustomizerFactory, TestContext,
};
pub use customizer::{DynamicPropertiesContextCustomizer, DynamicPropertiesContextCustomizerFactory};
pub use environment::{Environment, PropertySources};
pub use error::{ArgumentError, BoxError, DynamicPropertyError, PropertyResult};
pub use registry::{DynamicPropertyRegistry, DynamicPropertyValues};
pub use source::{
    DYNAMIC_PROPERTIES_SOURCE_NAME, DynamicValuesPropertySource, MapPropertySource, PropertySource,
};
pub use value::{IntoSuppliedValue, ValueSupplier};
