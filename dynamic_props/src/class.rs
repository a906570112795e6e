//! Descriptors standing in for runtime reflection over test classes.
//!
//! A [`ClassDescriptor`] lists the associated functions of a test type and
//! links to its parent descriptor. The `#[dynamic_property_sources]` macro
//! generates descriptors from `impl` blocks; the builder below constructs them
//! by hand.
//!
//! ```
//! use dynamic_props::{ClassDescriptor, DynamicPropertyRegistry, MethodDescriptor, PropertyResult};
//!
//! fn redis(values: &mut dyn DynamicPropertyRegistry) -> PropertyResult<()> {
//!     values.add("test.redis.ip", || "127.0.0.1")
//! }
//!
//! let base = ClassDescriptor::builder("BaseTests")
//!     .method(MethodDescriptor::property_source("redis", |v| redis(v).map_err(Into::into)).marked())
//!     .build();
//! let class = ClassDescriptor::builder("RedisTests").extends(base).build();
//! assert_eq!(class.ancestry().map(ClassDescriptor::name).collect::<Vec<_>>(), ["BaseTests", "RedisTests"]);
//! ```

use std::fmt;

use crate::{BoxError, DynamicPropertyRegistry};

/// Function pointer invoked for a dynamic property source method.
pub type PropertySourceFn = fn(&mut dyn DynamicPropertyRegistry) -> Result<(), BoxError>;

/// Types that can describe themselves for dynamic property discovery.
pub trait TestClass {
    /// Describe this type, including its parent chain.
    fn descriptor() -> ClassDescriptor;
}

/// Whether a method needs an instance to be invoked.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Receiver {
    /// Associated function without `self`.
    Static,
    /// Method taking `self` in any form.
    Instance,
}

/// Declared type of a method parameter.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ParamType {
    /// `&mut dyn DynamicPropertyRegistry`.
    PropertyRegistry,
    /// Any other type, recorded by its source text.
    Other(String),
}

/// Name and parameter types identifying a method within a class chain.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MethodSignature {
    name: String,
    params: Vec<ParamType>,
}

impl MethodSignature {
    /// Create a signature.
    #[must_use]
    pub fn new(name: impl Into<String>, params: Vec<ParamType>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter types, excluding the receiver.
    #[must_use]
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (position, param) in self.params.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            match param {
                ParamType::PropertyRegistry => f.write_str("&mut dyn DynamicPropertyRegistry")?,
                ParamType::Other(ty) => f.write_str(ty)?,
            }
        }
        f.write_str(")")
    }
}

/// A method declared on a test class.
///
/// Equality and hashing cover the declaring class, the receiver and the
/// signature. The invoker and the marker flag are ignored.
#[derive(Clone)]
pub struct MethodDescriptor {
    declaring_class: String,
    signature: MethodSignature,
    receiver: Receiver,
    marked: bool,
    invoker: Option<PropertySourceFn>,
}

impl MethodDescriptor {
    /// An invocable static method taking the registry.
    #[must_use]
    pub fn property_source(name: impl Into<String>, invoker: PropertySourceFn) -> Self {
        Self {
            declaring_class: String::new(),
            signature: MethodSignature::new(name, vec![ParamType::PropertyRegistry]),
            receiver: Receiver::Static,
            marked: false,
            invoker: Some(invoker),
        }
    }

    /// A method known only by its shape. It cannot be invoked, so validation
    /// rejects it if it is marked.
    #[must_use]
    pub fn declared(name: impl Into<String>, receiver: Receiver, params: Vec<ParamType>) -> Self {
        Self {
            declaring_class: String::new(),
            signature: MethodSignature::new(name, params),
            receiver,
            marked: false,
            invoker: None,
        }
    }

    /// Attach the dynamic property source marker.
    #[must_use]
    pub const fn marked(mut self) -> Self {
        self.marked = true;
        self
    }

    pub(crate) fn with_declaring_class(mut self, class: &str) -> Self {
        class.clone_into(&mut self.declaring_class);
        self
    }

    /// Method name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    /// Name of the class declaring this method.
    #[must_use]
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    /// Name and parameter types.
    #[must_use]
    pub const fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Receiver kind.
    #[must_use]
    pub const fn receiver(&self) -> Receiver {
        self.receiver
    }

    /// Returns `true` when the method itself carries the marker.
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.marked
    }

    /// Function used to invoke the method, if it has one.
    #[must_use]
    pub const fn invoker(&self) -> Option<PropertySourceFn> {
        self.invoker
    }

    fn identity(&self) -> (&str, Receiver, &MethodSignature) {
        (&self.declaring_class, self.receiver, &self.signature)
    }
}

impl PartialEq for MethodDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for MethodDescriptor {}

impl std::hash::Hash for MethodDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for MethodDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MethodDescriptor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("declaring_class", &self.declaring_class)
            .field("signature", &self.signature)
            .field("receiver", &self.receiver)
            .field("marked", &self.marked)
            .field("invocable", &self.invoker.is_some())
            .finish()
    }
}

/// Description of a test class and its ancestry.
#[derive(Clone, Debug)]
pub struct ClassDescriptor {
    name: String,
    parent: Option<Box<Self>>,
    methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    /// Start building a descriptor for the class called `name`.
    pub fn builder(name: impl Into<String>) -> ClassDescriptorBuilder {
        ClassDescriptorBuilder {
            name: name.into(),
            parent: None,
            methods: Vec::new(),
        }
    }

    /// Class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent class, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    /// Methods declared directly on this class.
    #[must_use]
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// This class and its ancestors, root first.
    #[must_use]
    pub fn ancestry(&self) -> impl DoubleEndedIterator<Item = &Self> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(class) = current {
            chain.push(class);
            current = class.parent();
        }
        chain.into_iter().rev()
    }
}

/// Builder for [`ClassDescriptor`].
#[derive(Debug)]
#[must_use]
pub struct ClassDescriptorBuilder {
    name: String,
    parent: Option<Box<ClassDescriptor>>,
    methods: Vec<MethodDescriptor>,
}

impl ClassDescriptorBuilder {
    /// Set the parent class.
    pub fn extends(mut self, parent: ClassDescriptor) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Declare a method on this class.
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        let declared = method.with_declaring_class(&self.name);
        self.methods.push(declared);
        self
    }

    /// Finish the descriptor.
    #[must_use]
    pub fn build(self) -> ClassDescriptor {
        ClassDescriptor {
            name: self.name,
            parent: self.parent,
            methods: self.methods,
        }
    }
}

/// Normalises the return type of a marked function into the invoker result.
pub trait IntoMethodResult {
    /// Convert into the result expected by [`PropertySourceFn`].
    ///
    /// # Errors
    ///
    /// Returns the method's own error, boxed but otherwise unchanged.
    fn into_method_result(self) -> Result<(), BoxError>;
}

impl IntoMethodResult for () {
    fn into_method_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> IntoMethodResult for Result<(), E> {
    fn into_method_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}
