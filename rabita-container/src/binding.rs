//! Binding kinds and bind sources.
//!
//! A [`Binding`] is what the registry stores for a key. Factory sources are
//! invoked eagerly at bind time, so a stored binding is either the produced
//! value or a plain value record with its singleton flag.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::error::Result;
use crate::key::BindingKey;

/// A type-erased, shareable constructed value.
///
/// Everything the container stores or returns is one of these. Wrap
/// concrete values with [`object`].
pub type Object = Arc<dyn Any + Send + Sync>;

/// A producer invoked with the container to build a value.
///
/// # Why `Arc` and not `Box`?
/// Producers are shared between threads (the container is `Send + Sync`).
/// `Arc` allows cloning without copying the closure.
pub type Producer = Arc<dyn Fn(&Container) -> Result<Object> + Send + Sync>;

/// Wraps a concrete value as a shareable [`Object`].
///
/// ```
/// use rabita_container::binding::object;
///
/// let value = object(42i32);
/// assert_eq!(*value.downcast::<i32>().unwrap(), 42);
/// ```
pub fn object<T: Send + Sync + 'static>(value: T) -> Object {
    Arc::new(value)
}

/// The payload of a value binding.
#[derive(Clone)]
pub enum BoundValue {
    /// A class path, instantiated through the blueprint registry on demand.
    Class(BindingKey),
    /// An opaque path-style string, returned as-is by the read paths.
    Path(String),
    /// A pre-built object.
    Instance(Object),
}

impl BoundValue {
    /// Classifies a raw string source: path-style strings (containing `/`)
    /// are opaque, anything else names a class.
    pub fn classify(raw: &str) -> Self {
        if raw.contains('/') {
            BoundValue::Path(raw.to_string())
        } else {
            BoundValue::Class(BindingKey::new(raw))
        }
    }
}

impl fmt::Debug for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundValue::Class(key) => f.debug_tuple("Class").field(key).finish(),
            BoundValue::Path(path) => f.debug_tuple("Path").field(path).finish(),
            BoundValue::Instance(_) => f.debug_tuple("Instance").finish(),
        }
    }
}

/// A registered binding.
#[derive(Clone)]
pub enum Binding {
    /// The result of a factory invoked at bind time.
    Produced { value: Object, singleton: bool },
    /// A plain value record.
    Value { value: BoundValue, singleton: bool },
}

impl Binding {
    /// The stored singleton flag.
    pub fn is_singleton(&self) -> bool {
        match self {
            Binding::Produced { singleton, .. } => *singleton,
            Binding::Value { singleton, .. } => *singleton,
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Produced { singleton, .. } => f
                .debug_struct("Produced")
                .field("singleton", singleton)
                .finish(),
            Binding::Value { value, singleton } => f
                .debug_struct("Value")
                .field("value", value)
                .field("singleton", singleton)
                .finish(),
        }
    }
}

/// What a caller hands to `bind`: a factory or a plain value.
///
/// String sources are classified into class paths and opaque path strings;
/// use the constructors for everything else.
pub enum BindSource {
    Factory(Producer),
    Value(BoundValue),
}

impl BindSource {
    /// A factory source, invoked eagerly when bound.
    pub fn factory(
        producer: impl Fn(&Container) -> Result<Object> + Send + Sync + 'static,
    ) -> Self {
        BindSource::Factory(Arc::new(producer))
    }

    /// A pre-built instance source.
    pub fn instance<T: Send + Sync + 'static>(value: T) -> Self {
        BindSource::Value(BoundValue::Instance(object(value)))
    }

    /// A class-path source (an alias binding).
    pub fn class(path: impl Into<BindingKey>) -> Self {
        BindSource::Value(BoundValue::Class(path.into()))
    }
}

impl From<&str> for BindSource {
    fn from(raw: &str) -> Self {
        BindSource::Value(BoundValue::classify(raw))
    }
}

impl From<String> for BindSource {
    fn from(raw: String) -> Self {
        BindSource::Value(BoundValue::classify(&raw))
    }
}

impl From<BoundValue> for BindSource {
    fn from(value: BoundValue) -> Self {
        BindSource::Value(value)
    }
}

impl From<Object> for BindSource {
    fn from(value: Object) -> Self {
        BindSource::Value(BoundValue::Instance(value))
    }
}
