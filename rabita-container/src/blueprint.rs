//! Constructible type blueprints: the registry the container consults
//! when it needs to build a concrete class.
//!
//! Each constructible class declares a [`Blueprint`]: its key, its
//! constructor parameters in declaration order, and a typed construct
//! function. The container walks the parameter list to auto-wire the
//! constructor graph instead of introspecting anything at runtime.
//!
//! Blueprints are registered two ways:
//! - link-time, via `inventory::submit!` of a [`BlueprintEntry`];
//! - per-container, via [`Container::declare`](crate::container::Container::declare).
//!
//! Container-local declarations shadow link-time ones.

use std::any::type_name;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::binding::Object;
use crate::error::{ContainerError, Result, TypeMismatchError};
use crate::invoke::CallParam;
use crate::key::BindingKey;

/// Constructs an instance from an assembled argument list.
pub type ConstructFn = Arc<dyn Fn(&mut Args) -> Result<Object> + Send + Sync>;

/// Invokes a named method on a receiver with an assembled argument list.
pub type InvokeFn = Arc<dyn Fn(Object, &mut Args) -> Result<Object> + Send + Sync>;

/// An assembled argument list, consumed front-to-back with typed takes.
///
/// ```rust,ignore
/// Blueprint::new("app::Mailer", |args| {
///     let transport: Arc<Transport> = args.take()?;
///     Ok(object(Mailer { transport }))
/// })
/// ```
pub struct Args {
    items: VecDeque<Object>,
}

impl Args {
    pub(crate) fn new(items: Vec<Object>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Takes the next argument, downcast to `T`.
    ///
    /// # Errors
    /// [`ContainerError::TypeMismatch`] if the list is exhausted or the
    /// next argument is not a `T`.
    pub fn take<T: Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        let item = self.items.pop_front().ok_or_else(|| {
            ContainerError::TypeMismatch(TypeMismatchError {
                expected: type_name::<T>(),
            })
        })?;

        item.downcast::<T>().map_err(|_| {
            ContainerError::TypeMismatch(TypeMismatchError {
                expected: type_name::<T>(),
            })
        })
    }

    /// Takes the next argument without downcasting.
    pub fn take_raw(&mut self) -> Option<Object> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A constructor parameter, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Param {
    /// Dependency on another class path, resolved through the container.
    Class(BindingKey),
    /// The container handle itself (self-injection).
    Container,
    /// Optional parameter, skipped during auto-wiring.
    Optional,
    /// Generic or untyped collection, skipped during auto-wiring.
    Collection,
}

impl Param {
    /// Shorthand for a class-typed parameter.
    pub fn class(path: impl Into<BindingKey>) -> Self {
        Param::Class(path.into())
    }
}

/// The constructor descriptor for one constructible class.
#[derive(Clone)]
pub struct Blueprint {
    key: BindingKey,
    params: Vec<Param>,
    construct: ConstructFn,
    methods: Vec<Method>,
}

impl Blueprint {
    /// Declares a constructible class with its construct function.
    ///
    /// Caller-supplied extra arguments arrive first in `args`, followed by
    /// the auto-wired parameters in declaration order.
    pub fn new(
        key: impl Into<BindingKey>,
        construct: impl Fn(&mut Args) -> Result<Object> + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            params: Vec::new(),
            construct: Arc::new(construct),
            methods: Vec::new(),
        }
    }

    /// Appends a constructor parameter.
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Attaches a callable method.
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn key(&self) -> &BindingKey {
        &self.key
    }

    pub fn parameters(&self) -> &[Param] {
        &self.params
    }

    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name() == name)
    }

    /// Runs the construct function over an assembled argument list.
    pub(crate) fn build(&self, args: Vec<Object>) -> Result<Object> {
        let mut args = Args::new(args);
        (self.construct)(&mut args)
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("key", &self.key)
            .field("params", &self.params)
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// A named, invocable method attached to a blueprint.
#[derive(Clone)]
pub struct Method {
    name: String,
    params: Vec<CallParam>,
    run: InvokeFn,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        invoke: impl Fn(Object, &mut Args) -> Result<Object> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            run: Arc::new(invoke),
        }
    }

    /// Appends a declared parameter.
    pub fn param(mut self, param: CallParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[CallParam] {
        &self.params
    }

    pub(crate) fn invoke(&self, receiver: Object, args: Vec<Object>) -> Result<Object> {
        let mut args = Args::new(args);
        (self.run)(receiver, &mut args)
    }
}

/// Link-time blueprint registration.
///
/// ```rust,ignore
/// inventory::submit! {
///     BlueprintEntry(|| Blueprint::new("app::Mailer", |_| Ok(object(Mailer::default()))))
/// }
/// ```
pub struct BlueprintEntry(pub fn() -> Blueprint);

inventory::collect!(BlueprintEntry);

/// All link-time blueprints, collected once on first use.
static GLOBAL_BLUEPRINTS: Lazy<HashMap<BindingKey, Blueprint>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for entry in inventory::iter::<BlueprintEntry> {
        let blueprint = (entry.0)();
        map.insert(blueprint.key().clone(), blueprint);
    }
    debug!(count = map.len(), "Collected link-time blueprints");
    map
});

/// Per-container view over declared blueprints.
///
/// Local declarations shadow link-time entries, so each container (one per
/// test, typically) can carry its own constructible set.
pub(crate) struct TypeRegistry {
    local: RwLock<HashMap<BindingKey, Blueprint>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            local: RwLock::new(HashMap::new()),
        }
    }

    pub fn declare(&self, blueprint: Blueprint) {
        debug!(key = %blueprint.key(), "Declared blueprint");
        self.local
            .write()
            .insert(blueprint.key().clone(), blueprint);
    }

    pub fn lookup(&self, key: &BindingKey) -> Option<Blueprint> {
        if let Some(found) = self.local.read().get(key) {
            return Some(found.clone());
        }
        GLOBAL_BLUEPRINTS.get(key).cloned()
    }
}
