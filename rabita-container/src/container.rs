//! # The Container — heart of Rabita
//!
//! A string-keyed service container: registration, lookup, and recursive
//! resolution of constructor graphs through declared blueprints.
//!
//! # Architecture
//! ```text
//!        bind / singleton            declare
//!              │                        │
//!              ▼                        ▼
//!      binding registry          type registry
//!              │                        │
//!              └──────► resolve ◄───────┘
//!                          │
//!                   singleton cache
//! ```
//!
//! # Examples
//! ```rust
//! use rabita_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Transport;
//! struct Mailer {
//!     transport: Arc<Transport>,
//! }
//!
//! let app = Container::new();
//! app.declare(Blueprint::new("app::Transport", |_| Ok(object(Transport))));
//! app.declare(
//!     Blueprint::new("app::Mailer", |args| {
//!         let transport: Arc<Transport> = args.take()?;
//!         Ok(object(Mailer { transport }))
//!     })
//!     .param(Param::class("app::Transport")),
//! );
//!
//! app.singleton("mailer", "app::Mailer").unwrap();
//! let mailer = app.resolve("mailer").unwrap();
//! assert!(mailer.downcast::<Mailer>().is_ok());
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::binding::{BindSource, Binding, BoundValue, Object, object};
use crate::blueprint::{Blueprint, Param, TypeRegistry};
use crate::error::{
    CircularDependencyError, ContainerError, NotInstantiableError, Result,
};
use crate::key::BindingKey;

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Thread-safe, cheaply clonable service container.
///
/// Owns the binding registry and the singleton instance cache. Clones share
/// the same state; independent containers (one per test, typically) do not.
pub struct Container {
    inner: Arc<Inner>,
}

struct Inner {
    bindings: RwLock<HashMap<BindingKey, Binding>>,
    instances: DashMap<BindingKey, Object>,
    types: TypeRegistry,
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                bindings: RwLock::new(HashMap::new()),
                instances: DashMap::new(),
                types: TypeRegistry::new(),
            }),
        }
    }

    /// True when both handles share the same container state.
    pub fn ptr_eq(a: &Container, b: &Container) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    // ── Registration ──

    /// Registers a non-singleton binding.
    ///
    /// Factory sources are invoked immediately with the container and the
    /// result stored; value sources are stored as-is with their flag.
    ///
    /// # Errors
    /// Propagates the factory's error for factory sources; value sources
    /// cannot fail.
    pub fn bind(
        &self,
        key: impl Into<BindingKey>,
        source: impl Into<BindSource>,
    ) -> Result<()> {
        self.bind_with(key, source, false)
    }

    /// Registers a binding with an explicit singleton flag.
    ///
    /// A singleton factory's produced value is additionally seeded into the
    /// instance cache at bind time. An existing cache entry is never
    /// overwritten.
    pub fn bind_with(
        &self,
        key: impl Into<BindingKey>,
        source: impl Into<BindSource>,
        singleton: bool,
    ) -> Result<()> {
        let key = key.into();
        match source.into() {
            BindSource::Factory(producer) => {
                // Eager evaluation: the factory runs exactly once, here.
                let value = producer(self)?;
                if singleton {
                    self.inner
                        .instances
                        .entry(key.clone())
                        .or_insert_with(|| value.clone());
                }
                debug!(key = %key, singleton, "Bound factory result");
                self.inner
                    .bindings
                    .write()
                    .insert(key, Binding::Produced { value, singleton });
            }
            BindSource::Value(value) => {
                debug!(key = %key, singleton, "Bound value");
                self.inner
                    .bindings
                    .write()
                    .insert(key, Binding::Value { value, singleton });
            }
        }
        Ok(())
    }

    /// Sugar for a singleton binding.
    pub fn singleton(
        &self,
        key: impl Into<BindingKey>,
        source: impl Into<BindSource>,
    ) -> Result<()> {
        self.bind_with(key, source, true)
    }

    /// Declares a constructible blueprint on this container.
    ///
    /// Shadows any link-time blueprint registered for the same key.
    pub fn declare(&self, blueprint: Blueprint) {
        self.inner.types.declare(blueprint);
    }

    /// Removes a binding. The instance cache is left untouched.
    pub fn unbind(&self, key: impl Into<BindingKey>) {
        let key = key.into();
        debug!(key = %key, "Unbound");
        self.inner.bindings.write().remove(&key);
    }

    // ── Lookup ──

    /// True if the key is present in either the instance cache or the
    /// binding registry.
    pub fn has(&self, key: impl Into<BindingKey>) -> bool {
        let key = key.into();
        self.inner.instances.contains_key(&key)
            || self.inner.bindings.read().contains_key(&key)
    }

    /// The raw registered binding, if any.
    pub fn binding(&self, key: impl Into<BindingKey>) -> Option<Binding> {
        let key = key.into();
        self.inner.bindings.read().get(&key).cloned()
    }

    /// The read path over a binding, without construction.
    ///
    /// Returns `None` for unknown keys; the cached singleton when present;
    /// the produced value for factory bindings; otherwise the binding's
    /// value flattened to an object (class and path strings surface as
    /// `String`s, instances as themselves).
    pub fn make(&self, key: impl Into<BindingKey>) -> Option<Object> {
        let key = key.into();
        let binding = self.binding(&key)?;

        if let Some(cached) = self.inner.instances.get(&key) {
            return Some(cached.value().clone());
        }

        Some(match binding {
            Binding::Produced { value, .. } => value,
            Binding::Value { value, .. } => match value {
                BoundValue::Class(class) => object(class.as_str().to_string()),
                BoundValue::Path(path) => object(path),
                BoundValue::Instance(instance) => instance,
            },
        })
    }

    /// All registered binding keys, in no particular order.
    pub fn bindings(&self) -> Vec<BindingKey> {
        self.inner.bindings.read().keys().cloned().collect()
    }

    /// A snapshot of the singleton instance cache.
    pub fn singletons(&self) -> HashMap<BindingKey, Object> {
        self.inner
            .instances
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    // ── Resolution ──

    /// Resolves a key into a constructed object.
    ///
    /// Unknown keys fall back to treating the key itself as a concrete
    /// class path, so unregistered constructible classes auto-wire.
    ///
    /// # Errors
    /// [`ContainerError::NotInstantiable`] when neither a binding nor a
    /// blueprint covers the key; [`ContainerError::CircularDependency`]
    /// when the constructor graph loops back on itself.
    pub fn resolve(&self, key: impl Into<BindingKey>) -> Result<Object> {
        self.resolve_with(key, Vec::new())
    }

    /// Resolves with caller-supplied extra constructor arguments, passed
    /// to the construct function ahead of the auto-wired parameters.
    pub fn resolve_with(
        &self,
        key: impl Into<BindingKey>,
        extra: Vec<Object>,
    ) -> Result<Object> {
        let key = key.into();
        let mut stack = ResolveStack::new();
        self.resolve_inner(&key, extra, &mut stack)
    }

    /// The legacy five-way read dispatch layered over `resolve`.
    ///
    /// Cached singleton ⇒ the instance; produced factory value ⇒ as-is;
    /// path-style value ⇒ the opaque string; instance value ⇒ the object;
    /// class value or unknown key ⇒ delegate to [`Container::resolve`].
    pub fn get(&self, key: impl Into<BindingKey>) -> Result<Object> {
        let key = key.into();

        if let Some(cached) = self.inner.instances.get(&key) {
            return Ok(cached.value().clone());
        }

        match self.binding(&key) {
            Some(Binding::Produced { value, .. }) => Ok(value),
            Some(Binding::Value { value: BoundValue::Path(path), .. }) => Ok(object(path)),
            Some(Binding::Value { value: BoundValue::Instance(instance), .. }) => Ok(instance),
            Some(Binding::Value { value: BoundValue::Class(_), .. }) | None => {
                self.resolve(key)
            }
        }
    }

    /// Builds a fresh instance of a class path, bypassing bindings.
    ///
    /// `extra` arguments are handed to the construct function ahead of the
    /// auto-wired parameters.
    pub fn build_object(
        &self,
        target: impl Into<BindingKey>,
        extra: Vec<Object>,
    ) -> Result<Object> {
        let target = target.into();
        let mut stack = ResolveStack::new();
        self.build_object_inner(&target, extra, &mut stack)
    }

    pub(crate) fn blueprint_for(&self, key: &BindingKey) -> Option<Blueprint> {
        self.inner.types.lookup(key)
    }

    // ── Internal ──

    fn resolve_inner(
        &self,
        key: &BindingKey,
        extra: Vec<Object>,
        stack: &mut ResolveStack,
    ) -> Result<Object> {
        trace!(key = %key, "Resolving");

        let binding = self.binding(key);
        let singleton = binding.as_ref().map(Binding::is_singleton).unwrap_or(false);

        if singleton {
            if let Some(cached) = self.inner.instances.get(key) {
                return Ok(cached.value().clone());
            }
        }

        let built = match binding {
            // Unknown key: the key itself is the target class.
            None => self.build_object_inner(key, extra, stack)?,
            Some(Binding::Produced { value, .. }) => value,
            Some(Binding::Value { value, .. }) => match value {
                BoundValue::Class(target) => {
                    self.build_object_inner(&target, extra, stack)?
                }
                BoundValue::Instance(instance) => instance,
                BoundValue::Path(_) => {
                    return Err(ContainerError::NotInstantiable(NotInstantiableError {
                        key: key.clone(),
                        required_by: stack.last(),
                    }));
                }
            },
        };

        if singleton {
            // First write wins; the cached instance is canonical.
            let cached = self
                .inner
                .instances
                .entry(key.clone())
                .or_insert(built);
            return Ok(cached.value().clone());
        }

        Ok(built)
    }

    fn build_object_inner(
        &self,
        target: &BindingKey,
        extra: Vec<Object>,
        stack: &mut ResolveStack,
    ) -> Result<Object> {
        if stack.contains(target) {
            let chain = stack.cycle_chain(target);
            warn!(chain = ?chain, "Circular dependency detected");
            return Err(ContainerError::CircularDependency(
                CircularDependencyError { chain },
            ));
        }

        let blueprint = self.blueprint_for(target).ok_or_else(|| {
            ContainerError::NotInstantiable(NotInstantiableError {
                key: target.clone(),
                required_by: stack.last(),
            })
        })?;

        trace!(target = %target, "Building object");

        stack.push(target.clone());
        let result = self.construct(&blueprint, extra, stack);
        stack.pop();
        result
    }

    fn construct(
        &self,
        blueprint: &Blueprint,
        extra: Vec<Object>,
        stack: &mut ResolveStack,
    ) -> Result<Object> {
        let mut args = extra;
        for param in blueprint.parameters() {
            match param {
                Param::Class(dep) => {
                    args.push(self.resolve_inner(dep, Vec::new(), stack)?);
                }
                Param::Container => args.push(object(self.clone())),
                Param::Optional | Param::Collection => {}
            }
        }
        blueprint.build(args)
    }
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.inner.bindings.read().len())
            .field("cached", &self.inner.instances.len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// ResolveStack (cycle guard)
// ═══════════════════════════════════════════

/// Keys currently being built, owned by one top-level resolve call.
///
/// Passed down the recursion rather than stored on the container, so
/// concurrent resolves on other threads never see each other's stacks.
pub(crate) struct ResolveStack {
    chain: Vec<BindingKey>,
    set: HashSet<BindingKey>,
}

impl ResolveStack {
    fn new() -> Self {
        Self {
            chain: Vec::new(),
            set: HashSet::new(),
        }
    }

    fn contains(&self, key: &BindingKey) -> bool {
        self.set.contains(key)
    }

    fn push(&mut self, key: BindingKey) {
        self.set.insert(key.clone());
        self.chain.push(key);
    }

    fn pop(&mut self) {
        if let Some(key) = self.chain.pop() {
            self.set.remove(&key);
        }
    }

    fn last(&self) -> Option<BindingKey> {
        self.chain.last().cloned()
    }

    /// The chain from the first occurrence of `key` through the end, with
    /// the repeated key appended, e.g. `["A", "B", "A"]`.
    fn cycle_chain(&self, key: &BindingKey) -> Vec<BindingKey> {
        let start = self.chain.iter().position(|k| k == key).unwrap_or(0);
        let mut chain = self.chain[start..].to_vec();
        chain.push(key.clone());
        chain
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::Container;
    pub use crate::binding::{BindSource, Binding, BoundValue, Object, Producer, object};
    pub use crate::blueprint::{Args, Blueprint, BlueprintEntry, Method, Param};
    pub use crate::error::{ContainerError, Result};
    pub use crate::invoke::{Arguments, CallParam, CallTarget, Callable};
    pub use crate::key::BindingKey;
    pub use crate::provider::Provider;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
