//! The dependency container: registration, resolution and the instance cache.
//!
//! Resolution of a type `T`:
//!
//! 1. A cached instance of `T` is returned as is.
//! 2. `T` must be registered, otherwise [`ResolveError::Unregistered`].
//! 3. The first declared constructor whose parameter types are all registered
//!    is selected, otherwise [`ResolveError::NoUsableConstructor`].
//! 4. Each parameter is resolved recursively.
//! 5. The constructor runs once with the resolved parameters and the result
//!    is cached for the lifetime of the container.
//!
//! Re-entering a type that is still being resolved fails with
//! [`ResolveError::CyclicDependency`].
//!
//! # Example
//!
//! ```ignore
//! let container = Container::new();
//! container.register::<Leaf>();
//! container.register::<Node>();
//!
//! let node = container.get::<Node>()?;
//! assert!(Arc::ptr_eq(&node.leaf, &container.get::<Leaf>()?));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::config::ResolutionConfig;
use crate::constructor::{Constructor, ConstructorDescriptor, Injectable};
use crate::descriptor::{Instance, TypeDescriptor};
use crate::error::ResolveError;
use crate::registry::Registry;

/// A group of registrations installed together with [`Container::install`].
pub trait Module {
    fn register(&self, container: &Container);
}

/// Registry of constructible types plus the singleton instance of each
/// type resolved so far.
///
/// The container is `Send + Sync`. Concurrent first-time resolutions of a
/// type construct it at most once.
pub struct Container {
    registry: RwLock<Registry>,
    cache: RwLock<HashMap<TypeDescriptor, Arc<OnceCell<Instance>>>>,
    config: ResolutionConfig,
}

impl Container {
    /// Creates an empty container with default resolution limits.
    pub fn new() -> Self {
        Self::with_config(ResolutionConfig::default())
    }

    /// Creates an empty container with the given resolution limits.
    pub fn with_config(config: ResolutionConfig) -> Self {
        Self {
            registry: RwLock::new(Registry::new()),
            cache: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// Registers `T` with the constructors it declares.
    pub fn register<T: Injectable>(&self) {
        self.register_with(T::constructors());
    }

    /// Registers `T` with an explicit list of constructors, in preference order.
    pub fn register_with<T: Send + Sync + 'static>(&self, constructors: Vec<Constructor<T>>) {
        self.register_descriptor(
            TypeDescriptor::of::<T>(),
            constructors
                .into_iter()
                .map(Constructor::into_descriptor)
                .collect(),
        );
    }

    /// Registers a type described at runtime.
    ///
    /// Registering an already known type changes nothing; its first set of
    /// constructors is kept.
    pub fn register_descriptor(&self, ty: TypeDescriptor, constructors: Vec<ConstructorDescriptor>) {
        let count = constructors.len();
        if self.registry.write().register(ty, constructors) {
            tracing::debug!(ty = %ty, constructors = count, "Registered type");
        } else {
            tracing::debug!(ty = %ty, "Type already registered, keeping first declaration");
        }
    }

    /// Runs a module's registrations against this container.
    pub fn install<M: Module + ?Sized>(&self, module: &M) {
        module.register(self);
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.contains_descriptor(&TypeDescriptor::of::<T>())
    }

    pub fn contains_descriptor(&self, ty: &TypeDescriptor) -> bool {
        self.registry.read().contains(ty)
    }

    /// Registered types, in registration order.
    pub fn registered(&self) -> Vec<TypeDescriptor> {
        self.registry.read().iter().copied().collect()
    }

    /// Whether an instance of `ty` has been constructed and cached.
    pub fn is_resolved(&self, ty: &TypeDescriptor) -> bool {
        self.cached(ty).is_some()
    }

    /// Resolves `T`, constructing it and its dependencies on first use.
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveError> {
        let ty = TypeDescriptor::of::<T>();
        self.get_instance(&ty)?
            .downcast::<T>()
            .map_err(|_| ResolveError::TypeMismatch { expected: ty })
    }

    /// Returns the cached instance of `T` without constructing anything.
    pub fn try_get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.cached(&TypeDescriptor::of::<T>())
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    /// Resolves a type described at runtime.
    pub fn get_instance(&self, ty: &TypeDescriptor) -> Result<Instance, ResolveError> {
        let mut stack = ResolutionStack::new(self.config.max_depth);
        self.resolve(*ty, &mut stack)
    }

    fn resolve(&self, ty: TypeDescriptor, stack: &mut ResolutionStack) -> Result<Instance, ResolveError> {
        if let Some(instance) = self.cached(&ty) {
            tracing::trace!(ty = %ty, "Cache hit");
            return Ok(instance);
        }

        let constructor = {
            let registry = self.registry.read();
            if !registry.contains(&ty) {
                return Err(ResolveError::Unregistered { ty });
            }
            registry.select_constructor(&ty)?.clone()
        };
        tracing::trace!(ty = %ty, arity = constructor.arity(), "Selected constructor");

        stack.enter(ty)?;
        let arguments = constructor
            .parameters()
            .iter()
            .map(|param| self.resolve(*param, stack))
            .collect::<Result<Vec<_>, _>>();
        stack.exit();
        let arguments = arguments?;

        // Dependencies are resolved outside the cell so that no initializer
        // ever waits on another cell.
        let cell = self.cell(ty);
        let instance = cell.get_or_try_init(|| {
            tracing::debug!(ty = %ty, "Constructing instance");
            let instance = constructor.invoke(arguments)?;
            // A hand-built factory may produce another type; never cache it.
            if (*instance).type_id() != ty.id() {
                tracing::warn!(ty = %ty, "Constructor produced an instance of another type");
                return Err(ResolveError::TypeMismatch { expected: ty });
            }
            Ok(instance)
        })?;
        Ok(Arc::clone(instance))
    }

    fn cached(&self, ty: &TypeDescriptor) -> Option<Instance> {
        self.cache
            .read()
            .get(ty)
            .and_then(|cell| cell.get().cloned())
    }

    fn cell(&self, ty: TypeDescriptor) -> Arc<OnceCell<Instance>> {
        if let Some(cell) = self.cache.read().get(&ty) {
            return Arc::clone(cell);
        }
        Arc::clone(self.cache.write().entry(ty).or_default())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved = self
            .cache
            .read()
            .values()
            .filter(|cell| cell.get().is_some())
            .count();
        f.debug_struct("Container")
            .field("registered", &self.registry.read().len())
            .field("resolved", &resolved)
            .field("config", &self.config)
            .finish()
    }
}

/// Types currently being resolved along one dependency chain.
struct ResolutionStack {
    path: Vec<TypeDescriptor>,
    limit: usize,
}

impl ResolutionStack {
    fn new(limit: usize) -> Self {
        Self {
            path: Vec::new(),
            limit,
        }
    }

    fn enter(&mut self, ty: TypeDescriptor) -> Result<(), ResolveError> {
        if let Some(start) = self.path.iter().position(|entry| *entry == ty) {
            let mut path = self.path[start..].to_vec();
            path.push(ty);
            return Err(ResolveError::CyclicDependency { path });
        }
        // A limit of zero disables the depth guard; cycles are still caught above.
        if self.limit != 0 && self.path.len() >= self.limit {
            return Err(ResolveError::DepthExceeded {
                ty,
                limit: self.limit,
            });
        }
        self.path.push(ty);
        Ok(())
    }

    fn exit(&mut self) {
        self.path.pop();
    }
}
