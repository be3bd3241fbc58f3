//! The set of types a container is allowed to instantiate.

use std::collections::HashMap;

use crate::constructor::ConstructorDescriptor;
use crate::descriptor::TypeDescriptor;
use crate::error::ResolveError;

/// Registered types and the constructors they declared.
///
/// Only grows: there is no way to unregister a type.
#[derive(Debug, Default)]
pub struct Registry {
    constructors: HashMap<TypeDescriptor, Vec<ConstructorDescriptor>>,
    order: Vec<TypeDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `ty` with its constructors.
    ///
    /// Returns `false` and leaves the first declaration in place when `ty` is
    /// already registered.
    pub fn register(&mut self, ty: TypeDescriptor, constructors: Vec<ConstructorDescriptor>) -> bool {
        if self.constructors.contains_key(&ty) {
            return false;
        }
        self.constructors.insert(ty, constructors);
        self.order.push(ty);
        true
    }

    pub fn contains(&self, ty: &TypeDescriptor) -> bool {
        self.constructors.contains_key(ty)
    }

    /// Constructors declared for `ty`, in declaration order.
    pub fn constructors(&self, ty: &TypeDescriptor) -> Option<&[ConstructorDescriptor]> {
        self.constructors.get(ty).map(Vec::as_slice)
    }

    /// First constructor of `ty` whose parameter types are all registered.
    pub fn select_constructor(
        &self,
        ty: &TypeDescriptor,
    ) -> Result<&ConstructorDescriptor, ResolveError> {
        let constructors = self
            .constructors
            .get(ty)
            .ok_or(ResolveError::Unregistered { ty: *ty })?;

        constructors
            .iter()
            .find(|ctor| ctor.is_usable(|param| self.contains(param)))
            .ok_or(ResolveError::NoUsableConstructor {
                ty: *ty,
                constructors: constructors.len(),
            })
    }

    /// Registered types, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
