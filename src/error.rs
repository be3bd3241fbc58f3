//! Resolution error types.

use thiserror::Error;

use crate::descriptor::TypeDescriptor;

/// Errors raised while resolving an instance from a [`Container`](crate::Container).
///
/// All variants are final for the failing request: nothing is retried and no
/// instance is cached for the requested type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Type is not registered: {ty}")]
    Unregistered { ty: TypeDescriptor },

    #[error("No usable constructor for {ty}: none of its {constructors} constructor(s) has only registered parameters")]
    NoUsableConstructor {
        ty: TypeDescriptor,
        constructors: usize,
    },

    #[error("Cyclic dependency: {}", display_path(.path))]
    CyclicDependency { path: Vec<TypeDescriptor> },

    #[error("Resolution of {ty} exceeded the maximum depth of {limit}")]
    DepthExceeded { ty: TypeDescriptor, limit: usize },

    // Only reachable through hand-built constructor descriptors
    #[error("Instance is not of the expected type {expected}")]
    TypeMismatch { expected: TypeDescriptor },

    #[error("Constructor ran out of arguments while expecting {expected}")]
    MissingArgument { expected: TypeDescriptor },
}

fn display_path(path: &[TypeDescriptor]) -> String {
    path.iter()
        .map(|ty| ty.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
