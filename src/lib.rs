//! Provision - Dependency Injection Container
//!
//! Registers constructible types, wires their constructor dependencies
//! recursively, and caches one shared instance per type.

// Lets `#[derive(Injectable)]` output (which names `::provision`) compile inside this crate.
extern crate self as provision;

pub mod cli;
pub mod config;
pub mod constructor;
pub mod container;
pub mod descriptor;
pub mod error;
pub mod registry;

pub use constructor::{Arguments, Constructor, ConstructorDescriptor, Factory, Injectable};
pub use container::{Container, Module};
pub use descriptor::{Instance, TypeDescriptor};
pub use error::ResolveError;
pub use registry::Registry;

// Re-export the derive macro next to the trait it implements
pub use di_macros::Injectable;
