//! Compile-time constructor generation for the provision container.
//!
//! This crate provides `#[derive(Injectable)]`, which writes the constructor
//! list a type would otherwise declare by hand. Generated code refers to
//! `::provision::Injectable` and `::provision::Constructor`.

use proc_macro::TokenStream;

mod injectable;

/// Derive macro for types the container can build.
///
/// Generates an `Injectable` implementation with a single constructor whose
/// parameters are the struct's `Arc<T>` fields, in field order.
///
/// # Requirements
///
/// - Every field is `Arc<T>` with `T` registered in the container, or is
///   marked `#[inject(default)]` and implements `Default`
/// - Unit structs and structs without fields get a zero-argument constructor
///
/// # Example
///
/// ```ignore
/// use provision::Injectable;
///
/// #[derive(Injectable)]
/// pub struct EntityService {
///     repository: Arc<EntityRepository>,
///     config: Arc<AppConfig>,
///     #[inject(default)]
///     hits: AtomicUsize,
/// }
///
/// // Generated implementation:
/// // impl Injectable for EntityService {
/// //     fn constructors() -> Vec<Constructor<Self>> {
/// //         vec![Constructor::new(
/// //             |repository: Arc<EntityRepository>, config: Arc<AppConfig>| Self {
/// //                 repository,
/// //                 config,
/// //                 hits: Default::default(),
/// //             },
/// //         )]
/// //     }
/// // }
/// ```
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable_impl(input)
}
