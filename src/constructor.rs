//! Constructors and the factory functions behind them.
//!
//! A type declares how it can be built as an ordered list of constructors.
//! Each constructor names the parameter types it needs and carries a factory
//! function that receives those parameters, already resolved, in order.
//!
//! - [`Constructor<T>`]: typed constructor, built from any closure or function
//!   taking `Arc<A1>, Arc<A2>, ...` (up to eight parameters)
//! - [`ConstructorDescriptor`]: the type-erased form stored in the registry
//! - [`Injectable`]: implemented by types that declare their own constructors,
//!   usually through `#[derive(Injectable)]`

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::descriptor::{Instance, TypeDescriptor};
use crate::error::ResolveError;

type FactoryFn = dyn Fn(Arguments) -> Result<Instance, ResolveError> + Send + Sync;

/// Types that declare the constructors the container may use to build them.
///
/// Constructors are listed in preference order: the container picks the
/// first one whose parameter types are all registered.
///
/// # Example
///
/// ```ignore
/// impl Injectable for Report {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![
///             Constructor::new(|db: Arc<Database>, cache: Arc<Cache>| Report::cached(db, cache)),
///             Constructor::new(|db: Arc<Database>| Report::direct(db)),
///         ]
///     }
/// }
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    fn constructors() -> Vec<Constructor<Self>>;
}

/// Resolved parameter instances handed to a factory, in parameter order.
pub struct Arguments {
    values: std::vec::IntoIter<Instance>,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Instance>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    /// Takes the next argument, downcast to `A`.
    pub fn next<A: Send + Sync + 'static>(&mut self) -> Result<Arc<A>, ResolveError> {
        let expected = TypeDescriptor::of::<A>();
        let value = self
            .values
            .next()
            .ok_or(ResolveError::MissingArgument { expected })?;
        value
            .downcast::<A>()
            .map_err(|_| ResolveError::TypeMismatch { expected })
    }

    /// Number of arguments not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

/// A function the container can call to build a `T`.
///
/// Implemented for every `Fn(Arc<A1>, ..., Arc<An>) -> T` with up to eight
/// parameters; `Args` is the tuple `(A1, ..., An)` and only exists to keep
/// the implementations apart.
pub trait Factory<T, Args>: Send + Sync + 'static {
    /// Parameter types, in call order.
    fn parameters() -> Vec<TypeDescriptor>;

    fn call(&self, args: &mut Arguments) -> Result<T, ResolveError>;
}

macro_rules! impl_factory {
    ($($ty:ident $arg:ident),*) => {
        impl<Func, T, $($ty,)*> Factory<T, ($($ty,)*)> for Func
        where
            Func: Fn($(Arc<$ty>),*) -> T + Send + Sync + 'static,
            $($ty: Send + Sync + 'static,)*
        {
            fn parameters() -> Vec<TypeDescriptor> {
                vec![$(TypeDescriptor::of::<$ty>()),*]
            }

            #[allow(unused_variables)]
            fn call(&self, args: &mut Arguments) -> Result<T, ResolveError> {
                $(let $arg = args.next::<$ty>()?;)*
                Ok((self)($($arg),*))
            }
        }
    };
}

impl_factory!();
impl_factory!(A1 a1);
impl_factory!(A1 a1, A2 a2);
impl_factory!(A1 a1, A2 a2, A3 a3);
impl_factory!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_factory!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_factory!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_factory!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_factory!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

/// Type-erased constructor: parameter types plus a factory producing an [`Instance`].
#[derive(Clone)]
pub struct ConstructorDescriptor {
    output: TypeDescriptor,
    parameters: Vec<TypeDescriptor>,
    factory: Arc<FactoryFn>,
}

impl ConstructorDescriptor {
    /// Builds a constructor from raw parts.
    ///
    /// The factory must produce an instance of `output`; typed lookups of a
    /// type registered with a lying factory fail with
    /// [`ResolveError::TypeMismatch`].
    pub fn from_parts<F>(output: TypeDescriptor, parameters: Vec<TypeDescriptor>, factory: F) -> Self
    where
        F: Fn(Arguments) -> Result<Instance, ResolveError> + Send + Sync + 'static,
    {
        Self {
            output,
            parameters,
            factory: Arc::new(factory),
        }
    }

    /// Type this constructor produces.
    pub fn output(&self) -> TypeDescriptor {
        self.output
    }

    pub fn parameters(&self) -> &[TypeDescriptor] {
        &self.parameters
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Whether every parameter type satisfies `is_registered`.
    pub(crate) fn is_usable(&self, is_registered: impl Fn(&TypeDescriptor) -> bool) -> bool {
        self.parameters.iter().all(is_registered)
    }

    pub(crate) fn invoke(&self, values: Vec<Instance>) -> Result<Instance, ResolveError> {
        (self.factory)(Arguments::new(values))
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("output", &self.output)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A constructor producing `T`.
pub struct Constructor<T> {
    inner: ConstructorDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Constructor<T> {
    /// Wraps a factory function; its parameter types become the constructor's.
    ///
    /// ```ignore
    /// let ctor = Constructor::new(|leaf: Arc<Leaf>| Node { leaf });
    /// ```
    pub fn new<Args, F>(factory: F) -> Self
    where
        Args: 'static,
        F: Factory<T, Args>,
    {
        let inner = ConstructorDescriptor::from_parts(
            TypeDescriptor::of::<T>(),
            <F as Factory<T, Args>>::parameters(),
            move |mut args| {
                let value = <F as Factory<T, Args>>::call(&factory, &mut args)?;
                Ok(Arc::new(value) as Instance)
            },
        );
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    pub fn parameters(&self) -> &[TypeDescriptor] {
        self.inner.parameters()
    }

    /// Drops the static type, keeping the descriptor stored by the registry.
    pub fn into_descriptor(self) -> ConstructorDescriptor {
        self.inner
    }
}

impl<T> Clone for Constructor<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<T> From<Constructor<T>> for ConstructorDescriptor {
    fn from(constructor: Constructor<T>) -> Self {
        constructor.inner
    }
}
