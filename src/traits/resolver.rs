//! Resolution traits shared by the container, unit-of-work handles, and
//! factory contexts.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::{key_of_trait, key_of_type, Key};
use crate::traits::Teardown;

/// Object-safe resolution core.
///
/// This is the low-level surface the typed sugar in [`Resolver`] is built on.
/// It is implemented by [`Container`](crate::Container),
/// [`UnitOfWork`](crate::UnitOfWork), and the
/// [`ResolverContext`](crate::ResolverContext) handed to factories, so a
/// factory written against `&ResolverContext` resolves correctly from
/// whichever position it runs in.
pub trait ResolverCore: Send + Sync {
    /// Resolves one instance for the capability/qualifier request.
    fn resolve_any(
        &self,
        key: &Key,
        qualifier: Option<&'static str>,
    ) -> DiResult<Arc<dyn Any + Send + Sync>>;

    /// Resolves every candidate of a capability, label-keyed.
    fn resolve_all(
        &self,
        key: &Key,
    ) -> DiResult<Vec<(&'static str, Arc<dyn Any + Send + Sync>)>>;

    /// Registers a teardown hook with the store backing this resolver: the
    /// active unit of work when there is one, the container root otherwise.
    fn push_teardown(
        &self,
        type_name: &'static str,
        hook: Box<dyn FnOnce() -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send>,
    );
}

/// Typed resolution interface.
///
/// Blanket-implemented for everything that implements [`ResolverCore`].
///
/// # Examples
///
/// ```rust
/// use vessel_di::{BindingCollection, Resolver};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// let mut bindings = BindingCollection::new();
/// bindings.add_singleton(3u16).unwrap();
/// bindings
///     .add_singleton_trait::<dyn Greeter>(Arc::new(English))
///     .unwrap();
///
/// let container = bindings.build().unwrap();
/// assert_eq!(*container.get::<u16>().unwrap(), 3);
/// assert_eq!(container.get_trait::<dyn Greeter>().unwrap().greet(), "hello");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete type.
    fn get<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        downcast_concrete(self.resolve_any(&key_of_type::<T>(), None)?)
    }

    /// Resolves a concrete type registered under the given qualifier.
    ///
    /// Matching is exact and case-sensitive; a qualified request never falls
    /// back to a primary or default candidate.
    fn get_qualified<T: 'static + Send + Sync>(
        &self,
        qualifier: &'static str,
    ) -> DiResult<Arc<T>> {
        downcast_concrete(self.resolve_any(&key_of_type::<T>(), Some(qualifier))?)
    }

    /// Resolves a trait object.
    fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        downcast_trait::<T>(self.resolve_any(&key_of_trait::<T>(), None)?)
    }

    /// Resolves a trait object registered under the given qualifier.
    fn get_qualified_trait<T: ?Sized + 'static + Send + Sync>(
        &self,
        qualifier: &'static str,
    ) -> DiResult<Arc<T>> {
        downcast_trait::<T>(self.resolve_any(&key_of_trait::<T>(), Some(qualifier))?)
    }

    /// Resolves every candidate of a concrete type, keyed by label
    /// (qualifier, or implementation type name for the unqualified default).
    fn get_all<T: 'static + Send + Sync>(&self) -> DiResult<HashMap<&'static str, Arc<T>>> {
        let mut out = HashMap::new();
        for (label, any) in self.resolve_all(&key_of_type::<T>())? {
            out.insert(label, downcast_concrete::<T>(any)?);
        }
        Ok(out)
    }

    /// Resolves every implementation of a trait, keyed by label.
    fn get_all_trait<T: ?Sized + 'static + Send + Sync>(
        &self,
    ) -> DiResult<HashMap<&'static str, Arc<T>>> {
        let mut out = HashMap::new();
        for (label, any) in self.resolve_all(&key_of_trait::<T>())? {
            out.insert(label, downcast_trait::<T>(any)?);
        }
        Ok(out)
    }

    /// Resolves a concrete type, panicking on failure.
    ///
    /// Fail-fast sugar for wiring code that considers a missing binding a
    /// programming error.
    fn get_required<T: 'static + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>().unwrap_or_else(|e| {
            panic!("failed to resolve {}: {}", std::any::type_name::<T>(), e)
        })
    }

    /// Resolves a trait object, panicking on failure.
    fn get_required_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Arc<T> {
        self.get_trait::<T>().unwrap_or_else(|e| {
            panic!("failed to resolve {}: {}", std::any::type_name::<T>(), e)
        })
    }

    /// Registers an instance for teardown when the backing store ends.
    ///
    /// Called from factories for instances whose cleanup is not already
    /// declared at binding time.
    fn manage<T: Teardown>(&self, instance: Arc<T>) {
        self.push_teardown(
            std::any::type_name::<T>(),
            Box::new(move || instance.teardown()),
        );
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}

pub(crate) fn downcast_concrete<T: 'static + Send + Sync>(
    any: Arc<dyn Any + Send + Sync>,
) -> DiResult<Arc<T>> {
    any.downcast::<T>().map_err(|_| DiError::TypeMismatch {
        type_name: std::any::type_name::<T>(),
    })
}

// Trait instances are stored as Arc<Arc<dyn T>> behind the Any, since only
// the sized outer Arc can be downcast.
pub(crate) fn downcast_trait<T: ?Sized + 'static + Send + Sync>(
    any: Arc<dyn Any + Send + Sync>,
) -> DiResult<Arc<T>> {
    any.downcast::<Arc<T>>()
        .map(|outer| (*outer).clone())
        .map_err(|_| DiError::TypeMismatch {
            type_name: std::any::type_name::<T>(),
        })
}
