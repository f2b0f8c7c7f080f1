//! Deferred resolution through provider handles.
//!
//! A [`Provider`] is the explicit replacement for runtime scope proxying: a
//! component that needs "the current instance for this scope" receives a
//! zero-argument handle at construction time and calls `get()` each time it
//! actually needs the instance.

use std::sync::{Arc, Weak};

use crate::binding::AnyArc;
use crate::container::{ContainerShared, UowStore};
use crate::error::DiResult;
use crate::key::{key_of_trait, key_of_type, Key};
use crate::traits::{downcast_concrete, downcast_trait};

/// Lazily resolves one capability each time [`get`](Provider::get) is called.
///
/// The provider remembers the scope position it was created from: a provider
/// handed to a unit-of-work factory keeps resolving against that unit of
/// work while it is active, and reports `NoActiveScope` after it ends. A
/// provider for a prototype binding yields a fresh instance per call, which
/// is how a singleton safely holds a prototype capability.
///
/// # Examples
///
/// ```rust
/// use vessel_di::{BindingCollection, Provider, Resolver};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// struct Counter { hits: AtomicU32 }
///
/// struct Dispatcher {
///     counters: Provider<Counter>,
/// }
///
/// let mut bindings = BindingCollection::new();
/// bindings.add_prototype_factory::<Counter, _>(|_| {
///     Ok(Counter { hits: AtomicU32::new(0) })
/// }).unwrap();
/// bindings.add_singleton_factory::<Dispatcher, _>(|ctx| {
///     Ok(Dispatcher { counters: ctx.provider::<Counter>() })
/// }).unwrap();
///
/// let container = bindings.build().unwrap();
/// let dispatcher = container.get::<Dispatcher>().unwrap();
///
/// let a = dispatcher.counters.get().unwrap();
/// let b = dispatcher.counters.get().unwrap();
/// a.hits.fetch_add(1, Ordering::SeqCst);
/// assert_eq!(b.hits.load(Ordering::SeqCst), 0); // fresh instance per get()
/// ```
pub struct Provider<T: ?Sized + 'static> {
    shared: Arc<ContainerShared>,
    /// Unit of work the provider originated in, if any. Weak so an ended
    /// unit of work's store is not kept alive by outstanding providers.
    origin: Option<Weak<UowStore>>,
    key: Key,
    qualifier: Option<&'static str>,
    extract: fn(AnyArc) -> DiResult<Arc<T>>,
}

impl<T: 'static + Send + Sync> Provider<T> {
    pub(crate) fn of_type(
        shared: Arc<ContainerShared>,
        origin: Option<Weak<UowStore>>,
        qualifier: Option<&'static str>,
    ) -> Self {
        Self {
            shared,
            origin,
            key: key_of_type::<T>(),
            qualifier,
            extract: downcast_concrete::<T>,
        }
    }
}

impl<T: ?Sized + 'static + Send + Sync> Provider<T> {
    pub(crate) fn of_trait(
        shared: Arc<ContainerShared>,
        origin: Option<Weak<UowStore>>,
        qualifier: Option<&'static str>,
    ) -> Self {
        Self {
            shared,
            origin,
            key: key_of_trait::<T>(),
            qualifier,
            extract: downcast_trait::<T>,
        }
    }
}

impl<T: ?Sized + 'static> Provider<T> {
    /// Resolves the current instance for this provider's scope position.
    ///
    /// Each call goes through full resolution: prototypes come back fresh,
    /// singletons and unit-of-work instances come back cached, and every
    /// resolution error of a direct `get` can surface here too.
    pub fn get(&self) -> DiResult<Arc<T>> {
        let origin = self.origin.as_ref().and_then(Weak::upgrade);
        let any =
            ContainerShared::resolve(&self.shared, &self.key, self.qualifier, origin.as_ref())?;
        (self.extract)(any)
    }
}

impl<T: ?Sized + 'static> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            origin: self.origin.clone(),
            key: self.key,
            qualifier: self.qualifier,
            extract: self.extract,
        }
    }
}
