//! Resolver context handed to factory closures.

use std::any::Any;
use std::sync::Arc;

use crate::binding::AnyArc;
use crate::error::DiResult;
use crate::key::Key;
use crate::provider::Provider;
use crate::traits::ResolverCore;

use super::{ContainerShared, UowStore};

/// Context passed to factory functions for resolving their dependencies.
///
/// Wraps the resolution position the factory runs in (root for singleton
/// construction, the active unit of work otherwise) so one factory closure
/// works wherever its binding is resolved from. Teardown hooks registered
/// through the context land in the store that owns the instance being built.
///
/// # Examples
///
/// ```rust
/// use vessel_di::{BindingCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Clock { tick: u64 }
/// struct Stamper { clock: Arc<Clock> }
///
/// let mut bindings = BindingCollection::new();
/// bindings.add_singleton(Clock { tick: 7 }).unwrap();
/// bindings.add_prototype_factory::<Stamper, _>(|ctx| {
///     Ok(Stamper { clock: ctx.get::<Clock>()? })
/// }).unwrap();
///
/// let container = bindings.build().unwrap();
/// assert_eq!(container.get::<Stamper>().unwrap().clock.tick, 7);
/// ```
pub struct ResolverContext<'a> {
    shared: &'a Arc<ContainerShared>,
    uow: Option<&'a Arc<UowStore>>,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(
        shared: &'a Arc<ContainerShared>,
        uow: Option<&'a Arc<UowStore>>,
    ) -> Self {
        Self { shared, uow }
    }

    /// Deferred-resolution handle for a concrete type, bound to this
    /// context's scope.
    ///
    /// The provider resolves at `get()` time rather than construction time,
    /// the indirection that lets a singleton hold a prototype or
    /// unit-of-work capability without capturing one fixed instance.
    pub fn provider<T: 'static + Send + Sync>(&self) -> Provider<T> {
        Provider::of_type(
            self.shared.clone(),
            self.uow.map(Arc::downgrade),
            None,
        )
    }

    /// Qualified deferred-resolution handle bound to this context's scope.
    pub fn provider_qualified<T: 'static + Send + Sync>(
        &self,
        qualifier: &'static str,
    ) -> Provider<T> {
        Provider::of_type(
            self.shared.clone(),
            self.uow.map(Arc::downgrade),
            Some(qualifier),
        )
    }

    /// Trait-object deferred-resolution handle bound to this context's scope.
    pub fn provider_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Provider<T> {
        Provider::of_trait(
            self.shared.clone(),
            self.uow.map(Arc::downgrade),
            None,
        )
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(
        &self,
        key: &Key,
        qualifier: Option<&'static str>,
    ) -> DiResult<Arc<dyn Any + Send + Sync>> {
        ContainerShared::resolve(self.shared, key, qualifier, self.uow)
    }

    fn resolve_all(
        &self,
        key: &Key,
    ) -> DiResult<Vec<(&'static str, AnyArc)>> {
        ContainerShared::resolve_all(self.shared, key, self.uow)
    }

    fn push_teardown(
        &self,
        type_name: &'static str,
        hook: Box<dyn FnOnce() -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send>,
    ) {
        match self.uow {
            Some(store) => store.teardowns.lock().push(type_name, hook),
            None => self.shared.root_teardowns.lock().push(type_name, hook),
        }
    }
}
