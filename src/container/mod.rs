//! Container module: the resolution façade over the frozen registry.
//!
//! The [`Container`] orchestrates the registry (construction recipes), the
//! scope stores (singleton slots at the root, one slot array per unit of
//! work), and teardown bookkeeping.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::binding::{AnyArc, Binding};
use crate::error::{DiError, DiResult};
use crate::internal::{StackGuard, TeardownBag};
use crate::key::Key;
use crate::provider::Provider;
use crate::registry::Registry;
use crate::scope::Scope;
use crate::traits::ResolverCore;

mod context;
mod unit_of_work;

pub use context::ResolverContext;
pub use unit_of_work::{UnitOfWork, UnitOfWorkId};
pub(crate) use unit_of_work::UowStore;

/// Dependency injection container.
///
/// Built from a [`BindingCollection`](crate::BindingCollection), the
/// container resolves bindings according to their scope, hands out
/// [`UnitOfWork`] handles for unit-of-work-scoped resolution, and tears
/// everything down on [`close`](Container::close).
///
/// The container is a passive library: caller threads drive it, and
/// concurrent resolution is safe. Cloning is cheap (`Arc` internally) and
/// clones share all state.
///
/// # Examples
///
/// ```rust
/// use vessel_di::{BindingCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut bindings = BindingCollection::new();
/// bindings.add_singleton(Database { url: "postgres://localhost".to_string() }).unwrap();
/// bindings.add_prototype_factory::<UserService, _>(|r| {
///     Ok(UserService { db: r.get::<Database>()? })
/// }).unwrap();
///
/// let container = bindings.build().unwrap();
/// let service = container.get::<UserService>().unwrap();
/// assert_eq!(service.db.url, "postgres://localhost");
/// container.close().unwrap();
/// ```
pub struct Container {
    shared: Arc<ContainerShared>,
}

pub(crate) struct ContainerShared {
    pub(crate) registry: Registry,
    /// Per-binding singleton slots; index assigned at registry finalize.
    singletons: Box<[OnceCell<AnyArc>]>,
    pub(crate) root_teardowns: Mutex<TeardownBag>,
    /// Still-active unit-of-work stores, by id.
    active: Mutex<HashMap<UnitOfWorkId, Arc<UowStore>>>,
    closed: AtomicBool,
}

impl ContainerShared {
    fn ensure_open(&self) -> DiResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(DiError::ContainerClosed)
        } else {
            Ok(())
        }
    }

    /// Resolves one request through selection, cycle guard, and scope store.
    ///
    /// Takes the `Arc` explicitly so resolver contexts handed to factories
    /// can clone it for provider handles.
    pub(crate) fn resolve(
        shared: &Arc<ContainerShared>,
        key: &Key,
        qualifier: Option<&'static str>,
        uow: Option<&Arc<UowStore>>,
    ) -> DiResult<AnyArc> {
        shared.ensure_open()?;
        let binding = shared.registry.select(key, qualifier)?;
        Self::resolve_candidate(shared, key, binding, uow)
    }

    /// Resolves every candidate of a capability, label-keyed.
    pub(crate) fn resolve_all(
        shared: &Arc<ContainerShared>,
        key: &Key,
        uow: Option<&Arc<UowStore>>,
    ) -> DiResult<Vec<(&'static str, AnyArc)>> {
        shared.ensure_open()?;
        let candidates = shared.registry.all(key);
        let mut out = Vec::with_capacity(candidates.len());
        for binding in candidates {
            out.push((
                binding.label(key),
                Self::resolve_candidate(shared, key, binding, uow)?,
            ));
        }
        Ok(out)
    }

    fn resolve_candidate(
        shared: &Arc<ContainerShared>,
        key: &Key,
        binding: &Binding,
        uow: Option<&Arc<UowStore>>,
    ) -> DiResult<AnyArc> {
        // In-progress guard: keyed by (capability, candidate qualifier) so a
        // path revisiting the same candidate fails before its factory reruns.
        let _frame = StackGuard::enter(key.display_name(), binding.qualifier)?;

        match binding.scope {
            Scope::Singleton => {
                // Singleton factories always resolve their dependencies in
                // root context, never against the caller's unit of work.
                match binding.slot {
                    Some(slot) => {
                        let cell = &shared.singletons[slot];
                        if let Some(value) = cell.get() {
                            return Ok(value.clone());
                        }
                        let ctx = ResolverContext::new(shared, None);
                        cell.get_or_try_init(|| {
                            tracing::debug!(
                                binding = key.display_name(),
                                qualifier = binding.qualifier,
                                "constructing singleton"
                            );
                            (binding.ctor)(&ctx)
                        })
                        .map(Arc::clone)
                    }
                    None => {
                        let ctx = ResolverContext::new(shared, None);
                        (binding.ctor)(&ctx)
                    }
                }
            }
            Scope::Prototype => {
                let ctx = ResolverContext::new(shared, uow);
                (binding.ctor)(&ctx)
            }
            Scope::UnitOfWork => {
                let store = match uow {
                    Some(store) if !store.ended() => store,
                    _ => {
                        return Err(DiError::NoActiveScope {
                            detail: format!(
                                "{} is unit-of-work scoped",
                                key.display_name()
                            ),
                        })
                    }
                };
                match binding.slot {
                    Some(slot) => {
                        let cell = &store.cells[slot];
                        if let Some(value) = cell.get() {
                            return Ok(value.clone());
                        }
                        let ctx = ResolverContext::new(shared, Some(store));
                        cell.get_or_try_init(|| {
                            tracing::debug!(
                                binding = key.display_name(),
                                unit_of_work = %store.id,
                                "constructing unit-of-work instance"
                            );
                            (binding.ctor)(&ctx)
                        })
                        .map(Arc::clone)
                    }
                    None => {
                        let ctx = ResolverContext::new(shared, Some(store));
                        (binding.ctor)(&ctx)
                    }
                }
            }
        }
    }

    /// Removes the store for `id` and runs its teardown hooks in reverse
    /// creation order.
    pub(crate) fn end_unit_of_work(&self, id: UnitOfWorkId) -> DiResult<()> {
        let store = self.active.lock().remove(&id).ok_or_else(|| {
            DiError::NoActiveScope {
                detail: format!("unit of work {} is not active", id),
            }
        })?;
        store.mark_ended();
        let failures = store.teardowns.lock().run_reverse();
        tracing::debug!(unit_of_work = %id, "unit of work ended");
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DiError::Teardown { failures })
        }
    }
}

impl Container {
    pub(crate) fn new(registry: Registry) -> Self {
        let singletons = (0..registry.singleton_slots)
            .map(|_| OnceCell::new())
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shared: Arc::new(ContainerShared {
                registry,
                singletons,
                root_teardowns: Mutex::new(TeardownBag::default()),
                active: Mutex::new(HashMap::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Starts a unit of work and returns the handle that resolves
    /// unit-of-work-scoped bindings.
    ///
    /// Units of work are independent: unrelated concurrent units never share
    /// instances or contend on each other's stores.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vessel_di::{BindingCollection, Resolver};
    /// use std::sync::Arc;
    ///
    /// struct RequestLog { entries: parking_lot::Mutex<Vec<String>> }
    ///
    /// let mut bindings = BindingCollection::new();
    /// bindings.add_unit_of_work_factory::<RequestLog, _>(|_| {
    ///     Ok(RequestLog { entries: parking_lot::Mutex::new(Vec::new()) })
    /// }).unwrap();
    ///
    /// let container = bindings.build().unwrap();
    ///
    /// let work = container.begin_unit_of_work().unwrap();
    /// let log_a = work.get::<RequestLog>().unwrap();
    /// let log_b = work.get::<RequestLog>().unwrap();
    /// assert!(Arc::ptr_eq(&log_a, &log_b)); // stable within the unit of work
    ///
    /// let id = work.id();
    /// container.end_unit_of_work(id).unwrap();
    /// ```
    pub fn begin_unit_of_work(&self) -> DiResult<UnitOfWork> {
        self.shared.ensure_open()?;
        let store = Arc::new(UowStore::new(self.shared.registry.unit_of_work_slots));
        let id = store.id;
        self.shared.active.lock().insert(id, store.clone());
        tracing::debug!(unit_of_work = %id, "unit of work started");
        Ok(UnitOfWork::new(self.shared.clone(), store))
    }

    /// Ends the unit of work with the given id.
    ///
    /// Runs teardown hooks for every instance created under the id, in
    /// reverse creation order, then discards the store. Ending an unknown or
    /// already-ended id fails with
    /// [`NoActiveScope`](crate::DiError::NoActiveScope). Hook failures are
    /// collected into [`Teardown`](crate::DiError::Teardown); cleanup always
    /// reaches every instance.
    pub fn end_unit_of_work(&self, id: UnitOfWorkId) -> DiResult<()> {
        self.shared.end_unit_of_work(id)
    }

    /// Closes the container. Terminal: every later resolution fails with
    /// [`ContainerClosed`](crate::DiError::ContainerClosed).
    ///
    /// Ends all still-active units of work, then tears down singletons in
    /// reverse construction order. Hook failures are collected and reported
    /// together after cleanup finishes; a second `close` is a no-op.
    pub fn close(&self) -> DiResult<()> {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut failures = Vec::new();
        let active: Vec<Arc<UowStore>> = {
            let mut map = self.shared.active.lock();
            map.drain().map(|(_, store)| store).collect()
        };
        if !active.is_empty() {
            tracing::warn!(
                count = active.len(),
                "closing container with active units of work"
            );
        }
        for store in active {
            store.mark_ended();
            failures.extend(store.teardowns.lock().run_reverse());
        }
        failures.extend(self.shared.root_teardowns.lock().run_reverse());
        tracing::debug!("container closed");

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DiError::Teardown { failures })
        }
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Deferred-resolution handle for a concrete type, bound to root scope.
    pub fn provider<T: 'static + Send + Sync>(&self) -> Provider<T> {
        Provider::of_type(self.shared.clone(), None, None)
    }

    /// Deferred-resolution handle for a qualified concrete type.
    pub fn provider_qualified<T: 'static + Send + Sync>(
        &self,
        qualifier: &'static str,
    ) -> Provider<T> {
        Provider::of_type(self.shared.clone(), None, Some(qualifier))
    }

    /// Deferred-resolution handle for a trait object.
    pub fn provider_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Provider<T> {
        Provider::of_trait(self.shared.clone(), None, None)
    }
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        if Arc::strong_count(&self.shared) == 1 && !self.is_closed() {
            if let Some(bag) = self.shared.root_teardowns.try_lock() {
                if !bag.is_empty() {
                    tracing::warn!(
                        "container dropped without close(); teardown hooks skipped"
                    );
                }
            }
        }
    }
}

impl ResolverCore for Container {
    fn resolve_any(
        &self,
        key: &Key,
        qualifier: Option<&'static str>,
    ) -> DiResult<Arc<dyn Any + Send + Sync>> {
        ContainerShared::resolve(&self.shared, key, qualifier, None)
    }

    fn resolve_all(
        &self,
        key: &Key,
    ) -> DiResult<Vec<(&'static str, Arc<dyn Any + Send + Sync>)>> {
        ContainerShared::resolve_all(&self.shared, key, None)
    }

    fn push_teardown(
        &self,
        type_name: &'static str,
        hook: Box<dyn FnOnce() -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send>,
    ) {
        self.shared.root_teardowns.lock().push(type_name, hook);
    }
}
