//! Unit-of-work scope stores and the public handle.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::binding::AnyArc;
use crate::error::DiResult;
use crate::internal::TeardownBag;
use crate::key::Key;
use crate::provider::Provider;
use crate::traits::ResolverCore;

use super::ContainerShared;

/// Identifier of one unit of work.
///
/// Unit-of-work-scoped instances are cached per `(binding, UnitOfWorkId)`
/// pair; the id is what `end_unit_of_work` takes to tear that partition down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitOfWorkId(Uuid);

impl UnitOfWorkId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for UnitOfWorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Per-unit-of-work instance store: one slot per unit-of-work binding, plus
/// the teardown bag for instances created under this id.
pub(crate) struct UowStore {
    pub(crate) id: UnitOfWorkId,
    pub(crate) cells: Box<[OnceCell<AnyArc>]>,
    pub(crate) teardowns: Mutex<TeardownBag>,
    ended: AtomicBool,
}

impl UowStore {
    pub(crate) fn new(slots: usize) -> Self {
        Self {
            id: UnitOfWorkId::generate(),
            cells: (0..slots)
                .map(|_| OnceCell::new())
                .collect::<Vec<_>>()
                .into_boxed_slice(),
            teardowns: Mutex::new(TeardownBag::default()),
            ended: AtomicBool::new(false),
        }
    }

    pub(crate) fn ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }

    pub(crate) fn mark_ended(&self) {
        self.ended.store(true, Ordering::Release);
    }
}

/// Handle for resolving within one unit of work.
///
/// Resolves everything the container root can, plus unit-of-work-scoped
/// bindings cached under this handle's id. The handle stays valid until the
/// unit of work is ended (through [`complete`](UnitOfWork::complete), the
/// container's `end_unit_of_work`, or `close`), after which unit-of-work
/// resolution through it fails with `NoActiveScope`.
///
/// # Examples
///
/// ```rust
/// use vessel_di::{BindingCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Cursor { position: u64 }
///
/// let mut bindings = BindingCollection::new();
/// bindings.add_unit_of_work_factory::<Cursor, _>(|_| Ok(Cursor { position: 0 })).unwrap();
///
/// let container = bindings.build().unwrap();
///
/// let first = container.begin_unit_of_work().unwrap();
/// let second = container.begin_unit_of_work().unwrap();
///
/// let a = first.get::<Cursor>().unwrap();
/// let b = second.get::<Cursor>().unwrap();
/// assert!(!Arc::ptr_eq(&a, &b)); // partitioned per unit of work
///
/// first.complete().unwrap();
/// second.complete().unwrap();
/// ```
pub struct UnitOfWork {
    shared: Arc<ContainerShared>,
    store: Arc<UowStore>,
}

impl UnitOfWork {
    pub(crate) fn new(shared: Arc<ContainerShared>, store: Arc<UowStore>) -> Self {
        Self { shared, store }
    }

    /// This unit of work's id.
    pub fn id(&self) -> UnitOfWorkId {
        self.store.id
    }

    /// Ends this unit of work, consuming the handle.
    ///
    /// Equivalent to `container.end_unit_of_work(handle.id())`.
    pub fn complete(self) -> DiResult<()> {
        self.shared.end_unit_of_work(self.store.id)
    }

    /// Deferred-resolution handle bound to this unit of work.
    pub fn provider<T: 'static + Send + Sync>(&self) -> Provider<T> {
        Provider::of_type(self.shared.clone(), Some(Arc::downgrade(&self.store)), None)
    }

    /// Qualified deferred-resolution handle bound to this unit of work.
    pub fn provider_qualified<T: 'static + Send + Sync>(
        &self,
        qualifier: &'static str,
    ) -> Provider<T> {
        Provider::of_type(
            self.shared.clone(),
            Some(Arc::downgrade(&self.store)),
            Some(qualifier),
        )
    }

    /// Trait-object deferred-resolution handle bound to this unit of work.
    pub fn provider_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Provider<T> {
        Provider::of_trait(self.shared.clone(), Some(Arc::downgrade(&self.store)), None)
    }

    fn active_store(&self) -> Option<&Arc<UowStore>> {
        if self.store.ended() {
            None
        } else {
            Some(&self.store)
        }
    }
}

impl ResolverCore for UnitOfWork {
    fn resolve_any(
        &self,
        key: &Key,
        qualifier: Option<&'static str>,
    ) -> DiResult<Arc<dyn Any + Send + Sync>> {
        ContainerShared::resolve(&self.shared, key, qualifier, self.active_store())
    }

    fn resolve_all(
        &self,
        key: &Key,
    ) -> DiResult<Vec<(&'static str, Arc<dyn Any + Send + Sync>)>> {
        ContainerShared::resolve_all(&self.shared, key, self.active_store())
    }

    fn push_teardown(
        &self,
        type_name: &'static str,
        hook: Box<dyn FnOnce() -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send>,
    ) {
        match self.active_store() {
            Some(store) => store.teardowns.lock().push(type_name, hook),
            None => self.shared.root_teardowns.lock().push(type_name, hook),
        }
    }
}
