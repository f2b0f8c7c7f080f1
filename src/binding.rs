//! Binding records: construction recipes plus their lifecycle metadata.

use std::any::Any;
use std::sync::Arc;

use crate::container::ResolverContext;
use crate::error::DiResult;
use crate::key::Key;
use crate::scope::Scope;

/// Type-erased Arc for instance storage.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased construction recipe.
pub(crate) type Ctor =
    Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// One registered candidate for a capability.
///
/// A capability (a [`Key`]) may own several bindings; each carries the
/// qualifier and primary marker used to pick among them at resolution time.
pub(crate) struct Binding {
    pub(crate) scope: Scope,
    pub(crate) ctor: Ctor,
    /// Disambiguation tag; `None` marks the unqualified default.
    pub(crate) qualifier: Option<&'static str>,
    /// Wins a tie when no qualifier is requested and no default exists.
    pub(crate) primary: bool,
    /// Concrete implementation type name, when registration knows it.
    pub(crate) impl_name: Option<&'static str>,
    /// Cache slot index, assigned once when the registry is finalized.
    /// Singleton and unit-of-work bindings index separate slot arrays.
    pub(crate) slot: Option<usize>,
}

impl Binding {
    pub(crate) fn new(scope: Scope, ctor: Ctor) -> Self {
        Self {
            scope,
            ctor,
            qualifier: None,
            primary: false,
            impl_name: None,
            slot: None,
        }
    }

    /// Label used to key `get_all` results: the qualifier when present,
    /// otherwise the implementation type name captured at registration.
    pub(crate) fn label(&self, key: &Key) -> &'static str {
        self.qualifier
            .or(self.impl_name)
            .unwrap_or_else(|| key.display_name())
    }
}

/// Metadata about one registered binding, for introspection and diagnostics.
///
/// # Examples
///
/// ```rust
/// use vessel_di::{BindingCollection, Scope};
///
/// struct Store;
///
/// let mut bindings = BindingCollection::new();
/// bindings.add_singleton(7u32).unwrap();
/// bindings
///     .add_qualified_prototype_factory::<Store, _>("scratch", |_| Ok(Store))
///     .unwrap();
///
/// let descriptors = bindings.descriptors();
/// assert_eq!(descriptors.len(), 2);
///
/// let store = descriptors
///     .iter()
///     .find(|d| d.qualifier == Some("scratch"))
///     .unwrap();
/// assert_eq!(store.scope, Scope::Prototype);
/// assert!(store.type_name().contains("Store"));
/// ```
#[derive(Debug, Clone)]
pub struct BindingDescriptor {
    /// The capability this binding satisfies.
    pub key: Key,
    /// Lifecycle policy.
    pub scope: Scope,
    /// Disambiguation tag, `None` for the unqualified default.
    pub qualifier: Option<&'static str>,
    /// Whether this candidate wins qualifier-less ties.
    pub primary: bool,
    /// Concrete implementation type name, when known.
    pub impl_name: Option<&'static str>,
}

impl BindingDescriptor {
    /// The type or trait name of the capability.
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    /// Whether this binding carries a qualifier.
    pub fn is_qualified(&self) -> bool {
        self.qualifier.is_some()
    }
}
