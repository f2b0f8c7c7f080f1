//! Binding collection: the registration surface the container is built from.

use std::sync::Arc;

use crate::binding::{AnyArc, Binding, BindingDescriptor, Ctor};
use crate::container::{Container, ResolverContext};
use crate::error::{ConfigurationError, DiResult};
use crate::key::{key_of_trait, key_of_type, Key};
use crate::registry::Registry;
use crate::scope::Scope;
use crate::traits::{ResolverCore, Teardown};
use crate::validation;

/// Mutable set of bindings, consumed by [`build`](BindingCollection::build)
/// to produce a ready [`Container`].
///
/// Registration is explicit and happens entirely up front: there is no
/// scanning or discovery, so the set of bindings a container can resolve is
/// exactly what startup code registered. Registration methods fail
/// immediately on duplicate bindings; everything detectable only across the
/// whole set (declared-edge cycles, captive dependencies) is aggregated by
/// `build`.
///
/// # Examples
///
/// ```rust
/// use vessel_di::{BindingCollection, Resolver};
/// use std::sync::Arc;
///
/// trait Notifier: Send + Sync {
///     fn channel(&self) -> &'static str;
/// }
///
/// struct Email;
/// impl Notifier for Email {
///     fn channel(&self) -> &'static str { "email" }
/// }
///
/// struct Sms;
/// impl Notifier for Sms {
///     fn channel(&self) -> &'static str { "sms" }
/// }
///
/// let mut bindings = BindingCollection::new();
/// bindings
///     .add_qualified_singleton_trait::<dyn Notifier>("email", Arc::new(Email))
///     .unwrap()
///     .add_qualified_singleton_trait::<dyn Notifier>("sms", Arc::new(Sms))
///     .unwrap()
///     .mark_primary_trait::<dyn Notifier>("email")
///     .unwrap();
///
/// let container = bindings.build().unwrap();
///
/// // Primary wins when no qualifier is given...
/// let default = container.get_trait::<dyn Notifier>().unwrap();
/// assert_eq!(default.channel(), "email");
///
/// // ...but an explicit qualifier always outranks it.
/// let sms = container.get_qualified_trait::<dyn Notifier>("sms").unwrap();
/// assert_eq!(sms.channel(), "sms");
/// ```
pub struct BindingCollection {
    registry: Registry,
    edges: Vec<(Key, Key)>,
}

impl BindingCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            edges: Vec::new(),
        }
    }

    // ----- Concrete type registrations -----

    /// Registers an existing value as the unqualified singleton for its type.
    pub fn add_singleton<T: 'static + Send + Sync>(&mut self, value: T) -> DiResult<&mut Self> {
        let arc = Arc::new(value);
        let ctor: Ctor = Arc::new(move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(arc.clone() as AnyArc) });
        self.insert_concrete::<T>(Scope::Singleton, None, ctor)
    }

    /// Registers a value as a qualified singleton.
    pub fn add_qualified_singleton<T: 'static + Send + Sync>(
        &mut self,
        qualifier: &'static str,
        value: T,
    ) -> DiResult<&mut Self> {
        let arc = Arc::new(value);
        let ctor: Ctor = Arc::new(move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(arc.clone() as AnyArc) });
        self.insert_concrete::<T>(Scope::Singleton, Some(qualifier), ctor)
    }

    /// Registers a singleton factory, run once on first resolution.
    ///
    /// The factory receives a [`ResolverContext`] for its own dependencies
    /// and propagates resolution failures with `?`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vessel_di::{BindingCollection, Resolver};
    /// use std::sync::Arc;
    ///
    /// struct Settings { retries: u8 }
    /// struct Client { retries: u8 }
    ///
    /// let mut bindings = BindingCollection::new();
    /// bindings.add_singleton(Settings { retries: 3 }).unwrap();
    /// bindings.add_singleton_factory::<Client, _>(|ctx| {
    ///     let settings = ctx.get::<Settings>()?;
    ///     Ok(Client { retries: settings.retries })
    /// }).unwrap();
    ///
    /// let container = bindings.build().unwrap();
    /// assert_eq!(container.get::<Client>().unwrap().retries, 3);
    /// ```
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_concrete_factory::<T, F>(Scope::Singleton, None, factory)
    }

    /// Registers a singleton factory whose instances implement [`Teardown`];
    /// the hook is registered automatically and runs at container close.
    pub fn add_singleton_factory_with_teardown<T, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        T: Teardown,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_concrete_factory_with_teardown::<T, F>(Scope::Singleton, None, factory)
    }

    /// Registers a prototype factory: a fresh, caller-owned instance per
    /// resolution.
    pub fn add_prototype_factory<T, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_concrete_factory::<T, F>(Scope::Prototype, None, factory)
    }

    /// Registers a unit-of-work factory: one instance per unit of work.
    pub fn add_unit_of_work_factory<T, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_concrete_factory::<T, F>(Scope::UnitOfWork, None, factory)
    }

    /// Registers a unit-of-work factory whose instances implement
    /// [`Teardown`]; the hook runs when the unit of work ends.
    pub fn add_unit_of_work_factory_with_teardown<T, F>(
        &mut self,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: Teardown,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_concrete_factory_with_teardown::<T, F>(Scope::UnitOfWork, None, factory)
    }

    /// Registers a qualified singleton factory.
    pub fn add_qualified_singleton_factory<T, F>(
        &mut self,
        qualifier: &'static str,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_concrete_factory::<T, F>(Scope::Singleton, Some(qualifier), factory)
    }

    /// Registers a qualified prototype factory.
    pub fn add_qualified_prototype_factory<T, F>(
        &mut self,
        qualifier: &'static str,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_concrete_factory::<T, F>(Scope::Prototype, Some(qualifier), factory)
    }

    /// Registers a qualified unit-of-work factory.
    pub fn add_qualified_unit_of_work_factory<T, F>(
        &mut self,
        qualifier: &'static str,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_concrete_factory::<T, F>(Scope::UnitOfWork, Some(qualifier), factory)
    }

    fn add_concrete_factory<T, F>(
        &mut self,
        scope: Scope,
        qualifier: Option<&'static str>,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        let ctor: Ctor =
            Arc::new(move |ctx: &ResolverContext| -> DiResult<AnyArc> {
                Ok(Arc::new(factory(ctx)?) as AnyArc)
            });
        self.insert_concrete::<T>(scope, qualifier, ctor)
    }

    fn add_concrete_factory_with_teardown<T, F>(
        &mut self,
        scope: Scope,
        qualifier: Option<&'static str>,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: Teardown,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        let ctor: Ctor = Arc::new(move |ctx: &ResolverContext| -> DiResult<AnyArc> {
            let value = Arc::new(factory(ctx)?);
            let instance = value.clone();
            ctx.push_teardown(
                std::any::type_name::<T>(),
                Box::new(move || instance.teardown()),
            );
            Ok(value as AnyArc)
        });
        self.insert_concrete::<T>(scope, qualifier, ctor)
    }

    fn insert_concrete<T: 'static>(
        &mut self,
        scope: Scope,
        qualifier: Option<&'static str>,
        ctor: Ctor,
    ) -> DiResult<&mut Self> {
        let mut binding = Binding::new(scope, ctor);
        binding.qualifier = qualifier;
        binding.impl_name = Some(std::any::type_name::<T>());
        self.registry.insert(key_of_type::<T>(), binding)?;
        Ok(self)
    }

    // ----- Trait object registrations -----

    /// Registers an instance as the unqualified singleton for a trait.
    pub fn add_singleton_trait<T>(&mut self, value: Arc<T>) -> DiResult<&mut Self>
    where
        T: ?Sized + 'static + Send + Sync,
    {
        // Stored as Arc<Arc<dyn T>> so the sized outer Arc can downcast.
        let stored: AnyArc = Arc::new(value);
        let ctor: Ctor = Arc::new(move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(stored.clone()) });
        self.insert_trait::<T>(Scope::Singleton, None, ctor)
    }

    /// Registers an instance as a qualified singleton for a trait.
    pub fn add_qualified_singleton_trait<T>(
        &mut self,
        qualifier: &'static str,
        value: Arc<T>,
    ) -> DiResult<&mut Self>
    where
        T: ?Sized + 'static + Send + Sync,
    {
        let stored: AnyArc = Arc::new(value);
        let ctor: Ctor = Arc::new(move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(stored.clone()) });
        self.insert_trait::<T>(Scope::Singleton, Some(qualifier), ctor)
    }

    /// Registers a singleton factory for a trait.
    pub fn add_singleton_trait_factory<T, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        T: ?Sized + 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add_trait_factory::<T, F>(Scope::Singleton, None, factory)
    }

    /// Registers a prototype factory for a trait.
    pub fn add_prototype_trait_factory<T, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        T: ?Sized + 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add_trait_factory::<T, F>(Scope::Prototype, None, factory)
    }

    /// Registers a unit-of-work factory for a trait.
    pub fn add_unit_of_work_trait_factory<T, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        T: ?Sized + 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add_trait_factory::<T, F>(Scope::UnitOfWork, None, factory)
    }

    /// Registers a qualified singleton trait factory.
    pub fn add_qualified_singleton_trait_factory<T, F>(
        &mut self,
        qualifier: &'static str,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: ?Sized + 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add_trait_factory::<T, F>(Scope::Singleton, Some(qualifier), factory)
    }

    /// Registers a qualified prototype trait factory.
    pub fn add_qualified_prototype_trait_factory<T, F>(
        &mut self,
        qualifier: &'static str,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: ?Sized + 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add_trait_factory::<T, F>(Scope::Prototype, Some(qualifier), factory)
    }

    /// Registers a qualified unit-of-work trait factory.
    pub fn add_qualified_unit_of_work_trait_factory<T, F>(
        &mut self,
        qualifier: &'static str,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: ?Sized + 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add_trait_factory::<T, F>(Scope::UnitOfWork, Some(qualifier), factory)
    }

    fn add_trait_factory<T, F>(
        &mut self,
        scope: Scope,
        qualifier: Option<&'static str>,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: ?Sized + 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        let ctor: Ctor =
            Arc::new(move |ctx: &ResolverContext| -> DiResult<AnyArc> {
                Ok(Arc::new(factory(ctx)?) as AnyArc)
            });
        self.insert_trait::<T>(scope, qualifier, ctor)
    }

    fn insert_trait<T: ?Sized + 'static>(
        &mut self,
        scope: Scope,
        qualifier: Option<&'static str>,
        ctor: Ctor,
    ) -> DiResult<&mut Self> {
        let mut binding = Binding::new(scope, ctor);
        binding.qualifier = qualifier;
        self.registry.insert(key_of_trait::<T>(), binding)?;
        Ok(self)
    }

    // ----- Primary marking -----

    /// Marks the candidate registered under `qualifier` as the primary for
    /// its concrete type.
    ///
    /// A primary candidate wins qualifier-less resolution when no unqualified
    /// default exists; an explicit qualifier at the request site always
    /// outranks it.
    pub fn mark_primary<T: 'static>(&mut self, qualifier: &'static str) -> DiResult<&mut Self> {
        self.registry.mark_primary(&key_of_type::<T>(), qualifier)?;
        Ok(self)
    }

    /// Marks the candidate registered under `qualifier` as the primary for
    /// its trait.
    pub fn mark_primary_trait<T: ?Sized + 'static>(
        &mut self,
        qualifier: &'static str,
    ) -> DiResult<&mut Self> {
        self.registry.mark_primary(&key_of_trait::<T>(), qualifier)?;
        Ok(self)
    }

    // ----- Conditional registration -----

    /// Registers a singleton only when no unqualified default exists yet.
    /// Returns whether the value was registered.
    pub fn try_add_singleton<T: 'static + Send + Sync>(&mut self, value: T) -> bool {
        if self.registry.contains(&key_of_type::<T>(), None) {
            false
        } else {
            self.add_singleton(value).is_ok()
        }
    }

    /// Registers a singleton factory only when no unqualified default exists.
    pub fn try_add_singleton_factory<T, F>(&mut self, factory: F) -> bool
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        if self.registry.contains(&key_of_type::<T>(), None) {
            false
        } else {
            self.add_singleton_factory(factory).is_ok()
        }
    }

    /// Registers a singleton trait instance only when no unqualified default
    /// exists.
    pub fn try_add_singleton_trait<T>(&mut self, value: Arc<T>) -> bool
    where
        T: ?Sized + 'static + Send + Sync,
    {
        if self.registry.contains(&key_of_trait::<T>(), None) {
            false
        } else {
            self.add_singleton_trait(value).is_ok()
        }
    }

    // ----- Declared dependencies -----

    /// Declares that `T`'s factory resolves `D`, making the edge visible to
    /// build-time validation (cycles, missing bindings, captive scopes).
    ///
    /// Declarations are optional: undeclared edges are still caught at first
    /// resolution by the in-progress guard.
    pub fn depends_on<T: 'static, D: 'static>(&mut self) -> &mut Self {
        self.edges.push((key_of_type::<T>(), key_of_type::<D>()));
        self
    }

    /// Declares a dependency edge between arbitrary keys; combine with
    /// [`key_of_type`] and [`key_of_trait`] for trait endpoints.
    pub fn declare_edge(&mut self, owner: Key, dependency: Key) -> &mut Self {
        self.edges.push((owner, dependency));
        self
    }

    // ----- Introspection -----

    /// Descriptors for every registered binding.
    pub fn descriptors(&self) -> Vec<BindingDescriptor> {
        self.registry
            .iter()
            .map(|(key, binding)| BindingDescriptor {
                key: *key,
                scope: binding.scope,
                qualifier: binding.qualifier,
                primary: binding.primary,
                impl_name: binding.impl_name,
            })
            .collect()
    }

    /// Builds the container, validating declared dependency edges first.
    ///
    /// All configuration issues are aggregated into one
    /// [`ConfigurationError`]; no partial container is ever returned.
    pub fn build(mut self) -> Result<Container, ConfigurationError> {
        let issues = validation::validate(&self.registry, &self.edges);
        if !issues.is_empty() {
            return Err(ConfigurationError { issues });
        }
        self.registry.finalize();
        Ok(Container::new(self.registry))
    }
}

impl Default for BindingCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BindingCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingCollection")
            .field("bindings", &self.registry.iter().count())
            .field("edges", &self.edges.len())
            .finish()
    }
}
