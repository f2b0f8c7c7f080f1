//! Scope definitions controlling instance lifecycle.

/// Instance lifecycle policy for a binding.
///
/// Decides how the container caches (or refuses to cache) the instances a
/// binding produces.
///
/// # Examples
///
/// ```rust
/// use vessel_di::{BindingCollection, Resolver, Scope};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// struct Session { config: Arc<Config> }
///
/// let mut bindings = BindingCollection::new();
/// bindings.add_singleton(Config { url: "postgres://localhost".to_string() }).unwrap();
/// bindings.add_prototype_factory::<Session, _>(|r| {
///     Ok(Session { config: r.get::<Config>()? })
/// }).unwrap();
///
/// let container = bindings.build().unwrap();
///
/// // Singleton: one shared instance
/// let c1 = container.get::<Config>().unwrap();
/// let c2 = container.get::<Config>().unwrap();
/// assert!(Arc::ptr_eq(&c1, &c2));
///
/// // Prototype: a fresh instance per resolution, caller-owned
/// let s1 = container.get::<Session>().unwrap();
/// let s2 = container.get::<Session>().unwrap();
/// assert!(!Arc::ptr_eq(&s1, &s2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// One instance for the container lifetime, created on first resolution.
    ///
    /// Creation is guarded per binding: at most one thread runs the factory,
    /// concurrent requesters block and then share the cached instance.
    Singleton,
    /// A fresh instance on every resolution, never cached.
    ///
    /// The caller owns the returned instance exclusively; the container keeps
    /// no reference to it after the resolution returns.
    Prototype,
    /// One instance per unit of work, cached until the unit of work ends.
    ///
    /// Resolving a unit-of-work binding requires an active [`UnitOfWork`];
    /// ending the unit of work runs teardown hooks for everything created
    /// under it, in reverse creation order.
    ///
    /// [`UnitOfWork`]: crate::UnitOfWork
    UnitOfWork,
}
