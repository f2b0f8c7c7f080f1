//! # vessel-di
//!
//! Scope-aware dependency injection for Rust: explicit bindings, qualifier
//! disambiguation, unit-of-work lifetimes, and provider-based lazy
//! resolution.
//!
//! ## Features
//!
//! - **Three scopes**: singleton (container lifetime), prototype (fresh per
//!   resolution, caller-owned), and unit-of-work (per logical unit of work,
//!   torn down when it ends)
//! - **Qualifiers**: several bindings per type, disambiguated by exact-match
//!   tags; an explicit qualifier always outranks a primary marker
//! - **Explicit registration**: the bindings a container resolves are exactly
//!   what startup code registered; no scanning, no reflection
//! - **Cycle detection**: declared edges fail at build, undeclared cycles
//!   fail at first resolution with the full path
//! - **Structured teardown**: reverse-creation-order hooks per unit of work
//!   and at container close, with failures collected rather than swallowed
//! - **Provider indirection**: `Provider<T>` defers resolution to use time,
//!   replacing generated scope proxies with an explicit handle
//!
//! ## Quick start
//!
//! ```rust
//! use vessel_di::{BindingCollection, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut bindings = BindingCollection::new();
//! bindings.add_singleton(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! }).unwrap();
//! bindings.add_prototype_factory::<UserService, _>(|ctx| {
//!     Ok(UserService { db: ctx.get::<Database>()? })
//! }).unwrap();
//!
//! let container = bindings.build().unwrap();
//! let service = container.get::<UserService>().unwrap();
//! assert_eq!(service.db.connection_string, "postgres://localhost");
//! container.close().unwrap();
//! ```
//!
//! ## Qualifiers
//!
//! ```rust
//! use vessel_di::{BindingCollection, Resolver};
//! use std::sync::Arc;
//!
//! trait Cache: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! struct Memory;
//! impl Cache for Memory {
//!     fn name(&self) -> &'static str { "memory" }
//! }
//!
//! struct Disk;
//! impl Cache for Disk {
//!     fn name(&self) -> &'static str { "disk" }
//! }
//!
//! let mut bindings = BindingCollection::new();
//! bindings.add_qualified_singleton_trait::<dyn Cache>("memory", Arc::new(Memory)).unwrap();
//! bindings.add_qualified_singleton_trait::<dyn Cache>("disk", Arc::new(Disk)).unwrap();
//!
//! let container = bindings.build().unwrap();
//!
//! let disk = container.get_qualified_trait::<dyn Cache>("disk").unwrap();
//! assert_eq!(disk.name(), "disk");
//!
//! let all = container.get_all_trait::<dyn Cache>().unwrap();
//! assert_eq!(all.len(), 2);
//! ```
//!
//! ## Units of work
//!
//! ```rust
//! use vessel_di::{BindingCollection, DiError, Resolver};
//! use std::sync::Arc;
//!
//! struct RequestContext {
//!     tag: &'static str,
//! }
//!
//! let mut bindings = BindingCollection::new();
//! bindings.add_unit_of_work_factory::<RequestContext, _>(|_| {
//!     Ok(RequestContext { tag: "req" })
//! }).unwrap();
//!
//! let container = bindings.build().unwrap();
//!
//! // Outside a unit of work: refused.
//! assert!(matches!(
//!     container.get::<RequestContext>(),
//!     Err(DiError::NoActiveScope { .. })
//! ));
//!
//! // Inside one: stable per unit of work.
//! let work = container.begin_unit_of_work().unwrap();
//! let a = work.get::<RequestContext>().unwrap();
//! let b = work.get::<RequestContext>().unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//! work.complete().unwrap();
//! ```

pub mod binding;
pub mod collection;
pub mod container;
pub mod error;
pub mod key;
pub mod provider;
pub mod scope;
pub mod traits;

mod internal;
mod registry;
mod validation;

pub use binding::BindingDescriptor;
pub use collection::BindingCollection;
pub use container::{Container, ResolverContext, UnitOfWork, UnitOfWorkId};
pub use error::{ConfigIssue, ConfigurationError, DiError, DiResult, TeardownFailure};
pub use key::{key_of_trait, key_of_type, Key};
pub use provider::Provider;
pub use scope::Scope;
pub use traits::{Resolver, ResolverCore, Teardown};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn singleton_resolution_is_shared() {
        let mut bindings = BindingCollection::new();
        bindings.add_singleton(42usize).unwrap();

        let container = bindings.build().unwrap();
        let a = container.get::<usize>().unwrap();
        let b = container.get::<usize>().unwrap();

        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn prototype_resolution_is_fresh() {
        let counter = Arc::new(parking_lot::Mutex::new(0));
        let counter_in_factory = counter.clone();

        let mut bindings = BindingCollection::new();
        bindings
            .add_prototype_factory::<String, _>(move |_| {
                let mut c = counter_in_factory.lock();
                *c += 1;
                Ok(format!("instance-{}", *c))
            })
            .unwrap();

        let container = bindings.build().unwrap();
        let a = container.get::<String>().unwrap();
        let b = container.get::<String>().unwrap();

        assert_eq!(a.as_str(), "instance-1");
        assert_eq!(b.as_str(), "instance-2");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn trait_resolution() {
        trait Answer: Send + Sync {
            fn value(&self) -> i32;
        }

        struct FortyTwo;
        impl Answer for FortyTwo {
            fn value(&self) -> i32 {
                42
            }
        }

        let mut bindings = BindingCollection::new();
        bindings
            .add_singleton_trait::<dyn Answer>(Arc::new(FortyTwo))
            .unwrap();

        let container = bindings.build().unwrap();
        let answer = container.get_trait::<dyn Answer>().unwrap();
        assert_eq!(answer.value(), 42);
    }

    #[test]
    fn duplicate_default_registration_fails() {
        let mut bindings = BindingCollection::new();
        bindings.add_singleton(1usize).unwrap();
        let err = bindings.add_singleton(2usize).unwrap_err();
        assert!(matches!(err, DiError::DuplicateBinding { qualifier: None, .. }));
    }

    #[test]
    fn closed_container_refuses_resolution() {
        let mut bindings = BindingCollection::new();
        bindings.add_singleton(1u8).unwrap();

        let container = bindings.build().unwrap();
        container.close().unwrap();

        assert!(matches!(
            container.get::<u8>(),
            Err(DiError::ContainerClosed)
        ));
        // Closing again is a no-op.
        container.close().unwrap();
    }
}
