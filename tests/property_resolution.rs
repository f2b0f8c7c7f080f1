//! Property-based tests for resolution laws: identity for singletons,
//! distinctness for prototypes, exact qualifier matching.

use std::sync::Arc;

use proptest::prelude::*;
use vessel_di::{BindingCollection, DiError, Resolver};

#[derive(Debug, Clone, PartialEq)]
struct Payload {
    value: String,
}

static QUALIFIERS: [&str; 3] = ["alpha", "beta", "gamma"];

proptest! {
    #[test]
    fn singleton_resolution_is_stable(value in "\\PC{0,40}") {
        let mut bindings = BindingCollection::new();
        bindings.add_singleton(Payload { value: value.clone() }).unwrap();

        let container = bindings.build().unwrap();

        let first = container.get::<Payload>().unwrap();
        let second = container.get::<Payload>().unwrap();
        let third = container.get::<Payload>().unwrap();

        prop_assert!(Arc::ptr_eq(&first, &second));
        prop_assert!(Arc::ptr_eq(&second, &third));
        prop_assert_eq!(&first.value, &value);
    }
}

proptest! {
    #[test]
    fn prototype_resolution_is_always_fresh(resolutions in 1usize..16) {
        let counter = Arc::new(parking_lot::Mutex::new(0u32));
        let counter_in_factory = counter.clone();

        let mut bindings = BindingCollection::new();
        bindings
            .add_prototype_factory::<Payload, _>(move |_| {
                let mut c = counter_in_factory.lock();
                *c += 1;
                Ok(Payload { value: format!("p{}", *c) })
            })
            .unwrap();

        let container = bindings.build().unwrap();

        let mut resolved = Vec::with_capacity(resolutions);
        for _ in 0..resolutions {
            resolved.push(container.get::<Payload>().unwrap());
        }

        prop_assert_eq!(*counter.lock(), resolutions as u32);
        for (i, a) in resolved.iter().enumerate() {
            for b in &resolved[i + 1..] {
                prop_assert!(!Arc::ptr_eq(a, b));
            }
        }
    }
}

proptest! {
    #[test]
    fn qualifier_matching_is_exact(
        registered_index in 0usize..3,
        requested_index in 0usize..3,
    ) {
        let registered = QUALIFIERS[registered_index];
        let requested = QUALIFIERS[requested_index];

        let mut bindings = BindingCollection::new();
        bindings
            .add_qualified_singleton(registered, Payload { value: registered.to_string() })
            .unwrap();

        let container = bindings.build().unwrap();
        let outcome = container.get_qualified::<Payload>(requested);

        if registered == requested {
            prop_assert_eq!(&outcome.unwrap().value, registered);
        } else {
            let is_not_found = matches!(outcome, Err(DiError::NotFound { .. }));
            prop_assert!(is_not_found);
        }
    }
}

proptest! {
    #[test]
    fn optional_resolution_matches_registration_state(register in any::<bool>()) {
        let mut bindings = BindingCollection::new();
        if register {
            bindings.add_singleton(Payload { value: "present".to_string() }).unwrap();
        }

        let container = bindings.build().unwrap();
        let outcome = container.get::<Payload>();

        prop_assert_eq!(outcome.is_ok(), register);
    }
}

proptest! {
    #[test]
    fn every_registered_qualifier_appears_in_get_all(count in 1usize..4) {
        let mut bindings = BindingCollection::new();
        for qualifier in QUALIFIERS.iter().take(count) {
            bindings
                .add_qualified_singleton(qualifier, Payload { value: qualifier.to_string() })
                .unwrap();
        }

        let container = bindings.build().unwrap();
        let all = container.get_all::<Payload>().unwrap();

        prop_assert_eq!(all.len(), count);
        for qualifier in QUALIFIERS.iter().take(count) {
            prop_assert_eq!(&all[qualifier].value, qualifier);
        }
    }
}
