//! Binding registry: capability → candidate-set storage and selection.

use std::collections::HashMap;

use crate::binding::Binding;
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::scope::Scope;

/// All bindings registered for one capability.
///
/// The unqualified default, if any, lives in the same candidate list as the
/// qualified bindings; `default_index` remembers where.
#[derive(Default)]
pub(crate) struct CandidateSet {
    pub(crate) candidates: Vec<Binding>,
    default_index: Option<usize>,
}

/// Binding registry. Mutable during registration, frozen by `finalize` and
/// immutable for the whole resolution phase, so lookups need no locking.
pub(crate) struct Registry {
    entries: HashMap<Key, CandidateSet>,
    /// Number of singleton cache slots assigned by `finalize`.
    pub(crate) singleton_slots: usize,
    /// Number of per-unit-of-work cache slots assigned by `finalize`.
    pub(crate) unit_of_work_slots: usize,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            singleton_slots: 0,
            unit_of_work_slots: 0,
        }
    }

    /// Inserts a binding, enforcing the duplicate rules: one unqualified
    /// default per capability, distinct qualifiers among the rest.
    pub(crate) fn insert(&mut self, key: Key, binding: Binding) -> DiResult<()> {
        let set = self.entries.entry(key).or_default();

        match binding.qualifier {
            None => {
                if set.default_index.is_some() {
                    return Err(DiError::DuplicateBinding {
                        type_name: key.display_name(),
                        qualifier: None,
                    });
                }
                set.default_index = Some(set.candidates.len());
            }
            Some(q) => {
                if set.candidates.iter().any(|c| c.qualifier == Some(q)) {
                    return Err(DiError::DuplicateBinding {
                        type_name: key.display_name(),
                        qualifier: Some(q),
                    });
                }
            }
        }

        set.candidates.push(binding);
        Ok(())
    }

    pub(crate) fn contains(&self, key: &Key, qualifier: Option<&'static str>) -> bool {
        match self.entries.get(key) {
            Some(set) => match qualifier {
                None => set.default_index.is_some(),
                Some(q) => set.candidates.iter().any(|c| c.qualifier == Some(q)),
            },
            None => false,
        }
    }

    /// Marks the candidate registered under `qualifier` as primary.
    pub(crate) fn mark_primary(
        &mut self,
        key: &Key,
        qualifier: &'static str,
    ) -> DiResult<()> {
        let candidate = self
            .entries
            .get_mut(key)
            .and_then(|set| {
                set.candidates
                    .iter_mut()
                    .find(|c| c.qualifier == Some(qualifier))
            })
            .ok_or(DiError::NotFound {
                type_name: key.display_name(),
                qualifier: Some(qualifier),
            })?;
        candidate.primary = true;
        Ok(())
    }

    /// Picks the binding for a request, applying the tie-break policy.
    ///
    /// With a qualifier: exact match or `NotFound`; a qualified request
    /// never falls back to the primary or default candidate. Without one:
    /// a sole candidate wins, then the unqualified default, then a unique
    /// primary; anything else is `AmbiguousBinding`.
    pub(crate) fn select(
        &self,
        key: &Key,
        qualifier: Option<&'static str>,
    ) -> DiResult<&Binding> {
        let set = self.entries.get(key).ok_or(DiError::NotFound {
            type_name: key.display_name(),
            qualifier,
        })?;

        match qualifier {
            Some(q) => set
                .candidates
                .iter()
                .find(|c| c.qualifier == Some(q))
                .ok_or(DiError::NotFound {
                    type_name: key.display_name(),
                    qualifier: Some(q),
                }),
            None => {
                if set.candidates.len() == 1 {
                    return Ok(&set.candidates[0]);
                }
                if let Some(index) = set.default_index {
                    return Ok(&set.candidates[index]);
                }
                let mut primaries = set.candidates.iter().filter(|c| c.primary);
                match (primaries.next(), primaries.next()) {
                    (Some(winner), None) => Ok(winner),
                    _ => Err(DiError::AmbiguousBinding {
                        type_name: key.display_name(),
                        candidates: set.candidates.iter().map(|c| c.label(key)).collect(),
                    }),
                }
            }
        }
    }

    /// Every candidate for a capability, in registration order. Empty when
    /// nothing is registered under the key.
    pub(crate) fn all(&self, key: &Key) -> &[Binding] {
        self.entries
            .get(key)
            .map(|set| set.candidates.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Binding)> {
        self.entries
            .iter()
            .flat_map(|(key, set)| set.candidates.iter().map(move |c| (key, c)))
    }

    /// The scope an unqualified request for `key` would resolve to, when that
    /// selection is unambiguous. Used by build-time validation.
    pub(crate) fn default_scope(&self, key: &Key) -> Option<Scope> {
        self.select(key, None).ok().map(|b| b.scope)
    }

    pub(crate) fn is_registered(&self, key: &Key) -> bool {
        self.entries
            .get(key)
            .is_some_and(|set| !set.candidates.is_empty())
    }

    /// Freezes the registry: assigns cache slots to singleton and
    /// unit-of-work bindings so instance stores can be flat slot arrays.
    pub(crate) fn finalize(&mut self) {
        let mut next_singleton = 0;
        let mut next_unit_of_work = 0;

        for set in self.entries.values_mut() {
            for binding in &mut set.candidates {
                match binding.scope {
                    Scope::Singleton => {
                        binding.slot = Some(next_singleton);
                        next_singleton += 1;
                    }
                    Scope::UnitOfWork => {
                        binding.slot = Some(next_unit_of_work);
                        next_unit_of_work += 1;
                    }
                    Scope::Prototype => {}
                }
            }
        }

        self.singleton_slots = next_singleton;
        self.unit_of_work_slots = next_unit_of_work;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of_type;
    use std::sync::Arc;

    fn binding(scope: Scope, qualifier: Option<&'static str>, primary: bool) -> Binding {
        let ctor: crate::binding::Ctor = Arc::new(|_: &crate::container::ResolverContext| {
            Ok(Arc::new(()) as crate::binding::AnyArc)
        });
        let mut b = Binding::new(scope, ctor);
        b.qualifier = qualifier;
        b.primary = primary;
        b
    }

    #[test]
    fn second_default_is_a_duplicate() {
        let mut registry = Registry::new();
        let key = key_of_type::<u32>();
        registry.insert(key, binding(Scope::Singleton, None, false)).unwrap();
        let err = registry
            .insert(key, binding(Scope::Singleton, None, false))
            .unwrap_err();
        assert!(matches!(err, DiError::DuplicateBinding { qualifier: None, .. }));
    }

    #[test]
    fn colliding_qualifier_is_a_duplicate() {
        let mut registry = Registry::new();
        let key = key_of_type::<u32>();
        registry
            .insert(key, binding(Scope::Singleton, Some("a"), false))
            .unwrap();
        let err = registry
            .insert(key, binding(Scope::Singleton, Some("a"), false))
            .unwrap_err();
        assert!(matches!(
            err,
            DiError::DuplicateBinding { qualifier: Some("a"), .. }
        ));
    }

    #[test]
    fn qualifier_never_falls_back() {
        let mut registry = Registry::new();
        let key = key_of_type::<u32>();
        registry.insert(key, binding(Scope::Singleton, None, false)).unwrap();
        registry
            .insert(key, binding(Scope::Singleton, Some("a"), true))
            .unwrap();
        assert!(matches!(
            registry.select(&key, Some("missing")),
            Err(DiError::NotFound { qualifier: Some("missing"), .. })
        ));
    }

    #[test]
    fn unqualified_request_prefers_default_then_primary() {
        let mut registry = Registry::new();
        let key = key_of_type::<u32>();
        registry
            .insert(key, binding(Scope::Singleton, Some("a"), false))
            .unwrap();
        registry
            .insert(key, binding(Scope::Singleton, Some("b"), true))
            .unwrap();

        let selected = registry.select(&key, None).unwrap();
        assert_eq!(selected.qualifier, Some("b"));

        registry.insert(key, binding(Scope::Singleton, None, false)).unwrap();
        let selected = registry.select(&key, None).unwrap();
        assert_eq!(selected.qualifier, None);
    }

    #[test]
    fn no_tiebreaker_is_ambiguous() {
        let mut registry = Registry::new();
        let key = key_of_type::<u32>();
        registry
            .insert(key, binding(Scope::Singleton, Some("a"), false))
            .unwrap();
        registry
            .insert(key, binding(Scope::Singleton, Some("b"), false))
            .unwrap();
        match registry.select(&key, None) {
            Err(DiError::AmbiguousBinding { candidates, .. }) => {
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected ambiguity, got {:?}", other.err()),
        }
    }

    #[test]
    fn finalize_assigns_slots_per_scope() {
        let mut registry = Registry::new();
        registry
            .insert(key_of_type::<u32>(), binding(Scope::Singleton, None, false))
            .unwrap();
        registry
            .insert(key_of_type::<u64>(), binding(Scope::UnitOfWork, None, false))
            .unwrap();
        registry
            .insert(key_of_type::<i32>(), binding(Scope::Prototype, None, false))
            .unwrap();
        registry.finalize();
        assert_eq!(registry.singleton_slots, 1);
        assert_eq!(registry.unit_of_work_slots, 1);
    }
}
