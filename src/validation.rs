//! Build-time validation of declared dependency edges.
//!
//! Registration can declare the edges a factory's closure will resolve at
//! runtime. `build()` walks those declarations and rejects configurations
//! that could only fail later: cycles, dependencies with no binding, and
//! singletons that would capture unit-of-work-scoped instances.

use std::collections::{HashMap, HashSet};

use crate::error::ConfigIssue;
use crate::key::Key;
use crate::registry::Registry;
use crate::scope::Scope;

pub(crate) fn validate(registry: &Registry, edges: &[(Key, Key)]) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    for (owner, dependency) in edges {
        if registry.is_registered(owner) && !registry.is_registered(dependency) {
            issues.push(ConfigIssue::MissingDependency {
                owner: owner.display_name().to_string(),
                dependency: dependency.display_name().to_string(),
            });
        }

        if let (Some(Scope::Singleton), Some(Scope::UnitOfWork)) = (
            registry.default_scope(owner),
            registry.default_scope(dependency),
        ) {
            issues.push(ConfigIssue::CaptiveDependency {
                owner: owner.display_name().to_string(),
                dependency: dependency.display_name().to_string(),
            });
        }
    }

    issues.extend(find_cycles(edges));
    issues
}

/// Depth-first search over the declared graph; each cycle is reported once.
fn find_cycles(edges: &[(Key, Key)]) -> Vec<ConfigIssue> {
    let mut adjacency: HashMap<Key, Vec<Key>> = HashMap::new();
    for (owner, dependency) in edges {
        adjacency.entry(*owner).or_default().push(*dependency);
    }

    let mut issues = Vec::new();
    let mut done: HashSet<Key> = HashSet::new();

    for start in adjacency.keys() {
        if done.contains(start) {
            continue;
        }
        let mut path: Vec<Key> = Vec::new();
        if let Some(cycle) = walk(*start, &adjacency, &mut path, &mut done) {
            // Mark the loop's nodes as finished so the same cycle is not
            // rediscovered from another rotation.
            done.extend(cycle.iter().copied());
            issues.push(ConfigIssue::DeclaredCycle {
                path: cycle.iter().map(|k| k.display_name().to_string()).collect(),
            });
        }
    }

    issues
}

fn walk(
    node: Key,
    adjacency: &HashMap<Key, Vec<Key>>,
    path: &mut Vec<Key>,
    done: &mut HashSet<Key>,
) -> Option<Vec<Key>> {
    if let Some(position) = path.iter().position(|k| *k == node) {
        let mut cycle: Vec<Key> = path[position..].to_vec();
        cycle.push(node);
        return Some(cycle);
    }
    if done.contains(&node) {
        return None;
    }

    path.push(node);
    if let Some(next) = adjacency.get(&node) {
        for dependency in next {
            if let Some(cycle) = walk(*dependency, adjacency, path, done) {
                path.pop();
                return Some(cycle);
            }
        }
    }
    path.pop();
    done.insert(node);
    None
}
