//! Error types for the dependency injection container.

use thiserror::Error;

use crate::key::render_request;

/// Dependency injection errors.
///
/// Configuration-time errors (`DuplicateBinding`, plus everything surfaced
/// through [`ConfigurationError`]) abort container construction entirely.
/// Resolution-time errors abort only the current `get` call and leave the
/// container usable. `Teardown` is collected during cleanup, never raised
/// mid-cleanup.
///
/// # Examples
///
/// ```rust
/// use vessel_di::{BindingCollection, DiError, Resolver};
///
/// let container = BindingCollection::new().build().unwrap();
/// match container.get::<String>() {
///     Err(DiError::NotFound { type_name, .. }) => {
///         assert_eq!(type_name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// A binding for this capability and qualifier already exists.
    #[error("duplicate binding for {}", render_request(.type_name, .qualifier.as_deref()))]
    DuplicateBinding {
        /// Type or trait name of the colliding binding.
        type_name: &'static str,
        /// Qualifier of the colliding binding, `None` for the unqualified default.
        qualifier: Option<&'static str>,
    },
    /// No binding matches the requested capability/qualifier.
    #[error("no binding found for {}", render_request(.type_name, .qualifier.as_deref()))]
    NotFound {
        /// Requested type or trait name.
        type_name: &'static str,
        /// Requested qualifier, if any.
        qualifier: Option<&'static str>,
    },
    /// Several candidates match and neither a qualifier nor a unique primary
    /// marker breaks the tie.
    #[error("ambiguous binding for {type_name}: candidates [{}]", .candidates.join(", "))]
    AmbiguousBinding {
        /// Requested type or trait name.
        type_name: &'static str,
        /// Labels of the competing candidates.
        candidates: Vec<&'static str>,
    },
    /// The resolution path revisited a node already being constructed.
    #[error("cyclic dependency: {}", .path.join(" -> "))]
    CyclicDependency {
        /// Full resolution path, ending in the repeated node.
        path: Vec<String>,
    },
    /// A unit-of-work-scoped binding was resolved with no active unit of
    /// work, or an ended/unknown unit of work was referenced.
    #[error("no active unit of work: {detail}")]
    NoActiveScope {
        /// What was attempted without an active unit of work.
        detail: String,
    },
    /// The container has been closed; no further resolution is possible.
    #[error("container is closed")]
    ContainerClosed,
    /// A stored instance failed to downcast to the requested type.
    #[error("type mismatch for {type_name}")]
    TypeMismatch {
        /// Requested type or trait name.
        type_name: &'static str,
    },
    /// Resolution recursed past the depth backstop without repeating a node.
    #[error("max resolution depth {depth} exceeded")]
    DepthExceeded {
        /// Depth at which resolution gave up.
        depth: usize,
    },
    /// One or more teardown hooks failed during cleanup.
    ///
    /// Cleanup always continues past a failing hook; the failures are
    /// collected and surfaced together once every remaining instance has been
    /// torn down.
    #[error("{} teardown hook(s) failed: [{}]", .failures.len(), render_failures(.failures))]
    Teardown {
        /// Every hook failure observed during the cleanup pass.
        failures: Vec<TeardownFailure>,
    },
}

/// A single failed teardown hook.
#[derive(Debug, Clone, Error)]
#[error("{type_name}: {reason}")]
pub struct TeardownFailure {
    /// Type name of the instance whose hook failed.
    pub type_name: &'static str,
    /// Rendered failure reason.
    pub reason: String,
}

fn render_failures(failures: &[TeardownFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A statically detectable configuration problem found while building the
/// container from declared dependency edges.
#[derive(Debug, Clone, Error)]
pub enum ConfigIssue {
    /// Declared dependency edges form a cycle.
    #[error("declared dependency cycle: {}", .path.join(" -> "))]
    DeclaredCycle {
        /// The cycle, ending in the repeated node.
        path: Vec<String>,
    },
    /// A declared dependency has no binding.
    #[error("{owner} declares a dependency on unregistered {dependency}")]
    MissingDependency {
        /// Binding owning the declaration.
        owner: String,
        /// The missing dependency.
        dependency: String,
    },
    /// A singleton would capture a unit-of-work-scoped dependency for the
    /// container lifetime.
    #[error("singleton {owner} depends on unit-of-work scoped {dependency}")]
    CaptiveDependency {
        /// The singleton binding.
        owner: String,
        /// The shorter-lived dependency.
        dependency: String,
    },
}

/// Aggregate of every configuration error found during `build()`.
///
/// Construction is all-or-nothing: when any issue is present no container is
/// returned, and every detectable issue is reported at once rather than one
/// per attempt.
#[derive(Debug, Clone, Error)]
#[error("invalid container configuration: {}", render_issues(.issues))]
pub struct ConfigurationError {
    /// All issues found, in detection order.
    pub issues: Vec<ConfigIssue>,
}

fn render_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for DI operations.
pub type DiResult<T> = Result<T, DiError>;
