//! Teardown hook bag with LIFO execution order.

use crate::error::TeardownFailure;

/// Boxed teardown hook; the error is rendered into the failure report.
pub(crate) type TeardownHook =
    Box<dyn FnOnce() -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send>;

/// Collects teardown hooks in creation order and runs them in reverse.
///
/// Every hook runs exactly once. A failing hook never stops the pass; its
/// failure is recorded and the remaining hooks still run.
#[derive(Default)]
pub(crate) struct TeardownBag {
    hooks: Vec<(&'static str, TeardownHook)>,
}

impl TeardownBag {
    pub(crate) fn push(&mut self, type_name: &'static str, hook: TeardownHook) {
        self.hooks.push((type_name, hook));
    }

    /// Runs all hooks in reverse creation order, collecting failures.
    pub(crate) fn run_reverse(&mut self) -> Vec<TeardownFailure> {
        let mut failures = Vec::new();
        while let Some((type_name, hook)) = self.hooks.pop() {
            if let Err(err) = hook() {
                tracing::warn!(instance = type_name, error = %err, "teardown hook failed");
                failures.push(TeardownFailure {
                    type_name,
                    reason: err.to_string(),
                });
            }
        }
        failures
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
