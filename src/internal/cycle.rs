//! Cycle detection for the resolution path.
//!
//! Resolution keeps a per-thread stack of in-progress nodes, keyed by
//! (capability name, qualifier). Re-entering a node already on the stack is a
//! cyclic dependency and fails before the factory runs again.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::key::render_request;

const MAX_DEPTH: usize = 256;

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct Frame {
    name: &'static str,
    qualifier: Option<&'static str>,
}

/// Guard holding one frame on the thread-local resolution stack.
///
/// The frame pops when the guard drops, whether the resolution below it
/// succeeded or returned an error.
pub(crate) struct StackGuard {
    _private: (),
}

impl StackGuard {
    /// Pushes a frame, failing if the same node is already in progress on
    /// this thread or the depth backstop is hit.
    pub(crate) fn enter(
        name: &'static str,
        qualifier: Option<&'static str>,
    ) -> DiResult<StackGuard> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let frame = Frame { name, qualifier };

            if stack.contains(&frame) {
                let mut path: Vec<String> = stack
                    .iter()
                    .map(|f| render_request(f.name, f.qualifier))
                    .collect();
                path.push(render_request(name, qualifier));
                return Err(DiError::CyclicDependency { path });
            }

            if stack.len() >= MAX_DEPTH {
                return Err(DiError::DepthExceeded { depth: stack.len() });
            }

            stack.push(frame);
            Ok(StackGuard { _private: () })
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
