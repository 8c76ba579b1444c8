#![forbid(unsafe_code)]

//! Side-effect suppression for self-notifying bulk operations.
//!
//! A bulk operation such as a splice touches many slots and reports them with
//! one consolidated patch. While it runs, the per-slot writes it performs must
//! not emit their own patch and length events. [`SideEffects`] is the counter
//! that says so; [`SuppressionGuard`] is the only way to raise it.
//!
//! # Invariants
//!
//! 1. Depth `0` means patch and length events are enabled.
//! 2. Each guard raises the depth by one and lowers it by one when dropped,
//!    including during unwinding. Nested guards compose.
//! 3. The translator only reads the depth.

use std::cell::Cell;
use std::rc::Rc;

/// Shared suppression counter owned by a list.
///
/// Cloning yields a handle to the same counter.
#[derive(Debug, Clone, Default)]
pub struct SideEffects {
    depth: Rc<Cell<u32>>,
}

impl SideEffects {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth.get()
    }

    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.depth.get() > 0
    }

    /// Suppress side effects until the returned guard is dropped.
    #[must_use = "suppression ends as soon as the guard is dropped"]
    pub fn begin(&self) -> SuppressionGuard {
        self.depth.set(self.depth.get().saturating_add(1));
        SuppressionGuard {
            depth: Rc::clone(&self.depth),
        }
    }
}

/// RAII guard returned by [`SideEffects::begin`].
#[derive(Debug)]
pub struct SuppressionGuard {
    depth: Rc<Cell<u32>>,
}

impl SuppressionGuard {
    /// End suppression now.
    pub fn release(self) {}
}

impl Drop for SuppressionGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::warn!(
                message = "obslist.suppression.unwind",
                depth = self.depth.get()
            );
        }
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
