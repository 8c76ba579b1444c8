#![forbid(unsafe_code)]

//! Lazy computed values that subscribe to exactly the list keys they read.
//!
//! # Design
//!
//! [`Computed<R>`] wraps a compute function and its cached result in shared,
//! reference-counted storage. Each recomputation runs inside
//! [`ObservationRecorder::capture`]; the reads it records become the value's
//! dependencies, and every previous subscription is replaced by bindings to
//! those `(list, key)` pairs. A change to any of them marks the value dirty.
//! The next [`get()`](Computed::get) recomputes.
//!
//! A computed value read inside another capture re-reports its own
//! dependencies to that capture, so chains of computed values invalidate
//! transitively.
//!
//! # Invariants
//!
//! 1. `get()` never returns a value that a bound key change has made stale.
//! 2. The compute function runs at most once per change cycle.
//! 3. Version increments by exactly 1 per recomputation.
//! 4. Dependencies are exactly the deduplicated reads of the last run.
//!
//! # Failure Modes
//!
//! - **Compute function panics**: the cached value and bindings remain from the
//!   last successful run and the dirty flag stays set.
//! - **List dropped**: only possible when the compute function does not hold
//!   it. Its bindings go inert and the value keeps its cache.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::bus::Subscription;
use crate::tracker::{Dependency, DependencyTracker, ObservationRecorder};

struct ComputedInner<R> {
    compute: Box<dyn Fn() -> R>,
    /// `None` only before the first computation.
    cached: Option<R>,
    version: u64,
    dependencies: Vec<Dependency>,
    /// Never read; dropping them unbinds.
    _subscriptions: Vec<Subscription>,
}

/// A lazily evaluated, memoized value derived from list reads.
///
/// Cloning a `Computed` creates a new handle to the **same** state.
pub struct Computed<R> {
    inner: Rc<RefCell<ComputedInner<R>>>,
    dirty: Rc<Cell<bool>>,
    recorder: ObservationRecorder,
}

impl<R> Clone for Computed<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            dirty: Rc::clone(&self.dirty),
            recorder: self.recorder.clone(),
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for Computed<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Computed")
            .field("cached", &inner.cached)
            .field("dirty", &self.dirty.get())
            .field("version", &inner.version)
            .field("dependencies", &inner.dependencies.len())
            .finish()
    }
}

impl<R: 'static> Computed<R> {
    /// Create a computed value. Lists read by `compute` must report to
    /// `recorder`.
    pub fn new(recorder: &ObservationRecorder, compute: impl Fn() -> R + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ComputedInner {
                compute: Box::new(compute),
                cached: None,
                version: 0,
                dependencies: Vec::new(),
                _subscriptions: Vec::new(),
            })),
            dirty: Rc::new(Cell::new(true)),
            recorder: recorder.clone(),
        }
    }

    /// Get the current value, recomputing if a dependency changed.
    #[must_use]
    pub fn get(&self) -> R
    where
        R: Clone,
    {
        self.with(R::clone)
    }

    /// Access the current value by reference without cloning.
    ///
    /// # Panics
    ///
    /// Panics if `f` calls back into this same `Computed` while it is
    /// recomputing.
    pub fn with<U>(&self, f: impl FnOnce(&R) -> U) -> U {
        self.refresh();
        let inner = self.inner.borrow();
        for dependency in &inner.dependencies {
            self.recorder.record_read(dependency.clone());
        }
        f(inner
            .cached
            .as_ref()
            .expect("cached is always Some after refresh"))
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Force the next read to recompute.
    pub fn invalidate(&self) {
        self.dirty.set(true);
    }

    /// Increments by 1 on each recomputation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// The `(list, key)` reads of the last computation.
    #[must_use]
    pub fn dependencies(&self) -> Vec<Dependency> {
        self.inner.borrow().dependencies.clone()
    }

    fn refresh(&self) {
        if !self.dirty.get() && self.inner.borrow().cached.is_some() {
            return;
        }

        let (value, dependencies) = {
            let inner = self.inner.borrow();
            self.recorder.capture(|| (inner.compute)())
        };

        let dirty = Rc::downgrade(&self.dirty);
        let on_change: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(dirty) = dirty.upgrade() {
                dirty.set(true);
            }
        });
        let subscriptions = dependencies
            .iter()
            .filter_map(|dependency| dependency.bind(Rc::clone(&on_change)))
            .collect();

        let mut inner = self.inner.borrow_mut();
        inner.cached = Some(value);
        inner.version += 1;
        inner.dependencies = dependencies;
        inner._subscriptions = subscriptions;
        self.dirty.set(false);

        tracing::trace!(
            message = "obslist.computed.refresh",
            version = inner.version,
            dependencies = inner.dependencies.len()
        );
    }
}
