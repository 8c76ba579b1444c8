#![forbid(unsafe_code)]

//! Dependency recording.
//!
//! A computation that reads a list should be re-run when, and only when, the
//! keys it read change. Lists report each eligible read to a
//! [`DependencyTracker`]; [`ObservationRecorder`] is the implementation that
//! collects those reads into frames.
//!
//! # Frames
//!
//! - [`ObservationRecorder::capture`] pushes a recording frame. Reads land in
//!   the innermost recording frame only.
//! - [`DependencyTracker::run_untracked`] pushes an ignoring frame. Nothing
//!   read beneath it is recorded, however deep the nesting.
//! - With no frame on the stack, reads are dropped.
//!
//! Frames are popped by a guard, so a panicking computation does not leave the
//! recorder in a recording state.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::bus::Subscription;
use crate::host::ListId;
use crate::key::Key;

/// Something that can notify when a key changes.
pub trait KeyBinder {
    /// Call `on_change` whenever an event touching `key` is dispatched.
    fn bind_key(&self, key: &Key, on_change: Rc<dyn Fn()>) -> Subscription;
}

/// One recorded read: which list, which key, and how to listen for it.
#[derive(Clone)]
pub struct Dependency {
    pub target: ListId,
    pub key: Key,
    binder: Weak<dyn KeyBinder>,
}

impl Dependency {
    #[must_use]
    pub fn new(target: ListId, key: Key, binder: Weak<dyn KeyBinder>) -> Self {
        Self {
            target,
            key,
            binder,
        }
    }

    /// Subscribe to changes of this key. `None` once the list is gone.
    #[must_use]
    pub fn bind(&self, on_change: Rc<dyn Fn()>) -> Option<Subscription> {
        let binder = self.binder.upgrade()?;
        Some(binder.bind_key(&self.key, on_change))
    }

    fn same_read(&self, other: &Self) -> bool {
        self.target == other.target && self.key == other.key
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.same_read(other)
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("target", &self.target)
            .field("key", &self.key)
            .field("alive", &(self.binder.strong_count() > 0))
            .finish()
    }
}

/// The capability lists use to report reads.
pub trait DependencyTracker {
    /// Run `f` without recording any read it performs.
    fn run_untracked(&self, f: &mut dyn FnMut());

    /// Record a read of `dependency.key` on `dependency.target`.
    fn record_read(&self, dependency: Dependency);
}

#[derive(Debug)]
enum Frame {
    Recording(Vec<Dependency>),
    Ignoring,
}

/// Frame-stack recorder.
///
/// Cloning yields a handle to the same stack; lists and computed values that
/// should see each other must share one recorder.
#[derive(Debug, Clone, Default)]
pub struct ObservationRecorder {
    frames: Rc<RefCell<Vec<Frame>>>,
}

struct FrameGuard<'a> {
    recorder: &'a ObservationRecorder,
    depth: usize,
}

impl FrameGuard<'_> {
    fn finish(self) -> Option<Frame> {
        let frame = self.recorder.pop_to(self.depth);
        std::mem::forget(self);
        frame
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        let _ = self.recorder.pop_to(self.depth);
    }
}

impl ObservationRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` and return what it read, deduplicated, in first-read order.
    pub fn capture<R>(&self, f: impl FnOnce() -> R) -> (R, Vec<Dependency>) {
        let guard = self.push(Frame::Recording(Vec::new()));
        let value = f();
        let dependencies = match guard.finish() {
            Some(Frame::Recording(dependencies)) => dependencies,
            _ => Vec::new(),
        };
        (value, dependencies)
    }

    /// Run `f` with recording suspended and return its result.
    pub fn untracked<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.push(Frame::Ignoring);
        f()
    }

    /// Whether a read right now would be recorded.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        matches!(self.frames.borrow().last(), Some(Frame::Recording(_)))
    }

    /// Number of open frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    fn push(&self, frame: Frame) -> FrameGuard<'_> {
        let mut frames = self.frames.borrow_mut();
        frames.push(frame);
        FrameGuard {
            recorder: self,
            depth: frames.len(),
        }
    }

    /// Pop frames down to `depth - 1`, returning the frame at `depth`.
    fn pop_to(&self, depth: usize) -> Option<Frame> {
        let mut frames = self.frames.borrow_mut();
        if frames.len() < depth {
            return None;
        }
        frames.truncate(depth);
        frames.pop()
    }
}

impl DependencyTracker for ObservationRecorder {
    fn run_untracked(&self, f: &mut dyn FnMut()) {
        self.untracked(f);
    }

    fn record_read(&self, dependency: Dependency) {
        let mut frames = self.frames.borrow_mut();
        if let Some(Frame::Recording(reads)) = frames.last_mut()
            && !reads.iter().any(|read| read.same_read(&dependency))
        {
            reads.push(dependency);
        }
    }
}
