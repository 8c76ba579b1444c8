#![forbid(unsafe_code)]

//! What the notification pipeline needs from the collection it serves.
//!
//! The translator and dispatcher never touch storage. They read a few facts
//! from the host (identity, current length, suppression, hooks) and write
//! events to its sink. [`ListHost`] names exactly those facts.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bus::EventSink;
use crate::items::ItemsDefinition;
use crate::suppression::SideEffects;
use crate::tracker::DependencyTracker;

/// Process-unique list identity, used as the `target` of expando events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(u64);

static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(1);

impl ListId {
    /// Allocate a fresh identity.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "list#{}", self.0)
    }
}

/// The collection side of the pipeline.
pub trait ListHost<T> {
    fn list_id(&self) -> ListId;

    /// Name used in reason logs and tracing fields.
    fn list_name(&self) -> &str;

    /// Length of storage after the mutation was applied. Must not record a read.
    fn current_len(&self) -> usize;

    fn side_effects(&self) -> &SideEffects;

    fn items_definition(&self) -> Option<&ItemsDefinition<T, Self>>
    where
        Self: Sized;

    fn tracker(&self) -> &dyn DependencyTracker;

    fn sink(&self) -> &dyn EventSink<T>;
}
