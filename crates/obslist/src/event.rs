#![forbid(unsafe_code)]

//! Events observed by list listeners.
//!
//! Two shapes exist:
//!
//! - [`IndexEvent`]: one slot (or expando key) changed. Typed by its key.
//! - [`LengthEvent`]: the length event of a mutation cycle, carrying the
//!   splice patches that explain it. Typed by [`Key::Length`].
//!
//! Legacy listeners receive [`LegacyArgs`] instead: the `(new, old)` pair of
//! the value or of the length.

use std::fmt;

use crate::host::ListId;
use crate::key::Key;
use crate::mutation::{Action, MutationKind};
use crate::patch::Patch;

/// A single-key change.
///
/// `target` is attached for expando keys only.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEvent<T> {
    pub key: Key,
    pub action: MutationKind,
    pub value: Option<T>,
    pub old_value: Option<T>,
    pub target: Option<ListId>,
}

impl<T> IndexEvent<T> {
    /// The event type. Always equal to the key.
    #[must_use]
    pub fn event_type(&self) -> &Key {
        &self.key
    }
}

/// Diagnostic trail naming the operation that caused a length event.
///
/// Only attached in debug builds or with the `reason-log` feature.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReasonLog {
    /// `"<list name>.<action>"`.
    pub operation: String,
    /// Debug rendering of the dispatch arguments.
    pub args: String,
}

impl fmt::Display for ReasonLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} called with {}", self.operation, self.args)
    }
}

/// Length change with the patches that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LengthEvent<T> {
    pub action: Action,
    /// New length.
    pub value: usize,
    /// Length before the mutation.
    pub old_value: usize,
    pub patches: Vec<Patch<T>>,
    pub reason_log: Option<ReasonLog>,
}

/// Anything a list dispatches to its subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent<T> {
    Index(IndexEvent<T>),
    Length(LengthEvent<T>),
}

impl<T> ListEvent<T> {
    #[must_use]
    pub fn event_type(&self) -> Key {
        match self {
            Self::Index(event) => event.key.clone(),
            Self::Length(_) => Key::Length,
        }
    }

    #[must_use]
    pub fn as_index(&self) -> Option<&IndexEvent<T>> {
        match self {
            Self::Index(event) => Some(event),
            Self::Length(_) => None,
        }
    }

    #[must_use]
    pub fn as_length(&self) -> Option<&LengthEvent<T>> {
        match self {
            Self::Length(event) => Some(event),
            Self::Index(_) => None,
        }
    }

    /// Whether this event may change what a reader of `key` sees.
    #[must_use]
    pub fn touches(&self, key: &Key) -> bool {
        match (self, key) {
            (Self::Index(event), key) => event.key == *key,
            (Self::Length(_), Key::Length) => true,
            (Self::Length(event), Key::Index(position)) => {
                event.patches.iter().any(|patch| patch.affects(*position))
            }
            (Self::Length(_), Key::Expando(_)) => false,
        }
    }
}

/// Positional `(new, old)` arguments for function-style listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyArgs<T> {
    Values { new: Option<T>, old: Option<T> },
    Lengths { new: usize, old: usize },
}

#[cfg(feature = "serde")]
mod serialize {
    use serde::ser::{Serialize, SerializeStruct, Serializer};

    use super::{IndexEvent, LengthEvent, ListEvent};
    use crate::key::Key;

    impl<T: Serialize> Serialize for IndexEvent<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let fields = if self.target.is_some() { 6 } else { 5 };
            let mut state = serializer.serialize_struct("IndexEvent", fields)?;
            state.serialize_field("type", &self.key)?;
            state.serialize_field("action", &self.action)?;
            state.serialize_field("key", &self.key)?;
            state.serialize_field("value", &self.value)?;
            state.serialize_field("oldValue", &self.old_value)?;
            if let Some(target) = self.target {
                state.serialize_field("target", &target.raw())?;
            } else {
                state.skip_field("target")?;
            }
            state.end()
        }
    }

    impl<T: Serialize> Serialize for LengthEvent<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let fields = if self.reason_log.is_some() { 7 } else { 6 };
            let mut state = serializer.serialize_struct("LengthEvent", fields)?;
            state.serialize_field("type", &Key::Length)?;
            state.serialize_field("key", &Key::Length)?;
            state.serialize_field("action", &self.action)?;
            state.serialize_field("value", &self.value)?;
            state.serialize_field("oldValue", &self.old_value)?;
            state.serialize_field("patches", &self.patches)?;
            if let Some(reason) = &self.reason_log {
                state.serialize_field("reasonLog", reason)?;
            } else {
                state.skip_field("reasonLog")?;
            }
            state.end()
        }
    }

    impl<T: Serialize> Serialize for ListEvent<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::Index(event) => event.serialize(serializer),
                Self::Length(event) => event.serialize(serializer),
            }
        }
    }
}
