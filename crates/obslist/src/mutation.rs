#![forbid(unsafe_code)]

//! Mutation kinds and the transient record handed to the translator.

use std::fmt;

use crate::key::Key;

/// What happened to a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MutationKind {
    /// An existing slot was overwritten.
    Set,
    /// A new slot now exists.
    Add,
    /// A slot is gone.
    Remove,
}

impl MutationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The operation a length event reports.
///
/// Single-slot writes report their [`MutationKind`]; bulk operations report
/// [`Action::Splice`] with one consolidated patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Action {
    Set,
    Add,
    Remove,
    Splice,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Splice => "splice",
        }
    }
}

impl From<MutationKind> for Action {
    fn from(kind: MutationKind) -> Self {
        match kind {
            MutationKind::Set => Self::Set,
            MutationKind::Add => Self::Add,
            MutationKind::Remove => Self::Remove,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One already-applied change, consumed within a single notification cycle.
///
/// The constructors fix which values each kind carries: a set has both, an
/// add only the new value, a removal only the old one. Expando changes may
/// omit either through [`MutationRecord::expando`].
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord<T> {
    key: Key,
    change: Change<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Change<T> {
    Set { value: T, old: T },
    Add { value: T },
    Remove { old: T },
    /// Only ever paired with a [`Key::Expando`].
    Loose {
        kind: MutationKind,
        value: Option<T>,
        old: Option<T>,
    },
}

impl<T> Change<T> {
    pub(crate) fn kind(&self) -> MutationKind {
        match self {
            Self::Set { .. } => MutationKind::Set,
            Self::Add { .. } => MutationKind::Add,
            Self::Remove { .. } => MutationKind::Remove,
            Self::Loose { kind, .. } => *kind,
        }
    }

    /// `(kind, new, old)` with absent sides as `None`.
    pub(crate) fn into_values(self) -> (MutationKind, Option<T>, Option<T>) {
        match self {
            Self::Set { value, old } => (MutationKind::Set, Some(value), Some(old)),
            Self::Add { value } => (MutationKind::Add, Some(value), None),
            Self::Remove { old } => (MutationKind::Remove, None, Some(old)),
            Self::Loose { kind, value, old } => (kind, value, old),
        }
    }
}

impl<T> MutationRecord<T> {
    #[must_use]
    pub fn set(key: impl Into<Key>, new_value: T, old_value: T) -> Self {
        Self {
            key: key.into(),
            change: Change::Set {
                value: new_value,
                old: old_value,
            },
        }
    }

    #[must_use]
    pub fn add(key: impl Into<Key>, new_value: T) -> Self {
        Self {
            key: key.into(),
            change: Change::Add { value: new_value },
        }
    }

    #[must_use]
    pub fn remove(key: impl Into<Key>, old_value: T) -> Self {
        Self {
            key: key.into(),
            change: Change::Remove { old: old_value },
        }
    }

    /// A change to a named property, where either side may be absent.
    #[must_use]
    pub fn expando(
        name: impl Into<String>,
        kind: MutationKind,
        new_value: Option<T>,
        old_value: Option<T>,
    ) -> Self {
        Self {
            key: Key::expando(name),
            change: Change::Loose {
                kind,
                value: new_value,
                old: old_value,
            },
        }
    }

    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    #[must_use]
    pub fn kind(&self) -> MutationKind {
        self.change.kind()
    }

    #[must_use]
    pub fn new_value(&self) -> Option<&T> {
        match &self.change {
            Change::Set { value, .. } | Change::Add { value } => Some(value),
            Change::Remove { .. } => None,
            Change::Loose { value, .. } => value.as_ref(),
        }
    }

    #[must_use]
    pub fn old_value(&self) -> Option<&T> {
        match &self.change {
            Change::Set { old, .. } | Change::Remove { old } => Some(old),
            Change::Add { .. } => None,
            Change::Loose { old, .. } => old.as_ref(),
        }
    }

    pub(crate) fn into_parts(self) -> (Key, Change<T>) {
        (self.key, self.change)
    }
}
