#![forbid(unsafe_code)]

//! Splice patches.
//!
//! A [`Patch`] is the minimal contiguous edit equivalent to a mutation:
//! remove `delete_count` items at `index`, then insert `insert` there.
//! Replaying the patches of a length event against the previous contents
//! yields the current contents without diffing the whole list.
//!
//! # Invariants
//!
//! 1. `delete_count + insert.len() >= 1` for every patch that is dispatched.
//! 2. Single-slot patches have `delete_count <= 1` and `insert.len() <= 1`.

/// Patch discriminator. Only splices exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PatchKind {
    #[default]
    Splice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Patch<T> {
    pub index: usize,
    pub delete_count: usize,
    pub insert: Vec<T>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: PatchKind,
}

impl<T> Patch<T> {
    #[must_use]
    pub fn splice(index: usize, delete_count: usize, insert: Vec<T>) -> Self {
        Self {
            index,
            delete_count,
            insert,
            kind: PatchKind::Splice,
        }
    }

    /// Overwrite of one slot.
    #[must_use]
    pub fn replace(index: usize, value: T) -> Self {
        Self::splice(index, 1, vec![value])
    }

    /// Insertion of one slot.
    #[must_use]
    pub fn insert(index: usize, value: T) -> Self {
        Self::splice(index, 0, vec![value])
    }

    /// Whether the patch reflects a real change.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.delete_count + self.insert.len() >= 1
    }

    /// Net change in length caused by this patch.
    #[must_use]
    pub fn len_delta(&self) -> isize {
        self.insert.len() as isize - self.delete_count as isize
    }

    /// Whether the value at `position` may differ after this patch.
    ///
    /// Positions before the patch are untouched. A patch that keeps the length
    /// only rewrites its own window; one that changes the length shifts every
    /// later position.
    #[must_use]
    pub fn affects(&self, position: usize) -> bool {
        if position < self.index {
            return false;
        }
        if self.delete_count == self.insert.len() {
            return position < self.index + self.delete_count;
        }
        true
    }

    /// Replay this patch onto `items`.
    ///
    /// Returns `false` and leaves `items` alone when the patch does not fit.
    pub fn apply_to(&self, items: &mut Vec<T>) -> bool
    where
        T: Clone,
    {
        let Some(end) = self.index.checked_add(self.delete_count) else {
            return false;
        };
        if end > items.len() {
            return false;
        }
        items.splice(self.index..end, self.insert.iter().cloned());
        true
    }
}
