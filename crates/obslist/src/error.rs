#![forbid(unsafe_code)]

//! Error type for list mutations.
//!
//! The notification pipeline itself has nothing to report under correct use.
//! Errors come from the host collection rejecting a write before storage is
//! touched, or from an items hook failing after it was.

use thiserror::Error;

use crate::items::HookError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("splice at {start} removing {delete_count} out of bounds (length {len})")]
    SpliceOutOfBounds {
        start: usize,
        delete_count: usize,
        len: usize,
    },

    #[error("cannot add or remove key {key:?} on a sealed list")]
    Sealed { key: String },

    #[error("key {key:?} is not writable here: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// An `added`/`removed` hook failed. The hook's error is carried as-is.
    #[error("{0}")]
    Hook(#[source] HookError),
}

impl Error {
    #[must_use]
    pub fn invalid_key(key: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason,
        }
    }

    /// Whether the write was rejected before storage changed.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Hook(_))
    }
}
