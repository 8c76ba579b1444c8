#![forbid(unsafe_code)]

//! Keys addressed on an observable list.
//!
//! A list answers to three kinds of key: a numeric index into storage, the
//! `length` pseudo-key, and expando keys (arbitrary named properties on the
//! list object that never affect its length).
//!
//! Raw string keys are classified once by [`Key::parse`]. Only a plain run of
//! ASCII digits that fits in `usize` is an index; everything else (signs,
//! fractions, exponents, whitespace, the empty string) is an expando.

use std::fmt;

/// A classified key.
///
/// The same value doubles as the event type: index events are typed by their
/// index, length events by [`Key::Length`], expando events by their name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Position in storage.
    Index(usize),
    /// The `length` pseudo-key.
    Length,
    /// A named non-index property.
    Expando(String),
}

/// Listener registration key. Events are typed by the key they change.
pub type EventType = Key;

impl Key {
    pub const LENGTH: &'static str = "length";

    /// Classify a raw key.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == Self::LENGTH {
            return Self::Length;
        }
        match parse_index(raw) {
            Some(index) => Self::Index(index),
            None => Self::Expando(raw.to_owned()),
        }
    }

    /// Build an expando key without classifying it.
    #[must_use]
    pub fn expando(name: impl Into<String>) -> Self {
        Self::Expando(name.into())
    }

    #[must_use]
    pub const fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_index(&self) -> bool {
        matches!(self, Self::Index(_))
    }
}

fn parse_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for Key {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Length => f.write_str(Self::LENGTH),
            Self::Expando(name) => f.write_str(name),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Key {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Index(index) => serializer.serialize_u64(*index as u64),
            Self::Length => serializer.serialize_str(Self::LENGTH),
            Self::Expando(name) => serializer.serialize_str(name),
        }
    }
}
