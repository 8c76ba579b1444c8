#![forbid(unsafe_code)]

//! Construction-time settings for an [`ObservableList`](crate::ObservableList).

/// Per-list configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    /// Name used in reason logs and tracing fields.
    pub name: String,
    /// Reject new expando keys, and stop recording reads of missing ones.
    pub sealed: bool,
    /// Initial storage capacity.
    pub capacity: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            name: String::from("ObservableList"),
            sealed: false,
            capacity: 0,
        }
    }
}

impl ListConfig {
    /// Default configuration under another name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_sealed(mut self, sealed: bool) -> Self {
        self.sealed = sealed;
        self
    }

    /// Reserve room for `capacity` items up front.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}
