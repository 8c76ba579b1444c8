#![forbid(unsafe_code)]

//! Which key reads are worth recording.
//!
//! A list is an object with its own keys (indices, `length`, expandos) and
//! shared members (its methods). Reading a method is not reading data, so it
//! must never create a dependency. Reading a key that does not exist yet does
//! matter as long as the key could still appear, i.e. the list is not sealed.
//!
//! A key is observed when all of these hold:
//!
//! 1. side effects are not suppressed,
//! 2. the access does not go through an accessor,
//! 3. and one of:
//!    - the key is the list's own,
//!    - the key is neither own nor shared and the list is not sealed,
//!    - the key is a shared member that is not a function.

/// What is known about a key at the moment it is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyInfo {
    /// The read goes through a getter rather than a data slot.
    pub is_accessor: bool,
    /// The key is present on the list itself.
    pub target_has_own_key: bool,
    /// The key names a shared member of every list.
    pub shared_has_key: bool,
    /// That shared member is a method.
    pub shared_is_function: bool,
}

/// Shared members of every list, all methods.
pub const SHARED_METHODS: &[&str] = &[
    "clear",
    "get",
    "get_key",
    "insert",
    "is_empty",
    "len",
    "pop",
    "push",
    "remove",
    "remove_key",
    "set",
    "set_key",
    "splice",
    "to_vec",
];

impl KeyInfo {
    /// Describe a key that is (or is not) the list's own, looking up shared
    /// members by name.
    #[must_use]
    pub fn lookup(name: &str, target_has_own_key: bool) -> Self {
        let shared_has_key = SHARED_METHODS.binary_search(&name).is_ok();
        Self {
            is_accessor: false,
            target_has_own_key,
            shared_has_key,
            shared_is_function: shared_has_key,
        }
    }
}

/// Decide whether a read described by `info` should be recorded.
#[must_use]
pub fn should_record_observation(info: &KeyInfo, suppressed: bool, sealed: bool) -> bool {
    if suppressed || info.is_accessor {
        return false;
    }
    info.target_has_own_key
        || (!info.shared_has_key && !sealed)
        || (info.shared_has_key && !info.shared_is_function)
}
