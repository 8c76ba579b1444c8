#![forbid(unsafe_code)]

//! Structural hooks run when items enter or leave a list.
//!
//! Hooks are owned by whoever defines the list's item type. The translator
//! calls them with dependency recording suspended: they are bookkeeping, and a
//! computed value that happens to be recording when a mutation lands must not
//! start depending on whatever the hook reads.

use std::fmt;
use std::rc::Rc;

use crate::list::ObservableList;

/// Error returned by a hook. Propagated to the mutation call site unchanged.
pub type HookError = Box<dyn std::error::Error>;

pub type HookResult = std::result::Result<(), HookError>;

/// `(host, value, index)`.
pub type ItemHook<T, H> = Rc<dyn Fn(&H, &T, usize) -> HookResult>;

/// Optional `added`/`removed` hooks for a list's items.
pub struct ItemsDefinition<T, H = ObservableList<T>> {
    added: Option<ItemHook<T, H>>,
    removed: Option<ItemHook<T, H>>,
}

impl<T, H> ItemsDefinition<T, H> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            added: None,
            removed: None,
        }
    }

    /// Run `hook` after an item lands at an index.
    #[must_use]
    pub fn on_added(mut self, hook: impl Fn(&H, &T, usize) -> HookResult + 'static) -> Self {
        self.added = Some(Rc::new(hook));
        self
    }

    /// Run `hook` after an item leaves an index.
    #[must_use]
    pub fn on_removed(mut self, hook: impl Fn(&H, &T, usize) -> HookResult + 'static) -> Self {
        self.removed = Some(Rc::new(hook));
        self
    }

    #[must_use]
    pub fn added(&self) -> Option<&ItemHook<T, H>> {
        self.added.as_ref()
    }

    #[must_use]
    pub fn removed(&self) -> Option<&ItemHook<T, H>> {
        self.removed.as_ref()
    }
}

impl<T, H> Default for ItemsDefinition<T, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H> Clone for ItemsDefinition<T, H> {
    fn clone(&self) -> Self {
        Self {
            added: self.added.clone(),
            removed: self.removed.clone(),
        }
    }
}

impl<T, H> fmt::Debug for ItemsDefinition<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemsDefinition")
            .field("added", &self.added.is_some())
            .field("removed", &self.removed.is_some())
            .finish()
    }
}
