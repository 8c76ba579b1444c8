#![forbid(unsafe_code)]

//! The observable list host.
//!
//! # Design
//!
//! [`ObservableList<T>`] owns storage (a `Vec<T>` plus named expando slots)
//! and drives the notification pipeline after every write. It is a cheap
//! handle over `Rc` shared state; cloning yields another handle to the same
//! list.
//!
//! Writes come in two shapes:
//!
//! - **Single-key writes** (`set`, `push`, `set_key`, `remove_key`) change one
//!   slot and hand one [`MutationRecord`] to the translator, which emits the
//!   index event and, for indices, its own length event.
//! - **Bulk writes** (`splice` and the helpers built on it) change a range under
//!   suppression, translate each touched slot, then emit one consolidated
//!   length event with action [`Action::Splice`].
//!
//! Reads go through the observation policy and report eligible keys to the
//! list's [`ObservationRecorder`].
//!
//! # Invariants
//!
//! 1. Storage is never borrowed while listeners or hooks run, so both may read
//!    or write the list re-entrantly.
//! 2. Storage changes before any notification for that change is dispatched.
//! 3. A bulk write emits exactly one length event, or none when it changed
//!    nothing.
//!
//! # Failure Modes
//!
//! - **Out-of-range write**: rejected with [`Error::IndexOutOfBounds`] or
//!   [`Error::SpliceOutOfBounds`] before storage is touched.
//! - **Hook error**: storage has already changed; the remaining slots of a bulk
//!   write are not translated and no length event is emitted. Suppression is
//!   still released.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::bus::{EventBus, EventSink, Subscription};
use crate::config::ListConfig;
use crate::dispatcher::dispatch_length_patch;
use crate::error::{Error, Result};
use crate::event::{LegacyArgs, ListEvent};
use crate::host::{ListHost, ListId};
use crate::items::ItemsDefinition;
use crate::key::{EventType, Key};
use crate::mutation::{Action, MutationRecord};
use crate::observation::{KeyInfo, should_record_observation};
use crate::patch::Patch;
use crate::suppression::{SideEffects, SuppressionGuard};
use crate::tracker::{Dependency, DependencyTracker, KeyBinder, ObservationRecorder};
use crate::translator::dispatch_index_event;

struct ListInner<T> {
    id: ListId,
    name: String,
    items: RefCell<Vec<T>>,
    expandos: RefCell<BTreeMap<String, T>>,
    sealed: Cell<bool>,
    side_effects: SideEffects,
    items_definition: Option<ItemsDefinition<T>>,
    recorder: ObservationRecorder,
    bus: EventBus<T>,
}

impl<T: 'static> KeyBinder for ListInner<T> {
    fn bind_key(&self, key: &Key, on_change: Rc<dyn Fn()>) -> Subscription {
        let key = key.clone();
        self.bus.subscribe_all(move |event| {
            if event.touches(&key) {
                on_change();
            }
        })
    }
}

/// An index-addressable sequence whose mutations are observable.
///
/// # Example
///
/// ```
/// use obslist::{Key, ListEvent, ObservableList};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let list = ObservableList::from_vec(vec![10, 20, 30]);
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let seen_clone = Rc::clone(&seen);
/// let _sub = list.on_any(move |event: &ListEvent<i32>| {
///     seen_clone.borrow_mut().push(event.event_type());
/// });
///
/// list.set(1, 99).unwrap();
/// assert_eq!(*seen.borrow(), vec![Key::Index(1), Key::Length]);
/// ```
pub struct ObservableList<T> {
    inner: Rc<ListInner<T>>,
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("items", &self.inner.items.borrow())
            .field("expandos", &self.inner.expandos.borrow())
            .field("sealed", &self.inner.sealed.get())
            .field("suppression", &self.inner.side_effects.depth())
            .finish()
    }
}

impl<T: Clone + fmt::Debug + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for lists that need more than one non-default setting.
#[must_use]
pub struct ListBuilder<T> {
    config: ListConfig,
    items_definition: Option<ItemsDefinition<T>>,
    recorder: ObservationRecorder,
}

impl<T: Clone + fmt::Debug + 'static> ListBuilder<T> {
    pub fn config(mut self, config: ListConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach `added`/`removed` hooks.
    pub fn items_definition(mut self, definition: ItemsDefinition<T>) -> Self {
        self.items_definition = Some(definition);
        self
    }

    /// Report reads to `recorder` instead of a private one.
    pub fn recorder(mut self, recorder: &ObservationRecorder) -> Self {
        self.recorder = recorder.clone();
        self
    }

    pub fn build(self, items: impl IntoIterator<Item = T>) -> ObservableList<T> {
        let mut storage = Vec::with_capacity(self.config.capacity);
        storage.extend(items);
        ObservableList {
            inner: Rc::new(ListInner {
                id: ListId::next(),
                name: self.config.name,
                items: RefCell::new(storage),
                expandos: RefCell::new(BTreeMap::new()),
                sealed: Cell::new(self.config.sealed),
                side_effects: SideEffects::new(),
                items_definition: self.items_definition,
                recorder: self.recorder,
                bus: EventBus::new(),
            }),
        }
    }
}

impl<T: Clone + fmt::Debug + 'static> ObservableList<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build(Vec::new())
    }

    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::builder().build(items)
    }

    #[must_use]
    pub fn with_config(config: ListConfig) -> Self {
        Self::builder().config(config).build(Vec::new())
    }

    /// A list whose structural changes run `definition`'s hooks.
    #[must_use]
    pub fn with_items(items: Vec<T>, definition: ItemsDefinition<T>) -> Self {
        Self::builder().items_definition(definition).build(items)
    }

    /// An empty list reporting reads to a shared recorder.
    #[must_use]
    pub fn with_recorder(recorder: &ObservationRecorder) -> Self {
        Self::builder().recorder(recorder).build(Vec::new())
    }

    pub fn builder() -> ListBuilder<T> {
        ListBuilder {
            config: ListConfig::default(),
            items_definition: None,
            recorder: ObservationRecorder::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ListId {
        self.inner.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The recorder this list reports reads to.
    #[must_use]
    pub fn recorder(&self) -> &ObservationRecorder {
        &self.inner.recorder
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Number of items. Records a read of `length`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observe(Key::Length, true);
        self.storage_len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone of the item at `index`. Records a read of that index, even when
    /// it is past the end, since a later append can fill it.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        let value = self.inner.items.borrow().get(index).cloned();
        self.observe(Key::Index(index), value.is_some());
        value
    }

    /// Read by raw key: numeric keys address items, anything else an expando.
    ///
    /// `"length"` records a read but yields `None`; use [`len`](Self::len).
    #[must_use]
    pub fn get_key(&self, raw: &str) -> Option<T> {
        match Key::parse(raw) {
            Key::Index(index) => self.get(index),
            Key::Length => {
                self.observe(Key::Length, true);
                None
            }
            Key::Expando(name) => {
                let value = self.inner.expandos.borrow().get(&name).cloned();
                let info = KeyInfo::lookup(&name, value.is_some());
                self.observe_with(Key::Expando(name), &info);
                value
            }
        }
    }

    /// Snapshot of every item. Records `length` and each index.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        let items = self.inner.items.borrow().clone();
        self.observe(Key::Length, true);
        for index in 0..items.len() {
            self.observe(Key::Index(index), true);
        }
        items
    }

    // ---------------------------------------------------------------------
    // Single-key writes
    // ---------------------------------------------------------------------

    /// Overwrite the item at `index`, or append when `index == len`.
    pub fn set(&self, index: usize, value: T) -> Result<()> {
        let record = {
            let mut items = self.inner.items.borrow_mut();
            let len = items.len();
            if let Some(slot) = items.get_mut(index) {
                let old = std::mem::replace(slot, value.clone());
                MutationRecord::set(index, value, old)
            } else if index == len {
                items.push(value.clone());
                MutationRecord::add(index, value)
            } else {
                return Err(Error::IndexOutOfBounds { index, len });
            }
        };
        dispatch_index_event(self, record)
    }

    /// Append one item.
    pub fn push(&self, value: T) -> Result<()> {
        self.set(self.storage_len(), value)
    }

    /// Write by raw key. Numeric keys go through [`set`](Self::set); other
    /// keys write an expando.
    pub fn set_key(&self, raw: &str, value: T) -> Result<()> {
        let name = match Key::parse(raw) {
            Key::Index(index) => return self.set(index, value),
            Key::Length => return Err(Error::invalid_key(raw, "length follows storage")),
            Key::Expando(name) => name,
        };
        let record = match self.inner.expandos.borrow_mut().entry(name) {
            Entry::Occupied(mut slot) => {
                let key = Key::Expando(slot.key().clone());
                let old = slot.insert(value.clone());
                MutationRecord::set(key, value, old)
            }
            Entry::Vacant(slot) => {
                if self.inner.sealed.get() {
                    return Err(Error::Sealed {
                        key: slot.into_key(),
                    });
                }
                let key = Key::Expando(slot.key().clone());
                slot.insert(value.clone());
                MutationRecord::add(key, value)
            }
        };
        dispatch_index_event(self, record)
    }

    /// Delete an expando, returning its value. Missing keys are a no-op.
    pub fn remove_key(&self, raw: &str) -> Result<Option<T>> {
        let name = match Key::parse(raw) {
            Key::Index(_) => return Err(Error::invalid_key(raw, "use remove() for items")),
            Key::Length => return Err(Error::invalid_key(raw, "length follows storage")),
            Key::Expando(name) => name,
        };
        let old = {
            let mut expandos = self.inner.expandos.borrow_mut();
            if !expandos.contains_key(&name) {
                return Ok(None);
            }
            if self.inner.sealed.get() {
                return Err(Error::Sealed { key: name });
            }
            expandos.remove(&name)
        };
        let Some(old) = old else {
            return Ok(None);
        };
        dispatch_index_event(self, MutationRecord::remove(Key::Expando(name), old.clone()))?;
        Ok(Some(old))
    }

    // ---------------------------------------------------------------------
    // Bulk writes
    // ---------------------------------------------------------------------

    /// Remove `delete_count` items at `start` and insert `items` in their
    /// place, returning the removed items.
    ///
    /// `delete_count` is clamped to what is available; `start` past the end
    /// is an error.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        items: impl IntoIterator<Item = T>,
    ) -> Result<Vec<T>> {
        let inserted: Vec<T> = items.into_iter().collect();
        let span = tracing::debug_span!(
            "obslist.splice",
            list = self.name(),
            start,
            delete_count,
            insert = inserted.len()
        );
        let _enter = span.enter();

        let (removed, old_len, new_len) = {
            let mut storage = self.inner.items.borrow_mut();
            let len = storage.len();
            if start > len {
                return Err(Error::SpliceOutOfBounds {
                    start,
                    delete_count,
                    len,
                });
            }
            let end = start + delete_count.min(len - start);
            let removed: Vec<T> = storage
                .splice(start..end, inserted.iter().cloned())
                .collect();
            (removed, len, storage.len())
        };
        if removed.is_empty() && inserted.is_empty() {
            return Ok(removed);
        }

        let guard = self.begin_suppression();
        for (offset, old) in removed.iter().enumerate() {
            dispatch_index_event(self, MutationRecord::remove(start + offset, old.clone()))?;
        }
        for (offset, value) in inserted.iter().enumerate() {
            dispatch_index_event(self, MutationRecord::add(start + offset, value.clone()))?;
        }
        guard.release();

        let patch = Patch::splice(start, removed.len(), inserted);
        dispatch_length_patch(self, Action::Splice, vec![patch], new_len, old_len);
        Ok(removed)
    }

    /// Remove and return the last item.
    pub fn pop(&self) -> Result<Option<T>> {
        let len = self.storage_len();
        if len == 0 {
            return Ok(None);
        }
        Ok(self.splice(len - 1, 1, None)?.pop())
    }

    /// Insert `value` at `index`, shifting later items up.
    pub fn insert(&self, index: usize, value: T) -> Result<()> {
        let len = self.storage_len();
        if index > len {
            return Err(Error::IndexOutOfBounds { index, len });
        }
        self.splice(index, 0, Some(value)).map(drop)
    }

    /// Remove and return the item at `index`, shifting later items down.
    pub fn remove(&self, index: usize) -> Result<T> {
        let len = self.storage_len();
        let out_of_bounds = Error::IndexOutOfBounds { index, len };
        if index >= len {
            return Err(out_of_bounds);
        }
        self.splice(index, 1, None)?
            .pop()
            .ok_or(out_of_bounds)
    }

    /// Remove every item, returning them.
    pub fn clear(&self) -> Result<Vec<T>> {
        self.splice(0, self.storage_len(), None)
    }

    // ---------------------------------------------------------------------
    // Suppression and sealing
    // ---------------------------------------------------------------------

    /// Suppress patch and length events until the guard is dropped.
    #[must_use = "suppression ends as soon as the guard is dropped"]
    pub fn begin_suppression(&self) -> SuppressionGuard {
        self.inner.side_effects.begin()
    }

    #[must_use]
    pub fn side_effects_suppressed(&self) -> bool {
        self.inner.side_effects.is_suppressed()
    }

    /// Stop accepting new expando keys. Irreversible.
    pub fn seal(&self) {
        self.inner.sealed.set(true);
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.inner.sealed.get()
    }

    // ---------------------------------------------------------------------
    // Listeners
    // ---------------------------------------------------------------------

    /// Listen for events of one type.
    pub fn on(
        &self,
        event_type: EventType,
        callback: impl Fn(&ListEvent<T>) + 'static,
    ) -> Subscription {
        self.inner.bus.subscribe(event_type, callback)
    }

    /// Listen for every event.
    pub fn on_any(&self, callback: impl Fn(&ListEvent<T>) + 'static) -> Subscription {
        self.inner.bus.subscribe_all(callback)
    }

    /// Listen with a positional `(new, old)` callback.
    pub fn on_legacy(
        &self,
        event_type: EventType,
        callback: impl Fn(&LegacyArgs<T>) + 'static,
    ) -> Subscription {
        self.inner.bus.subscribe_legacy(event_type, callback)
    }

    /// Call `on_change` whenever a dispatched event may change what a reader
    /// of `key` sees.
    pub fn bind_key(&self, key: &Key, on_change: Rc<dyn Fn()>) -> Subscription {
        self.inner.bind_key(key, on_change)
    }

    /// Number of live listeners on both channels.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.bus.listener_count()
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn storage_len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    fn observe(&self, key: Key, own: bool) {
        let info = KeyInfo {
            target_has_own_key: own,
            ..KeyInfo::default()
        };
        self.observe_with(key, &info);
    }

    /// Sealing only freezes expandos; indices and `length` stay appendable.
    fn observe_with(&self, key: Key, info: &KeyInfo) {
        let sealed = matches!(key, Key::Expando(_)) && self.is_sealed();
        if !should_record_observation(info, self.side_effects_suppressed(), sealed) {
            return;
        }
        let inner = Rc::downgrade(&self.inner);
        let binder: Weak<dyn KeyBinder> = inner;
        self.inner
            .recorder
            .record_read(Dependency::new(self.inner.id, key, binder));
    }
}

impl<T: 'static> ListHost<T> for ObservableList<T> {
    fn list_id(&self) -> ListId {
        self.inner.id
    }

    fn list_name(&self) -> &str {
        &self.inner.name
    }

    fn current_len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    fn side_effects(&self) -> &SideEffects {
        &self.inner.side_effects
    }

    fn items_definition(&self) -> Option<&ItemsDefinition<T, Self>> {
        self.inner.items_definition.as_ref()
    }

    fn tracker(&self) -> &dyn DependencyTracker {
        &self.inner.recorder
    }

    fn sink(&self) -> &dyn EventSink<T> {
        &self.inner.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::IndexEvent;
    use crate::mutation::MutationKind;
    use tracing_test::traced_test;

    fn record_all<T: Clone + fmt::Debug + 'static>(
        list: &ObservableList<T>,
    ) -> (Rc<RefCell<Vec<ListEvent<T>>>>, Subscription) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let events_clone = Rc::clone(&events);
        let sub = list.on_any(move |event| events_clone.borrow_mut().push(event.clone()));
        (events, sub)
    }

    fn length_events<T: Clone>(events: &[ListEvent<T>]) -> Vec<crate::event::LengthEvent<T>> {
        events
            .iter()
            .filter_map(ListEvent::as_length)
            .cloned()
            .collect()
    }

    fn index_events<T: Clone>(events: &[ListEvent<T>]) -> Vec<IndexEvent<T>> {
        events
            .iter()
            .filter_map(ListEvent::as_index)
            .cloned()
            .collect()
    }

    #[test]
    fn set_overwrites_and_reports_set() {
        let list = ObservableList::from_vec(vec![10, 20, 30]);
        let (events, _sub) = record_all(&list);

        list.set(1, 99).unwrap();

        assert_eq!(list.to_vec(), vec![10, 99, 30]);
        let events = events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(index_events(&events)[0].old_value, Some(20));
        assert_eq!(length_events(&events)[0].action, Action::Set);
    }

    #[test]
    fn push_appends_with_add() {
        let list = ObservableList::from_vec(vec!['a']);
        let (events, _sub) = record_all(&list);

        list.push('b').unwrap();

        let events = events.borrow();
        assert_eq!(index_events(&events)[0].action, MutationKind::Add);
        let length = &length_events(&events)[0];
        assert_eq!((length.value, length.old_value), (2, 1));
        assert_eq!(length.patches, vec![Patch::insert(1, 'b')]);
    }

    #[test]
    fn writes_past_the_end_are_rejected_untouched() {
        let list = ObservableList::from_vec(vec![1, 2]);
        let (events, _sub) = record_all(&list);

        let err = list.set(5, 0).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: 5, len: 2 }));
        assert!(err.is_rejection());
        assert_eq!(list.to_vec(), vec![1, 2]);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn numeric_raw_keys_address_items() {
        let list = ObservableList::from_vec(vec![1, 2]);
        list.set_key("1", 7).unwrap();
        assert_eq!(list.get_key("1"), Some(7));
        assert_eq!(list.get(1), Some(7));
    }

    #[test]
    fn expandos_add_then_set_without_length_events() {
        let list: ObservableList<&str> = ObservableList::new();
        let (events, _sub) = record_all(&list);

        list.set_key("foo", "bar").unwrap();
        list.set_key("foo", "baz").unwrap();

        let events = events.borrow();
        assert!(length_events(&events).is_empty());
        let indices = index_events(&events);
        assert_eq!(indices.len(), 2);
        assert_eq!(indices[0].action, MutationKind::Add);
        assert_eq!(indices[0].old_value, None);
        assert_eq!(indices[1].action, MutationKind::Set);
        assert_eq!(indices[1].old_value, Some("bar"));
        assert!(indices.iter().all(|e| e.target == Some(list.id())));
        assert_eq!(list.get_key("foo"), Some("baz"));
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn remove_key_reports_remove_with_no_value() {
        let list: ObservableList<u8> = ObservableList::new();
        list.set_key("flag", 1).unwrap();
        let (events, _sub) = record_all(&list);

        assert_eq!(list.remove_key("flag").unwrap(), Some(1));
        assert_eq!(list.remove_key("flag").unwrap(), None);

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        let event = &index_events(&events)[0];
        assert_eq!(event.action, MutationKind::Remove);
        assert_eq!((event.value, event.old_value), (None, Some(1)));
    }

    #[test]
    fn length_and_index_keys_are_not_expandos() {
        let list = ObservableList::from_vec(vec![1]);
        assert!(matches!(
            list.set_key("length", 0),
            Err(Error::InvalidKey { .. })
        ));
        assert!(matches!(
            list.remove_key("0"),
            Err(Error::InvalidKey { .. })
        ));
        assert!(matches!(
            list.remove_key("length"),
            Err(Error::InvalidKey { .. })
        ));
        assert_eq!(list.get_key("length"), None);
    }

    #[test]
    fn sealed_lists_reject_new_and_removed_expandos() {
        let list: ObservableList<i32> =
            ObservableList::with_config(ListConfig::named("Fixed").with_sealed(false));
        list.set_key("kept", 1).unwrap();
        list.seal();
        assert!(list.is_sealed());

        assert!(matches!(
            list.set_key("fresh", 2),
            Err(Error::Sealed { ref key }) if key == "fresh"
        ));
        assert!(matches!(list.remove_key("kept"), Err(Error::Sealed { .. })));
        list.set_key("kept", 3).unwrap();
        assert_eq!(list.get_key("kept"), Some(3));
    }

    #[test]
    fn splice_emits_adds_then_one_consolidated_length_event() {
        let list = ObservableList::from_vec(vec![1, 2, 3, 4]);
        let (events, _sub) = record_all(&list);

        let removed = list.splice(1, 2, [7, 8, 9]).unwrap();

        assert_eq!(removed, vec![2, 3]);
        assert_eq!(list.to_vec(), vec![1, 7, 8, 9, 4]);
        let events = events.borrow();
        let indices = index_events(&events);
        assert_eq!(
            indices.iter().map(|e| e.key.clone()).collect::<Vec<_>>(),
            vec![Key::Index(1), Key::Index(2), Key::Index(3)]
        );
        assert!(indices.iter().all(|e| e.action == MutationKind::Add));
        assert!(events.last().is_some_and(|e| e.as_length().is_some()));

        let lengths = length_events(&events);
        assert_eq!(lengths.len(), 1);
        assert_eq!(lengths[0].action, Action::Splice);
        assert_eq!((lengths[0].value, lengths[0].old_value), (5, 4));
        assert_eq!(lengths[0].patches, vec![Patch::splice(1, 2, vec![7, 8, 9])]);
        assert!(!list.side_effects_suppressed());
    }

    #[test]
    fn noop_splice_is_silent() {
        let list = ObservableList::from_vec(vec![1]);
        let (events, _sub) = record_all(&list);

        assert!(list.splice(1, 5, None).unwrap().is_empty());
        assert!(list.clear().is_ok());
        assert!(list.clear().unwrap().is_empty());

        assert_eq!(length_events(&events.borrow()).len(), 1);
    }

    #[test]
    fn splice_clamps_delete_count_and_rejects_far_starts() {
        let list = ObservableList::from_vec(vec![1, 2, 3]);
        assert_eq!(list.splice(1, 10, None).unwrap(), vec![2, 3]);
        assert!(matches!(
            list.splice(4, 0, [5]),
            Err(Error::SpliceOutOfBounds {
                start: 4,
                delete_count: 0,
                len: 1
            })
        ));
        assert_eq!(list.to_vec(), vec![1]);
    }

    #[test]
    fn bulk_helpers() {
        let list = ObservableList::from_vec(vec!['a', 'b', 'c']);

        assert_eq!(list.pop().unwrap(), Some('c'));
        list.insert(0, 'z').unwrap();
        assert_eq!(list.to_vec(), vec!['z', 'a', 'b']);
        assert_eq!(list.remove(1).unwrap(), 'a');
        assert!(matches!(
            list.remove(2),
            Err(Error::IndexOutOfBounds { index: 2, len: 2 })
        ));
        assert!(matches!(
            list.insert(3, 'q'),
            Err(Error::IndexOutOfBounds { index: 3, len: 2 })
        ));
        assert_eq!(list.clear().unwrap(), vec!['z', 'b']);
        assert_eq!(list.pop().unwrap(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn splice_runs_removed_hooks_per_slot() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let removed_calls = Rc::clone(&calls);
        let added_calls = Rc::clone(&calls);
        let definition = ItemsDefinition::new()
            .on_removed(move |_list: &ObservableList<i32>, value: &i32, index| {
                removed_calls.borrow_mut().push(("removed", *value, index));
                Ok(())
            })
            .on_added(move |_list: &ObservableList<i32>, value: &i32, index| {
                added_calls.borrow_mut().push(("added", *value, index));
                Ok(())
            });
        let list = ObservableList::with_items(vec![1, 2, 3], definition);

        list.splice(0, 2, [9]).unwrap();

        assert_eq!(
            *calls.borrow(),
            vec![("removed", 1, 0), ("removed", 2, 1), ("added", 9, 0)]
        );
    }

    #[test]
    fn failing_hook_releases_suppression_and_skips_length_event() {
        let definition = ItemsDefinition::new().on_added(
            |_list: &ObservableList<i32>, value: &i32, _index| {
                if *value < 0 {
                    return Err("negative item".into());
                }
                Ok(())
            },
        );
        let list = ObservableList::with_items(Vec::new(), definition);
        let (events, _sub) = record_all(&list);

        let err = list.splice(0, 0, [1, -1, 2]).unwrap_err();

        assert!(matches!(err, Error::Hook(_)));
        assert!(!err.is_rejection());
        assert!(!list.side_effects_suppressed());
        assert_eq!(list.to_vec(), vec![1, -1, 2]);
        assert!(length_events(&events.borrow()).is_empty());
    }

    #[test]
    fn manual_suppression_silences_length_events() {
        let list = ObservableList::from_vec(vec![0]);
        let (events, _sub) = record_all(&list);

        {
            let _guard = list.begin_suppression();
            assert!(list.side_effects_suppressed());
            list.set(0, 5).unwrap();
            list.push(6).unwrap();
        }
        list.push(7).unwrap();

        let events = events.borrow();
        assert_eq!(index_events(&events).len(), 3);
        let lengths = length_events(&events);
        assert_eq!(lengths.len(), 1);
        assert_eq!((lengths[0].value, lengths[0].old_value), (3, 2));
    }

    #[test]
    fn reads_record_dependencies() {
        let list = ObservableList::from_vec(vec![1, 2]);
        let recorder = list.recorder().clone();

        let (_, deps) = recorder.capture(|| {
            let _ = list.len();
            let _ = list.get(1);
            let _ = list.get(5);
            let _ = list.get(1);
        });

        let keys: Vec<Key> = deps.iter().map(|d| d.key.clone()).collect();
        assert_eq!(keys, vec![Key::Length, Key::Index(1), Key::Index(5)]);
        assert!(deps.iter().all(|d| d.target == list.id()));
    }

    #[test]
    fn method_names_and_sealed_misses_are_not_recorded() {
        let list: ObservableList<i32> = ObservableList::new();
        let recorder = list.recorder().clone();

        let (_, deps) = recorder.capture(|| {
            let _ = list.get_key("push");
            let _ = list.get_key("title");
        });
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].key, Key::expando("title"));

        list.seal();
        let (_, deps) = recorder.capture(|| list.get_key("title"));
        assert!(deps.is_empty());
    }

    #[test]
    fn sealed_lists_still_record_reads_past_the_end() {
        let list = ObservableList::from_vec(vec![1, 2, 3]);
        list.seal();
        let recorder = list.recorder().clone();

        let (value, deps) = recorder.capture(|| list.get(3));
        assert_eq!(value, None);
        let keys: Vec<Key> = deps.iter().map(|d| d.key.clone()).collect();
        assert_eq!(keys, vec![Key::Index(3)]);

        let (_, deps) = recorder.capture(|| list.get_key("length"));
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn suppressed_reads_are_not_recorded() {
        let list = ObservableList::from_vec(vec![1]);
        let recorder = list.recorder().clone();
        let (_, deps) = recorder.capture(|| {
            let _guard = list.begin_suppression();
            list.len()
        });
        assert!(deps.is_empty());
    }

    #[test]
    fn bind_key_fires_for_changes_that_reach_the_key() {
        let list = ObservableList::from_vec(vec![1, 2, 3]);
        let hits = Rc::new(Cell::new(0));
        let hits_clone = Rc::clone(&hits);
        let _sub = list.bind_key(
            &Key::Index(1),
            Rc::new(move || hits_clone.set(hits_clone.get() + 1)),
        );

        list.set(2, 30).unwrap();
        assert_eq!(hits.get(), 0);

        list.set(1, 20).unwrap();
        assert!(hits.get() >= 1);

        let before = hits.get();
        list.insert(0, 0).unwrap();
        assert!(hits.get() > before);
    }

    #[test]
    fn listeners_may_write_back_reentrantly() {
        let list = ObservableList::from_vec(vec![1]);
        let writer = list.clone();
        let _sub = list.on(Key::Length, move |_| {
            if writer.len() < 3 {
                writer.push(0).unwrap();
            }
        });

        list.push(2).unwrap();
        assert_eq!(list.to_vec(), vec![1, 2, 0]);
    }

    #[test]
    fn legacy_listeners_receive_lengths() {
        let list = ObservableList::from_vec(vec![1, 2]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let _sub = list.on_legacy(Key::Length, move |args| {
            seen_clone.borrow_mut().push(args.clone());
        });

        list.clear().unwrap();

        assert_eq!(*seen.borrow(), vec![LegacyArgs::Lengths { new: 0, old: 2 }]);
    }

    #[test]
    fn config_flows_into_the_list() {
        let list: ObservableList<u8> = ObservableList::builder()
            .config(ListConfig::named("Todos").with_sealed(true).with_capacity(8))
            .build(Vec::new());
        assert_eq!(list.name(), "Todos");
        assert!(list.is_sealed());
        assert_eq!(list.listener_count(), 0);
    }

    #[traced_test]
    #[test]
    fn splice_logs_span_and_length_patch() {
        let list = ObservableList::from_vec(vec![1, 2]);
        list.splice(0, 1, [5]).unwrap();

        assert!(logs_contain("obslist.splice"));
        assert!(logs_contain("obslist.length_patch"));
    }
}
