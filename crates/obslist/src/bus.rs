#![forbid(unsafe_code)]

//! Listener registry and the two delivery channels of a list.
//!
//! # Design
//!
//! [`EventSink`] is the seam the translator and dispatcher write to. It has
//! two channels: event-object subscribers and legacy listeners that take
//! positional `(new, old)` arguments. [`EventBus`] is the in-process
//! implementation every list owns.
//!
//! Callbacks are held as `Weak` pointers; the strong side lives in the
//! [`Subscription`] returned to the caller. Dead slots are pruned lazily on the
//! next dispatch.
//!
//! # Invariants
//!
//! 1. Typed subscribers are notified in registration order, then wildcard
//!    subscribers in registration order.
//! 2. The registry is not borrowed while callbacks run, so a callback may
//!    subscribe, unsubscribe, or mutate the list that notified it.
//! 3. A subscription dropped during a dispatch still receives that dispatch
//!    if it was already snapshotted; it never receives a later one.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::event::{LegacyArgs, ListEvent};
use crate::key::Key;

type EventCallback<T> = dyn Fn(&ListEvent<T>);
type LegacyCallback<T> = dyn Fn(&LegacyArgs<T>);

/// Where a list delivers its notifications.
pub trait EventSink<T> {
    /// Deliver `event` to event-object subscribers.
    fn notify_subscribers(&self, event: &ListEvent<T>);

    /// Deliver positional arguments to legacy listeners of `event_type`.
    fn notify_legacy_listeners(&self, event_type: &Key, args: &LegacyArgs<T>);

    /// Both channels, subscribers first.
    fn dispatch(&self, event: &ListEvent<T>, legacy: &LegacyArgs<T>) {
        self.notify_subscribers(event);
        self.notify_legacy_listeners(&event.event_type(), legacy);
    }
}

/// RAII guard for a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _guards: Vec<Box<dyn Any>>,
}

impl Subscription {
    pub(crate) fn new(guard: Box<dyn Any>) -> Self {
        Self {
            _guards: vec![guard],
        }
    }

    /// A subscription that keeps nothing alive.
    pub fn empty() -> Self {
        Self {
            _guards: Vec::new(),
        }
    }

    /// Combine several subscriptions into one guard.
    pub fn merge(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        Self {
            _guards: subscriptions
                .into_iter()
                .flat_map(|sub| sub._guards)
                .collect(),
        }
    }

    /// Unsubscribe now. Equivalent to dropping.
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("listeners", &self._guards.len())
            .finish()
    }
}

struct Registry<T> {
    typed: AHashMap<Key, Vec<Weak<EventCallback<T>>>>,
    any: Vec<Weak<EventCallback<T>>>,
    legacy: AHashMap<Key, Vec<Weak<LegacyCallback<T>>>>,
    dispatched: u64,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            typed: AHashMap::new(),
            any: Vec::new(),
            legacy: AHashMap::new(),
            dispatched: 0,
        }
    }
}

/// In-process event bus.
///
/// Cloning yields a handle to the same registry.
pub struct EventBus<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry::default())),
        }
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("EventBus")
            .field("typed_keys", &registry.typed.len())
            .field("wildcard", &registry.any.len())
            .field("legacy_keys", &registry.legacy.len())
            .field("dispatched", &registry.dispatched)
            .finish()
    }
}

impl<T: 'static> EventBus<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for events of one type.
    pub fn subscribe(
        &self,
        event_type: Key,
        callback: impl Fn(&ListEvent<T>) + 'static,
    ) -> Subscription {
        let callback: Rc<EventCallback<T>> = Rc::new(callback);
        self.registry
            .borrow_mut()
            .typed
            .entry(event_type)
            .or_default()
            .push(Rc::downgrade(&callback));
        Subscription::new(Box::new(callback))
    }

    /// Listen for every event.
    pub fn subscribe_all(&self, callback: impl Fn(&ListEvent<T>) + 'static) -> Subscription {
        let callback: Rc<EventCallback<T>> = Rc::new(callback);
        self.registry
            .borrow_mut()
            .any
            .push(Rc::downgrade(&callback));
        Subscription::new(Box::new(callback))
    }

    /// Listen with a positional `(new, old)` callback.
    pub fn subscribe_legacy(
        &self,
        event_type: Key,
        callback: impl Fn(&LegacyArgs<T>) + 'static,
    ) -> Subscription {
        let callback: Rc<LegacyCallback<T>> = Rc::new(callback);
        self.registry
            .borrow_mut()
            .legacy
            .entry(event_type)
            .or_default()
            .push(Rc::downgrade(&callback));
        Subscription::new(Box::new(callback))
    }

    /// Number of live listeners across both channels. Prunes dead slots.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        let mut registry = self.registry.borrow_mut();
        registry.prune();
        let typed: usize = registry.typed.values().map(Vec::len).sum();
        let legacy: usize = registry.legacy.values().map(Vec::len).sum();
        typed + registry.any.len() + legacy
    }

    /// Number of events delivered to the subscriber channel so far.
    #[must_use]
    pub fn dispatched(&self) -> u64 {
        self.registry.borrow().dispatched
    }
}

impl<T> Registry<T> {
    fn prune(&mut self) {
        self.typed.retain(|_, slots| prune_slots(slots));
        self.legacy.retain(|_, slots| prune_slots(slots));
        prune_slots(&mut self.any);
    }
}

/// Drop dead slots; `false` once none are left.
fn prune_slots<C: ?Sized>(slots: &mut Vec<Weak<C>>) -> bool {
    slots.retain(|slot| slot.strong_count() > 0);
    !slots.is_empty()
}

fn live<C: ?Sized>(slots: &mut Vec<Weak<C>>) -> Vec<Rc<C>> {
    prune_slots(slots);
    slots.iter().filter_map(Weak::upgrade).collect()
}

/// Live callbacks for `key`, removing the entry once it is empty.
fn live_for<C: ?Sized>(map: &mut AHashMap<Key, Vec<Weak<C>>>, key: &Key) -> Vec<Rc<C>> {
    let Some(slots) = map.get_mut(key) else {
        return Vec::new();
    };
    let callbacks = live(slots);
    if callbacks.is_empty() {
        map.remove(key);
    }
    callbacks
}

impl<T: 'static> EventSink<T> for EventBus<T> {
    fn notify_subscribers(&self, event: &ListEvent<T>) {
        let callbacks = {
            let mut registry = self.registry.borrow_mut();
            registry.dispatched += 1;
            let mut callbacks = live_for(&mut registry.typed, &event.event_type());
            callbacks.extend(live(&mut registry.any));
            callbacks
        };
        for callback in callbacks {
            callback(event);
        }
    }

    fn notify_legacy_listeners(&self, event_type: &Key, args: &LegacyArgs<T>) {
        let callbacks = live_for(&mut self.registry.borrow_mut().legacy, event_type);
        for callback in callbacks {
            callback(args);
        }
    }
}
