#![forbid(unsafe_code)]

//! Test doubles shared by unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::bus::{EventBus, EventSink, Subscription};
use crate::event::{IndexEvent, LegacyArgs, LengthEvent, ListEvent};
use crate::host::{ListHost, ListId};
use crate::items::ItemsDefinition;
use crate::key::Key;
use crate::suppression::SideEffects;
use crate::tracker::{DependencyTracker, ObservationRecorder};

/// A host with no storage: just a length and the pipeline's collaborators.
pub(crate) struct FakeHost<T> {
    pub id: ListId,
    pub name: String,
    pub len: Cell<usize>,
    pub side_effects: SideEffects,
    pub items: Option<ItemsDefinition<T, FakeHost<T>>>,
    pub recorder: ObservationRecorder,
    pub bus: EventBus<T>,
}

impl<T: 'static> FakeHost<T> {
    pub fn with_len(len: usize) -> Self {
        Self::named("FakeHost", len)
    }

    pub fn named(name: &str, len: usize) -> Self {
        Self {
            id: ListId::next(),
            name: name.to_string(),
            len: Cell::new(len),
            side_effects: SideEffects::new(),
            items: None,
            recorder: ObservationRecorder::new(),
            bus: EventBus::new(),
        }
    }

    pub fn with_items(mut self, items: ItemsDefinition<T, FakeHost<T>>) -> Self {
        self.items = Some(items);
        self
    }
}

impl<T: 'static> ListHost<T> for FakeHost<T> {
    fn list_id(&self) -> ListId {
        self.id
    }

    fn list_name(&self) -> &str {
        &self.name
    }

    fn current_len(&self) -> usize {
        self.len.get()
    }

    fn side_effects(&self) -> &SideEffects {
        &self.side_effects
    }

    fn items_definition(&self) -> Option<&ItemsDefinition<T, Self>> {
        self.items.as_ref()
    }

    fn tracker(&self) -> &dyn DependencyTracker {
        &self.recorder
    }

    fn sink(&self) -> &dyn EventSink<T> {
        &self.bus
    }
}

/// Records everything a bus delivers, on both channels, in order.
pub(crate) struct EventLog<T> {
    events: Rc<RefCell<Vec<ListEvent<T>>>>,
    legacy: Rc<RefCell<Vec<(Key, LegacyArgs<T>)>>>,
    _subscriptions: Vec<Subscription>,
}

impl<T: Clone + 'static> EventLog<T> {
    /// Subscribe to every event, plus legacy listeners for `length` and the
    /// first few indices.
    pub fn attach(bus: &EventBus<T>) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let legacy = Rc::new(RefCell::new(Vec::new()));

        let events_clone = Rc::clone(&events);
        let mut subscriptions = vec![bus.subscribe_all(move |event: &ListEvent<T>| {
            events_clone.borrow_mut().push(event.clone());
        })];
        let legacy_keys = std::iter::once(Key::Length).chain((0..8).map(Key::Index));
        for key in legacy_keys {
            let legacy_clone = Rc::clone(&legacy);
            let recorded_key = key.clone();
            subscriptions.push(bus.subscribe_legacy(key, move |args: &LegacyArgs<T>| {
                legacy_clone
                    .borrow_mut()
                    .push((recorded_key.clone(), args.clone()));
            }));
        }

        Self {
            events,
            legacy,
            _subscriptions: subscriptions,
        }
    }

    pub fn events(&self) -> Vec<ListEvent<T>> {
        self.events.borrow().clone()
    }

    pub fn indices(&self) -> Vec<IndexEvent<T>> {
        self.events
            .borrow()
            .iter()
            .filter_map(ListEvent::as_index)
            .cloned()
            .collect()
    }

    pub fn lengths(&self) -> Vec<LengthEvent<T>> {
        self.events
            .borrow()
            .iter()
            .filter_map(ListEvent::as_length)
            .cloned()
            .collect()
    }

    pub fn legacy(&self, key: &Key) -> Vec<LegacyArgs<T>> {
        self.legacy
            .borrow()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, args)| args.clone())
            .collect()
    }
}
