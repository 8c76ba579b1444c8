#![forbid(unsafe_code)]

//! Change notification for observable lists.
//!
//! Every write to an [`ObservableList`] is turned into an ordered stream of
//! events:
//!
//! - an [`IndexEvent`] for the slot or expando key that changed,
//! - then, for index writes, a [`LengthEvent`] carrying the old and new length
//!   and a [`Patch`] that replays the edit.
//!
//! Bulk writes ([`ObservableList::splice`] and friends) suppress the per-slot
//! length events and report one consolidated patch instead.
//!
//! Reads report the keys they touch to an [`ObservationRecorder`], and
//! [`Computed`] values use those reports to subscribe to exactly the keys they
//! depend on.
//!
//! # Architecture
//!
//! The pipeline is split along [`ListHost`]: the translator
//! ([`dispatch_index_event`]) and dispatcher ([`dispatch_length_patch`]) never
//! touch storage, only the facts a host exposes and the [`EventSink`] it
//! writes to. `ObservableList` is the in-crate host.
//!
//! Everything is single-threaded (`Rc`/`RefCell`) and synchronous: events are
//! delivered before the write that caused them returns.

pub mod bus;
pub mod computed;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod host;
pub mod items;
pub mod key;
pub mod list;
pub mod mutation;
pub mod observation;
pub mod patch;
pub mod suppression;
pub mod tracker;
pub mod translator;

#[cfg(test)]
mod testing;

pub use bus::{EventBus, EventSink, Subscription};
pub use computed::Computed;
pub use config::ListConfig;
pub use dispatcher::dispatch_length_patch;
pub use error::{Error, Result};
pub use event::{IndexEvent, LegacyArgs, LengthEvent, ListEvent, ReasonLog};
pub use host::{ListHost, ListId};
pub use items::{HookError, HookResult, ItemsDefinition};
pub use key::{EventType, Key};
pub use list::{ListBuilder, ObservableList};
pub use mutation::{Action, MutationKind, MutationRecord};
pub use observation::{KeyInfo, should_record_observation};
pub use patch::{Patch, PatchKind};
pub use suppression::{SideEffects, SuppressionGuard};
pub use tracker::{Dependency, DependencyTracker, KeyBinder, ObservationRecorder};
pub use translator::dispatch_index_event;
