#![forbid(unsafe_code)]

//! Index mutation translation.
//!
//! Turns one already-applied single-key change into the notifications a
//! list's observers see. The branch is picked once, from the key:
//!
//! | key     | kind   | hook      | index event | length event (unsuppressed)                |
//! |---------|--------|-----------|-------------|--------------------------------------------|
//! | index   | set    | none      | yes         | `{i, 1, [new]}`, `len -> len`              |
//! | index   | add    | `added`   | yes         | `{i, 0, [new]}`, `len - 1 -> len`          |
//! | index   | remove | `removed` | no          | no                                         |
//! | other   | any    | none      | yes, with target | never                                 |
//!
//! A single-slot removal is always part of some bulk operation that reports
//! its own consolidated patch, so it only runs the hook.
//!
//! # Ordering
//!
//! The index event is dispatched before the length event, and both before
//! this returns. Hooks run before either.
//!
//! # Failure Modes
//!
//! - **Hook error**: returned unchanged as [`Error::Hook`]; nothing is
//!   dispatched for that mutation. Storage has already changed.

use std::fmt;

use crate::dispatcher::dispatch_length_patch;
use crate::error::{Error, Result};
use crate::event::{IndexEvent, LegacyArgs, ListEvent};
use crate::host::{ListHost, ListId};
use crate::items::{HookResult, ItemHook};
use crate::key::Key;
use crate::mutation::{Action, Change, MutationKind, MutationRecord};
use crate::patch::Patch;

/// Notify observers of one applied mutation.
pub fn dispatch_index_event<T, H>(host: &H, record: MutationRecord<T>) -> Result<()>
where
    T: Clone + fmt::Debug,
    H: ListHost<T>,
{
    match record.into_parts() {
        (Key::Index(index), Change::Set { value, old }) => {
            translate_set(host, index, value, old);
            Ok(())
        }
        (Key::Index(index), Change::Add { value }) => translate_add(host, index, value),
        (Key::Index(index), Change::Remove { old }) => translate_remove(host, index, &old),
        (key, change) => {
            let (kind, new_value, old_value) = change.into_values();
            translate_expando(host, key, kind, new_value, old_value);
            Ok(())
        }
    }
}

fn translate_set<T, H>(host: &H, index: usize, value: T, old: T)
where
    T: Clone + fmt::Debug,
    H: ListHost<T>,
{
    let key = Key::Index(index);
    notify_index(host, key, MutationKind::Set, Some(value.clone()), Some(old), None);
    if !host.side_effects().is_suppressed() {
        let len = host.current_len();
        dispatch_length_patch(host, Action::Set, vec![Patch::replace(index, value)], len, len);
    }
}

fn translate_add<T, H>(host: &H, index: usize, value: T) -> Result<()>
where
    T: Clone + fmt::Debug,
    H: ListHost<T>,
{
    if let Some(hook) = host.items_definition().and_then(|items| items.added()) {
        run_hook(host, hook, &value, index)?;
    }
    let key = Key::Index(index);
    notify_index(host, key, MutationKind::Add, Some(value.clone()), None, None);
    if !host.side_effects().is_suppressed() {
        let len = host.current_len();
        debug_assert!(
            len > index,
            "host length {len} does not cover added index {index}"
        );
        dispatch_length_patch(
            host,
            Action::Add,
            vec![Patch::insert(index, value)],
            len,
            len.saturating_sub(1),
        );
    }
    Ok(())
}

fn translate_remove<T, H>(host: &H, index: usize, old: &T) -> Result<()>
where
    H: ListHost<T>,
{
    if let Some(hook) = host.items_definition().and_then(|items| items.removed()) {
        run_hook(host, hook, old, index)?;
    }
    Ok(())
}

fn translate_expando<T, H>(
    host: &H,
    key: Key,
    kind: MutationKind,
    new_value: Option<T>,
    old_value: Option<T>,
) where
    T: Clone,
    H: ListHost<T>,
{
    notify_index(host, key, kind, new_value, old_value, Some(host.list_id()));
}

fn notify_index<T, H>(
    host: &H,
    key: Key,
    action: MutationKind,
    value: Option<T>,
    old_value: Option<T>,
    target: Option<ListId>,
) where
    T: Clone,
    H: ListHost<T>,
{
    tracing::trace!(
        message = "obslist.index_event",
        list = host.list_name(),
        key = %key,
        action = action.as_str()
    );

    let legacy = LegacyArgs::Values {
        new: value.clone(),
        old: old_value.clone(),
    };
    let event = ListEvent::Index(IndexEvent {
        key,
        action,
        value,
        old_value,
        target,
    });
    host.sink().dispatch(&event, &legacy);
}

/// Run a structural hook with dependency recording suspended.
fn run_hook<T, H>(host: &H, hook: &ItemHook<T, H>, value: &T, index: usize) -> Result<()>
where
    H: ListHost<T>,
{
    tracing::trace!(message = "obslist.hook", list = host.list_name(), index);

    let mut outcome: HookResult = Ok(());
    host.tracker()
        .run_untracked(&mut || outcome = hook(host, value, index));
    outcome.map_err(Error::Hook)
}
