#![forbid(unsafe_code)]

//! Patch/length dispatch.
//!
//! Builds the length event of a mutation cycle and hands it to the host's
//! sink, together with `(new_len, old_len)` for legacy listeners. No
//! deduplication happens here: two calls produce two events. Keeping a cycle
//! to one length event is the caller's job.
//!
//! Debug builds (or the `reason-log` feature) attach a [`ReasonLog`] naming the
//! operation and its arguments. Release builds compile the trail away and
//! leave `reason_log` as `None`; the event shape is the same either way.

use std::fmt;

use crate::event::{LegacyArgs, LengthEvent, ListEvent, ReasonLog};
use crate::host::ListHost;
use crate::mutation::Action;
use crate::patch::Patch;

/// Dispatch one length event carrying `patches`.
pub fn dispatch_length_patch<T, H>(
    host: &H,
    action: Action,
    patches: Vec<Patch<T>>,
    new_len: usize,
    old_len: usize,
) where
    T: fmt::Debug,
    H: ListHost<T>,
{
    debug_assert!(
        patches.iter().all(Patch::is_effective),
        "length event carries an empty patch"
    );

    let reason_log = reason_log(host.list_name(), action, &patches, new_len, old_len);

    tracing::debug!(
        message = "obslist.length_patch",
        list = host.list_name(),
        action = action.as_str(),
        old_len,
        new_len,
        patches = patches.len()
    );

    let event = ListEvent::Length(LengthEvent {
        action,
        value: new_len,
        old_value: old_len,
        patches,
        reason_log,
    });
    host.sink().dispatch(
        &event,
        &LegacyArgs::Lengths {
            new: new_len,
            old: old_len,
        },
    );
}

#[cfg(any(debug_assertions, feature = "reason-log"))]
fn reason_log<T: fmt::Debug>(
    name: &str,
    action: Action,
    patches: &[Patch<T>],
    new_len: usize,
    old_len: usize,
) -> Option<ReasonLog> {
    Some(ReasonLog {
        operation: format!("{name}.{action}"),
        args: format!("{:?}", (action, patches, new_len, old_len)),
    })
}

#[cfg(not(any(debug_assertions, feature = "reason-log")))]
#[inline(always)]
fn reason_log<T>(
    _name: &str,
    _action: Action,
    _patches: &[Patch<T>],
    _new_len: usize,
    _old_len: usize,
) -> Option<ReasonLog> {
    None
}
