//! Bookkeeping for submitted work: the pending queue of compilations
//! not yet sent to the compiler, and the active table of those in
//! flight, keyed by compilation id.

use crate::error::Error;
use crate::tracker::Tracker;
use std::collections::{HashMap, VecDeque};

#[derive(Default)]
pub(crate) struct Dispatcher {
    pending: VecDeque<Tracker>,
    active: HashMap<u32, Tracker>,
}

impl Dispatcher {
    pub(crate) fn push_pending(&mut self, tracker: Tracker) {
        self.pending.push_back(tracker);
    }

    /// Drain the pending queue in submission order.
    pub(crate) fn take_pending(&mut self) -> Vec<Tracker> {
        self.pending.drain(..).collect()
    }

    /// Fail everything still queued.
    pub(crate) fn fail_pending(&mut self, error: &Error) {
        for mut tracker in self.pending.drain(..) {
            tracker.cancel(error.clone());
        }
    }

    pub(crate) fn insert_active(&mut self, tracker: Tracker) {
        self.active.insert(tracker.id(), tracker);
    }

    pub(crate) fn active_mut(&mut self, id: u32) -> Option<&mut Tracker> {
        self.active.get_mut(&id)
    }

    pub(crate) fn is_active(&self, id: u32) -> bool {
        self.active.contains_key(&id)
    }

    pub(crate) fn remove_active(&mut self, id: u32) {
        self.active.remove(&id);
    }

    /// Fail every active compilation. Trackers whose failure resolved
    /// immediately are removed; those with a callout in flight stay
    /// until the callout returns and their deferred failure fires.
    pub(crate) fn cancel_active(&mut self, error: &Error) {
        self.active
            .retain(|_, tracker| !tracker.cancel(error.clone()));
    }

    /// True when no compilation is in flight; quiescing completes here.
    pub(crate) fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}
