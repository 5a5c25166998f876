//! Per-overlay request ordering.
//!
//! At most one request per overlay is in flight. Commands arriving for a busy overlay
//! are parked and issued when its request completes, so commits for one overlay reach
//! the store in the order their gestures ended. Different overlays are independent.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::overlay::{OverlayKey, OverlayStore, SyncStatus};

use super::messages::SyncCommand;
use super::protocol::{
    prepare_commit, prepare_create, prepare_remove, reconcile, Reconciled, SyncRequest,
    SyncResponse,
};

/// Work parked behind an in-flight request. A parked delete replaces a parked commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parked {
    Commit,
    Remove,
}

#[derive(Resource, Default, Debug)]
pub struct SyncOutbox {
    in_flight: HashSet<OverlayKey>,
    parked: HashMap<OverlayKey, Parked>,
    listing: bool,
}

/// Result of completing a request.
#[derive(Debug)]
pub struct Completion {
    pub reconciled: Reconciled,
    /// Parked work that is now ready to go out.
    pub next: Option<SyncRequest>,
}

impl SyncOutbox {
    pub fn is_busy(&self, key: OverlayKey) -> bool {
        self.in_flight.contains(&key)
    }

    pub fn is_listing(&self) -> bool {
        self.listing
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len() + usize::from(self.listing)
    }

    fn park(&mut self, key: OverlayKey, work: Parked) {
        let entry = self.parked.entry(key).or_insert(work);
        if work == Parked::Remove {
            *entry = Parked::Remove;
        }
    }

    fn track(&mut self, request: Option<SyncRequest>) -> Option<SyncRequest> {
        if let Some(key) = request.as_ref().and_then(SyncRequest::key) {
            self.in_flight.insert(key);
        }
        request
    }

    /// Turn an operator or gesture command into a request, if one can go out now.
    ///
    /// Commit patches are applied to the store immediately, even when the request
    /// itself has to wait.
    pub fn submit(&mut self, store: &mut OverlayStore, command: SyncCommand) -> Option<SyncRequest> {
        match command {
            SyncCommand::Refresh => {
                if self.listing {
                    debug!("Listing already in flight");
                    return None;
                }
                self.listing = true;
                Some(SyncRequest::List)
            }
            SyncCommand::Create(key) => {
                if self.is_busy(key) {
                    return None;
                }
                let request = prepare_create(store, key);
                self.track(request)
            }
            SyncCommand::Commit { key, patch } => {
                let deleting = store
                    .get(key)
                    .is_none_or(|o| o.status == SyncStatus::Deleting);
                if deleting {
                    return None;
                }
                if let Some(patch) = patch {
                    store.apply_patch(key, &patch);
                }
                if self.is_busy(key) {
                    self.park(key, Parked::Commit);
                    return None;
                }
                let request = prepare_commit(store, key);
                self.track(request)
            }
            SyncCommand::Remove(key) => {
                if self.is_busy(key) {
                    self.park(key, Parked::Remove);
                    return None;
                }
                let request = prepare_remove(store, key);
                self.track(request)
            }
        }
    }

    /// Reconcile a finished request and release any work parked behind it.
    pub fn complete(
        &mut self,
        store: &mut OverlayStore,
        response: SyncResponse,
        surface: Vec2,
    ) -> Completion {
        let key = response.key();
        match key {
            Some(key) => {
                self.in_flight.remove(&key);
            }
            None => self.listing = false,
        }

        let reconciled = reconcile(store, response, surface);

        let Some(key) = key else {
            return Completion {
                reconciled,
                next: None,
            };
        };
        if reconciled.needs_commit {
            self.park(key, Parked::Commit);
        }
        let next = match self.parked.remove(&key) {
            Some(_) if !store.contains(key) => None,
            Some(Parked::Commit) => prepare_commit(store, key),
            Some(Parked::Remove) => prepare_remove(store, key),
            None => None,
        };
        Completion {
            reconciled,
            next: self.track(next),
        }
    }
}
