//! Request preparation, execution and reconciliation against the local store.
//!
//! Every remote operation is split in three steps so that only the middle one leaves
//! the main thread:
//!
//! 1. `prepare_*` reads the store, marks the overlay as pending and snapshots the
//!    payload together with the overlay's revision.
//! 2. [`execute`] runs the blocking call against a [`RemoteStore`].
//! 3. [`reconcile`] folds the response back into the store. A commit echo is applied
//!    only if no newer local mutation happened since its request was prepared.

use bevy::prelude::*;

use crate::error::OverlayError;
use crate::overlay::{OverlayId, OverlayKey, OverlayStore, RawOverlay, SyncStatus};

use super::remote::RemoteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    List,
    Create,
    Commit,
    Remove,
}

impl SyncAction {
    pub fn label(&self) -> &'static str {
        match self {
            SyncAction::List => "Loading overlays",
            SyncAction::Create => "Creating overlay",
            SyncAction::Commit => "Saving overlay",
            SyncAction::Remove => "Deleting overlay",
        }
    }
}

/// A snapshot of one remote operation, ready to run off the main thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncRequest {
    List,
    Create {
        key: OverlayKey,
        revision: u64,
        payload: RawOverlay,
    },
    Commit {
        key: OverlayKey,
        id: OverlayId,
        revision: u64,
        payload: RawOverlay,
    },
    Remove {
        key: OverlayKey,
        id: OverlayId,
        /// Status to put back if the store refuses the delete.
        restore: SyncStatus,
    },
}

impl SyncRequest {
    pub fn key(&self) -> Option<OverlayKey> {
        match self {
            SyncRequest::List => None,
            SyncRequest::Create { key, .. }
            | SyncRequest::Commit { key, .. }
            | SyncRequest::Remove { key, .. } => Some(*key),
        }
    }

    pub fn action(&self) -> SyncAction {
        match self {
            SyncRequest::List => SyncAction::List,
            SyncRequest::Create { .. } => SyncAction::Create,
            SyncRequest::Commit { .. } => SyncAction::Commit,
            SyncRequest::Remove { .. } => SyncAction::Remove,
        }
    }
}

/// Outcome of an executed [`SyncRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum SyncResponse {
    Listed(Result<Vec<RawOverlay>, OverlayError>),
    Created {
        key: OverlayKey,
        revision: u64,
        result: Result<RawOverlay, OverlayError>,
    },
    Committed {
        key: OverlayKey,
        revision: u64,
        result: Result<RawOverlay, OverlayError>,
    },
    Removed {
        key: OverlayKey,
        restore: SyncStatus,
        result: Result<(), OverlayError>,
    },
}

impl SyncResponse {
    pub fn key(&self) -> Option<OverlayKey> {
        match self {
            SyncResponse::Listed(_) => None,
            SyncResponse::Created { key, .. }
            | SyncResponse::Committed { key, .. }
            | SyncResponse::Removed { key, .. } => Some(*key),
        }
    }
}

/// Run a request against the remote store. Blocking.
pub fn execute(remote: &dyn RemoteStore, request: SyncRequest) -> SyncResponse {
    match request {
        SyncRequest::List => SyncResponse::Listed(remote.list()),
        SyncRequest::Create {
            key,
            revision,
            payload,
        } => SyncResponse::Created {
            key,
            revision,
            result: remote.create(&payload),
        },
        SyncRequest::Commit {
            key,
            id,
            revision,
            payload,
        } => SyncResponse::Committed {
            key,
            revision,
            result: remote.update(&id, &payload),
        },
        SyncRequest::Remove { key, id, restore } => SyncResponse::Removed {
            key,
            restore,
            result: remote.delete(&id),
        },
    }
}

/// Start creating a draft. Only drafts that were never sent or whose create failed
/// qualify.
pub fn prepare_create(store: &mut OverlayStore, key: OverlayKey) -> Option<SyncRequest> {
    let overlay = store.get_mut(key)?;
    if overlay.is_persistent() || !matches!(overlay.status, SyncStatus::Draft | SyncStatus::CreateFailed(_)) {
        debug!("Overlay {:?} is not a sendable draft ({})", key, overlay.status.label());
        return None;
    }
    overlay.status = SyncStatus::Creating;
    Some(SyncRequest::Create {
        key,
        revision: overlay.revision,
        payload: overlay.to_wire(),
    })
}

/// Start committing the overlay's current local state.
///
/// Drafts stay local: their latest state goes out with the create. Overlays being
/// deleted are not committed.
pub fn prepare_commit(store: &mut OverlayStore, key: OverlayKey) -> Option<SyncRequest> {
    let overlay = store.get_mut(key)?;
    let Some(id) = overlay.id.clone() else {
        debug!("Overlay {:?} has no remote id yet; change kept local", key);
        return None;
    };
    if overlay.status == SyncStatus::Deleting {
        return None;
    }
    overlay.status = SyncStatus::Committing;
    Some(SyncRequest::Commit {
        key,
        id,
        revision: overlay.revision,
        payload: overlay.to_wire(),
    })
}

/// Start deleting an overlay. Drafts are discarded locally right away; persisted
/// overlays stay until the store acknowledges.
pub fn prepare_remove(store: &mut OverlayStore, key: OverlayKey) -> Option<SyncRequest> {
    let overlay = store.get_mut(key)?;
    let Some(id) = overlay.id.clone() else {
        store.remove(key);
        debug!("Discarded local draft {:?}", key);
        return None;
    };
    if overlay.status == SyncStatus::Deleting {
        return None;
    }
    let restore = std::mem::replace(&mut overlay.status, SyncStatus::Deleting);
    Some(SyncRequest::Remove { key, id, restore })
}

/// A remote failure to show the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncFailure {
    pub action: SyncAction,
    pub error: OverlayError,
}

impl std::fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.action.label(), self.error)
    }
}

/// What reconciling one response did.
#[derive(Debug, Default, PartialEq)]
pub struct Reconciled {
    pub failure: Option<SyncFailure>,
    /// Normalization notices raised while ingesting records.
    pub notices: Vec<OverlayError>,
    /// The local state is newer than what the store now holds and must be committed.
    pub needs_commit: bool,
}

impl Reconciled {
    fn failed(action: SyncAction, error: OverlayError) -> Self {
        Self {
            failure: Some(SyncFailure { action, error }),
            ..default()
        }
    }
}

/// Fold a response into the store.
pub fn reconcile(store: &mut OverlayStore, response: SyncResponse, surface: Vec2) -> Reconciled {
    match response {
        SyncResponse::Listed(Ok(records)) => {
            let notices = store.replace_listing(&records, surface);
            info!("Loaded {} overlays from the remote store", store.iter().filter(|o| o.is_persistent()).count());
            Reconciled {
                notices,
                ..default()
            }
        }
        SyncResponse::Listed(Err(error)) => {
            error!("Failed to list overlays: {}", error);
            store.set_listing_error(Some(error.to_string()));
            Reconciled::failed(SyncAction::List, error)
        }

        SyncResponse::Created {
            key,
            revision,
            result: Ok(record),
        } => {
            let Some(local_revision) = store.get(key).map(|o| o.revision) else {
                warn!("Created overlay {:?} is no longer in the local store", key);
                return Reconciled::default();
            };
            let Some(id) = record.id.clone() else {
                let error = OverlayError::RemoteRejection("create response has no _id".into());
                error!("Failed to create overlay: {}", error);
                store.set_status(key, SyncStatus::CreateFailed(error.to_string()));
                return Reconciled::failed(SyncAction::Create, error);
            };
            info!("Created overlay {}", id);
            let dropped = store.discard_duplicates(key, &id);
            if dropped > 0 {
                debug!("Dropped {} listed copies of overlay {} in favor of its draft", dropped, id);
            }
            if local_revision == revision {
                store.apply_remote(key, &record, surface);
                Reconciled::default()
            } else {
                debug!("Overlay {} changed while being created; committing local state", id);
                store.adopt_id(key, id, record.extra);
                Reconciled {
                    needs_commit: true,
                    ..default()
                }
            }
        }
        SyncResponse::Created {
            key,
            result: Err(error),
            ..
        } => {
            error!("Failed to create overlay: {}", error);
            store.set_status(key, SyncStatus::CreateFailed(error.to_string()));
            Reconciled::failed(SyncAction::Create, error)
        }

        SyncResponse::Committed {
            key,
            revision,
            result: Ok(echo),
        } => {
            match store.get(key).map(|o| o.revision) {
                Some(local_revision) if local_revision == revision => {
                    store.apply_remote(key, &echo, surface);
                }
                Some(local_revision) => {
                    debug!(
                        "Ignoring stale echo for overlay {:?} (revision {} < {})",
                        key, revision, local_revision
                    );
                }
                None => debug!("Committed overlay {:?} is no longer in the local store", key),
            }
            Reconciled::default()
        }
        SyncResponse::Committed {
            key,
            result: Err(error),
            ..
        } => {
            warn!("Failed to save overlay {:?}: {}", key, error);
            store.set_status(key, SyncStatus::Unsynced(error.to_string()));
            Reconciled::failed(SyncAction::Commit, error)
        }

        SyncResponse::Removed {
            key, result: Ok(()), ..
        } => {
            if let Some(overlay) = store.remove(key) {
                info!(
                    "Deleted overlay {}",
                    overlay.id.map(|id| id.to_string()).unwrap_or_default()
                );
            }
            Reconciled::default()
        }
        SyncResponse::Removed {
            key,
            restore,
            result: Err(error),
        } => {
            error!("Failed to delete overlay {:?}: {}", key, error);
            store.set_status(key, restore);
            Reconciled::failed(SyncAction::Remove, error)
        }
    }
}
