use bevy::prelude::*;

use crate::overlay::{OverlayKey, OverlayPatch};

/// Message asking the sync layer to talk to the remote store.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum SyncCommand {
    /// Re-read the whole overlay list.
    Refresh,
    /// Send a draft (also used to retry a failed create).
    Create(OverlayKey),
    /// Apply `patch` locally (if any) and commit the overlay's current state.
    Commit {
        key: OverlayKey,
        patch: Option<OverlayPatch>,
    },
    /// Delete remotely, then locally. Drafts are discarded at once.
    Remove(OverlayKey),
}
