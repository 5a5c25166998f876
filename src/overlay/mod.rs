//! Overlay data model, coordinate normalization and the local overlay store.
//!
//! ## Module Structure
//!
//! - [`model`] - Canonical (percent) overlay types
//! - [`wire`] - Record shape exchanged with the remote store
//! - [`normalize`] - Pixel/percent unit resolution for raw records
//! - [`store`] - Ordered in-memory overlay collection
//! - [`draft`] - "New overlay" form state

mod draft;
mod model;
mod normalize;
pub mod store;
pub mod wire;


pub use draft::DraftForm;
pub use model::{
    round2, Geometry, Overlay, OverlayId, OverlayKey, OverlayKind, OverlayPatch, SyncStatus,
};
pub use store::OverlayStore;
pub use wire::RawOverlay;

use bevy::prelude::*;

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OverlayStore>()
            .init_resource::<DraftForm>();
    }
}
