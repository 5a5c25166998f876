//! Hit testing of pointer presses against overlays.

use bevy::prelude::*;

use crate::overlay::{Geometry, OverlayKey, OverlayStore, SyncStatus};

/// Which part of an overlay was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: OverlayKey,
    pub part: HitPart,
}

/// Resize handle square at the overlay's bottom-right corner, as (min, max) pixels.
///
/// The handle never grows past the overlay itself, so tiny overlays stay draggable
/// from their top-left area.
pub fn handle_rect(geometry: Geometry, surface: Vec2, handle_px: f32) -> (Vec2, Vec2) {
    let (min, max) = geometry.rect_px(surface);
    let side = Vec2::splat(handle_px).min((max - min) * 0.5);
    (max - side, max)
}

fn contains(rect: (Vec2, Vec2), point: Vec2) -> bool {
    point.x >= rect.0.x && point.x <= rect.1.x && point.y >= rect.0.y && point.y <= rect.1.y
}

/// Find the topmost overlay under `pointer` (surface-local pixels).
///
/// Later overlays render on top, so the store is walked back to front. On each overlay
/// the resize handle wins over the body. Overlays waiting on a delete are not grabbable.
pub fn hit_test(store: &OverlayStore, pointer: Vec2, surface: Vec2, handle_px: f32) -> Option<Hit> {
    store
        .iter()
        .rev()
        .filter(|overlay| overlay.status != SyncStatus::Deleting)
        .find_map(|overlay| {
            if contains(handle_rect(overlay.geometry, surface, handle_px), pointer) {
                Some(Hit {
                    target: overlay.key,
                    part: HitPart::ResizeHandle,
                })
            } else if contains(overlay.geometry.rect_px(surface), pointer) {
                Some(Hit {
                    target: overlay.key,
                    part: HitPart::Body,
                })
            } else {
                None
            }
        })
}
