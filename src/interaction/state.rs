//! The gesture state machine.
//!
//! At most one gesture is live. Every pointer move writes the target's new geometry into
//! the store straight away; the only hand-off to the network is the [`GestureEnd`]
//! returned on release, which the caller turns into a single commit.

use bevy::prelude::*;
use bevy_egui::egui;

use crate::constants::DEFAULT_MIN_OVERLAY_PX;
use crate::error::OverlayError;
use crate::overlay::{Geometry, OverlayKey, OverlayStore};

use super::geometry::{dragged, grab_offset, resized};
use super::hit_detection::{Hit, HitPart};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        target: OverlayKey,
        /// Pointer minus the overlay's top-left at press time, in pixels.
        pointer_offset: Vec2,
    },
    Resizing {
        target: OverlayKey,
    },
}

impl Gesture {
    pub fn target(&self) -> Option<OverlayKey> {
        match self {
            Gesture::Idle => None,
            Gesture::Dragging { target, .. } | Gesture::Resizing { target } => Some(*target),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }

    /// Cursor to show while this gesture runs.
    pub fn cursor_icon(&self) -> Option<egui::CursorIcon> {
        match self {
            Gesture::Idle => None,
            Gesture::Dragging { .. } => Some(egui::CursorIcon::Grabbing),
            Gesture::Resizing { .. } => Some(egui::CursorIcon::ResizeNwSe),
        }
    }
}

impl HitPart {
    /// Cursor to show while hovering this part.
    pub fn cursor_icon(&self) -> egui::CursorIcon {
        match self {
            HitPart::Body => egui::CursorIcon::Move,
            HitPart::ResizeHandle => egui::CursorIcon::ResizeNwSe,
        }
    }
}

/// Final state of a finished gesture, ready to be committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEnd {
    pub target: OverlayKey,
    pub geometry: Geometry,
}

/// What a pointer move did.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// No gesture is running.
    Idle,
    Updated(Geometry),
    /// Resize asked for less than the minimum size; the floored geometry was applied.
    Floored(Geometry, OverlayError),
    /// The target vanished (e.g. deleted remotely); the gesture ended without effect.
    TargetLost,
}

#[derive(Resource, Debug, Clone)]
pub struct InteractionMachine {
    gesture: Gesture,
    min_size_px: f32,
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_OVERLAY_PX)
    }
}

impl InteractionMachine {
    pub fn new(min_size_px: f32) -> Self {
        Self {
            gesture: Gesture::Idle,
            min_size_px: min_size_px.max(1.0),
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn set_min_size_px(&mut self, min_size_px: f32) {
        self.min_size_px = min_size_px.max(1.0);
    }

    /// Pointer pressed on the surface.
    ///
    /// A press while another gesture is still live (its release was lost, e.g. outside
    /// the window) ends that gesture first; its final state is returned so it still gets
    /// committed. A press that hits nothing leaves the machine idle.
    pub fn press(
        &mut self,
        store: &OverlayStore,
        hit: Option<Hit>,
        pointer: Vec2,
        surface: Vec2,
    ) -> Option<GestureEnd> {
        let ended = if self.gesture.is_active() {
            debug!("Press during live gesture {:?}; ending it first", self.gesture);
            self.release(store)
        } else {
            None
        };

        let Some(hit) = hit else {
            return ended;
        };
        let Some(overlay) = store.get(hit.target) else {
            return ended;
        };

        self.gesture = match hit.part {
            HitPart::Body => Gesture::Dragging {
                target: hit.target,
                pointer_offset: grab_offset(overlay.geometry, pointer, surface),
            },
            HitPart::ResizeHandle => Gesture::Resizing { target: hit.target },
        };
        debug!("Gesture started: {:?}", self.gesture);

        ended
    }

    /// Pointer moved. Applies the new geometry to the store immediately.
    pub fn pointer_move(
        &mut self,
        store: &mut OverlayStore,
        pointer: Vec2,
        surface: Vec2,
    ) -> MoveOutcome {
        let Some(target) = self.gesture.target() else {
            return MoveOutcome::Idle;
        };
        let Some(current) = store.get(target).map(|o| o.geometry) else {
            debug!("Gesture target {:?} vanished; dropping gesture", target);
            self.gesture = Gesture::Idle;
            return MoveOutcome::TargetLost;
        };

        let outcome = match self.gesture {
            Gesture::Dragging { pointer_offset, .. } => {
                MoveOutcome::Updated(dragged(current, pointer, pointer_offset, surface))
            }
            Gesture::Resizing { .. } => {
                let result = resized(current, pointer, surface, self.min_size_px);
                if result.floored {
                    MoveOutcome::Floored(
                        result.geometry,
                        OverlayError::InvalidGeometry {
                            min_px: self.min_size_px,
                        },
                    )
                } else {
                    MoveOutcome::Updated(result.geometry)
                }
            }
            Gesture::Idle => MoveOutcome::Idle,
        };

        if let MoveOutcome::Updated(geometry) | MoveOutcome::Floored(geometry, _) = &outcome {
            store.set_geometry(target, *geometry);
        }
        outcome
    }

    /// Pointer released. Returns the state to commit, or `None` if nothing was live or
    /// the target is gone.
    pub fn release(&mut self, store: &OverlayStore) -> Option<GestureEnd> {
        let gesture = std::mem::take(&mut self.gesture);
        let target = gesture.target()?;
        let Some(overlay) = store.get(target) else {
            debug!("Gesture target {:?} vanished before release", target);
            return None;
        };
        debug!("Gesture ended: {:?}", gesture);
        Some(GestureEnd {
            target,
            geometry: overlay.geometry,
        })
    }
}
