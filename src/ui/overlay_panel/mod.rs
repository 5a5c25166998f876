//! Overlay panel UI module.
//!
//! This module provides the left-side panel for creating overlays and managing the
//! saved ones.
//!
//! ## Module Structure
//!
//! - [`draft`] - "New overlay" form
//! - [`list`] - Overlay rows, row actions and the inline editor
//! - [`main_panel`] - Main panel orchestration
//!
//! ## Key Types
//!
//! - [`OverlayPanelState`]: Resource holding the inline editor and form errors

use bevy::prelude::*;

use crate::constants::MOVE_RIGHT_STEP;
use crate::overlay::{Geometry, Overlay, OverlayKey, OverlayKind, OverlayPatch};

mod draft;
mod list;
mod main_panel;

pub use main_panel::overlay_panel_ui;

/// Working copy of one overlay while its inline editor is open.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineEdit {
    pub key: OverlayKey,
    pub kind: OverlayKind,
    pub content: String,
    pub geometry: Geometry,
    pub error: Option<String>,
}

impl InlineEdit {
    pub fn from_overlay(overlay: &Overlay) -> Self {
        Self {
            key: overlay.key,
            kind: overlay.kind,
            content: overlay.content.clone(),
            geometry: overlay.geometry,
            error: None,
        }
    }

    /// Explicit patch carrying every edited field.
    pub fn to_patch(&self) -> Result<OverlayPatch, String> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err("Content cannot be empty".to_string());
        }
        Ok(OverlayPatch {
            kind: Some(self.kind),
            content: Some(content.to_string()),
            geometry: Some(self.geometry.clamped().rounded()),
        })
    }
}

#[derive(Resource, Default)]
pub struct OverlayPanelState {
    pub editing: Option<InlineEdit>,
    /// Last "Add" validation failure
    pub form_error: Option<String>,
}

/// Row actions collected while drawing, applied after the panel closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelAction {
    Add,
    Refresh,
    Retry(OverlayKey),
    Delete(OverlayKey),
    MoveRight(OverlayKey),
    BeginEdit(OverlayKey),
    ApplyEdit,
    CancelEdit,
}

/// Geometry patch for the "Move right" action.
pub fn move_right_patch(geometry: Geometry) -> OverlayPatch {
    OverlayPatch::geometry(
        Geometry {
            x: geometry.x + MOVE_RIGHT_STEP,
            ..geometry
        }
        .clamped()
        .rounded(),
    )
}
