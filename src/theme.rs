//! Centralized color theme for the application.
//!
//! This module provides all colors used by the surface painter and the panels.
//! Modify values here to change the application's color scheme.

use bevy_egui::egui;

use crate::overlay::SyncStatus;

// ============================================================================
// Surface Colors
// ============================================================================

/// Near-black stand-in for the video behind the overlays
pub const SURFACE_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(16, 16, 20);

/// Thin frame around the surface
pub const SURFACE_FRAME: egui::Color32 = egui::Color32::from_rgb(70, 70, 76);

/// Translucent fill behind overlay content
pub const OVERLAY_FILL: egui::Color32 = egui::Color32::from_black_alpha(120);

/// Overlay text
pub const OVERLAY_TEXT: egui::Color32 = egui::Color32::WHITE;

/// Placeholder fill for image overlays
pub const IMAGE_PLACEHOLDER: egui::Color32 = egui::Color32::from_rgb(50, 58, 72);

/// Resize handle square
pub const RESIZE_HANDLE: egui::Color32 = egui::Color32::from_rgb(255, 179, 51);

/// Outline of the overlay being dragged or resized
pub const GESTURE_HIGHLIGHT: egui::Color32 = egui::Color32::from_rgb(51, 153, 255);

// ============================================================================
// Sync Status Colors
// ============================================================================

pub const STATUS_DRAFT: egui::Color32 = egui::Color32::GRAY;
pub const STATUS_PENDING: egui::Color32 = egui::Color32::from_rgb(230, 180, 60);
pub const STATUS_SYNCED: egui::Color32 = egui::Color32::from_rgb(100, 200, 100);
pub const STATUS_MODIFIED: egui::Color32 = egui::Color32::from_rgb(110, 160, 230);
pub const STATUS_FAILED: egui::Color32 = egui::Color32::from_rgb(220, 90, 90);

/// Border/badge color for an overlay's sync status
pub fn status_color(status: &SyncStatus) -> egui::Color32 {
    match status {
        SyncStatus::Draft => STATUS_DRAFT,
        SyncStatus::Creating | SyncStatus::Committing | SyncStatus::Deleting => STATUS_PENDING,
        SyncStatus::Synced => STATUS_SYNCED,
        SyncStatus::Modified => STATUS_MODIFIED,
        SyncStatus::CreateFailed(_) | SyncStatus::Unsynced(_) => STATUS_FAILED,
    }
}

// ============================================================================
// UI Colors (egui)
// ============================================================================

pub mod ui {
    use bevy_egui::egui;

    /// Green "running" stream indicator
    pub const STREAM_RUNNING: egui::Color32 = egui::Color32::from_rgb(100, 200, 100);

    /// Light grey for label text
    pub const LABEL_TEXT: egui::Color32 = egui::Color32::LIGHT_GRAY;

    /// Grey for help/hint text
    pub const HINT_TEXT: egui::Color32 = egui::Color32::GRAY;

    /// Red for error messages
    pub const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(230, 90, 90);

    /// Amber for non-error notices
    pub const NOTICE_TEXT: egui::Color32 = egui::Color32::from_rgb(230, 180, 60);
}
