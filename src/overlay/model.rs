//! Canonical in-memory overlay types.
//!
//! Everything in here is already percent-normalized. Raw records coming from the
//! remote store live in [`super::wire`] until the normalizer turns them into an
//! [`Overlay`], so "unit tag present" is carried by the type rather than by a field.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::wire::{CoordUnit, RawOverlay};

/// Local handle for an overlay, stable for the lifetime of the process.
///
/// Drafts have no remote id yet, so gestures and UI actions address overlays by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayKey(pub u64);

/// Identifier assigned by the remote store on first successful create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayId(pub String);

impl OverlayId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    #[default]
    Text,
    Image,
}

impl OverlayKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            OverlayKind::Text => "Text",
            OverlayKind::Image => "Image",
        }
    }

    pub fn all() -> &'static [OverlayKind] {
        &[OverlayKind::Text, OverlayKind::Image]
    }
}

/// Round to two decimal places of percent.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Overlay placement in percent of the rendering surface.
///
/// `x` and `width` are relative to the surface width, `y` and `height` to its height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Geometry {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn rounded(self) -> Self {
        Self {
            x: round2(self.x),
            y: round2(self.y),
            width: round2(self.width),
            height: round2(self.height),
        }
    }

    /// Top-left corner in surface pixels.
    pub fn top_left_px(&self, surface: Vec2) -> Vec2 {
        Vec2::new(self.x / 100.0 * surface.x, self.y / 100.0 * surface.y)
    }

    /// Width and height in surface pixels.
    pub fn size_px(&self, surface: Vec2) -> Vec2 {
        Vec2::new(self.width / 100.0 * surface.x, self.height / 100.0 * surface.y)
    }

    /// Pixel rectangle as (min, max) corners, y growing downwards.
    pub fn rect_px(&self, surface: Vec2) -> (Vec2, Vec2) {
        let min = self.top_left_px(surface);
        (min, min + self.size_px(surface))
    }

    /// Returns a copy with all four fields clamped to `[0, 100]`.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(0.0, 100.0),
            y: self.y.clamp(0.0, 100.0),
            width: self.width.clamp(0.0, 100.0),
            height: self.height.clamp(0.0, 100.0),
        }
    }
}

/// Where an overlay stands relative to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// Local only, never sent.
    #[default]
    Draft,
    /// Create request in flight.
    Creating,
    /// Create failed; the draft is kept until the operator retries or discards it.
    CreateFailed(String),
    /// Local state matches the last server echo.
    Synced,
    /// Changed locally since the last echo; a commit follows when the edit ends.
    Modified,
    /// A commit is in flight.
    Committing,
    /// The last commit failed; the optimistic value is still displayed.
    Unsynced(String),
    /// Delete request in flight.
    Deleting,
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::Draft => "draft",
            SyncStatus::Creating => "creating",
            SyncStatus::CreateFailed(_) => "create failed",
            SyncStatus::Synced => "synced",
            SyncStatus::Modified => "modified",
            SyncStatus::Committing => "saving",
            SyncStatus::Unsynced(_) => "unsynced",
            SyncStatus::Deleting => "deleting",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SyncStatus::CreateFailed(msg) | SyncStatus::Unsynced(msg) => Some(msg),
            _ => None,
        }
    }

    /// A request for this overlay is currently in flight.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            SyncStatus::Creating | SyncStatus::Committing | SyncStatus::Deleting
        )
    }
}

/// A placed overlay in canonical (percent) form.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub key: OverlayKey,
    pub id: Option<OverlayId>,
    pub kind: OverlayKind,
    pub content: String,
    pub geometry: Geometry,
    /// Remote fields this client does not interpret (e.g. `created_at`).
    pub extra: serde_json::Map<String, serde_json::Value>,
    pub status: SyncStatus,
    /// Bumped on every local mutation; used to drop stale commit echoes.
    pub revision: u64,
}

impl Overlay {
    pub fn is_persistent(&self) -> bool {
        self.id.is_some()
    }

    /// Wire form with the canonical unit tag, as sent on create and commit.
    pub fn to_wire(&self) -> RawOverlay {
        RawOverlay {
            id: self.id.clone(),
            kind: self.kind,
            content: self.content.clone(),
            x: self.geometry.x,
            y: self.geometry.y,
            width: self.geometry.width,
            height: self.geometry.height,
            coord_unit: Some(CoordUnit::Percent),
            extra: self.extra.clone(),
        }
    }
}

/// Explicit field edits from the UI (anything left `None` keeps its current value).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayPatch {
    pub kind: Option<OverlayKind>,
    pub content: Option<String>,
    pub geometry: Option<Geometry>,
}

impl OverlayPatch {
    pub fn geometry(geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.content.is_none() && self.geometry.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(11.111_111), 11.11);
        assert_eq!(round2(17.777_779), 17.78);
        assert_eq!(round2(95.0), 95.0);
        assert_eq!(round2(0.004), 0.0);
    }

    #[test]
    fn test_geometry_pixels() {
        let geometry = Geometry::new(10.0, 20.0, 50.0, 10.0);
        let surface = Vec2::new(800.0, 450.0);
        assert_eq!(geometry.top_left_px(surface), Vec2::new(80.0, 90.0));
        assert_eq!(geometry.size_px(surface), Vec2::new(400.0, 45.0));
        let (min, max) = geometry.rect_px(surface);
        assert_eq!(min, Vec2::new(80.0, 90.0));
        assert_eq!(max, Vec2::new(480.0, 135.0));
    }

    #[test]
    fn test_geometry_clamped() {
        let geometry = Geometry::new(-5.0, 120.0, 50.0, 101.0).clamped();
        assert_eq!(geometry, Geometry::new(0.0, 100.0, 50.0, 100.0));
    }

    #[test]
    fn test_to_wire_sets_unit_tag() {
        let overlay = Overlay {
            key: OverlayKey(1),
            id: Some(OverlayId("abc".into())),
            kind: OverlayKind::Image,
            content: "/uploads/logo.png".into(),
            geometry: Geometry::new(1.0, 2.0, 3.0, 4.0),
            extra: serde_json::Map::new(),
            status: SyncStatus::Synced,
            revision: 0,
        };
        let wire = overlay.to_wire();
        assert_eq!(wire.coord_unit, Some(CoordUnit::Percent));
        assert_eq!(wire.id, Some(OverlayId("abc".into())));
        assert_eq!(wire.kind, OverlayKind::Image);
        assert_eq!(wire.width, 3.0);
    }

    #[test]
    fn test_sync_status_pending() {
        assert!(SyncStatus::Creating.is_pending());
        assert!(SyncStatus::Committing.is_pending());
        assert!(SyncStatus::Deleting.is_pending());
        assert!(!SyncStatus::Synced.is_pending());
        assert_eq!(SyncStatus::Unsynced("x".into()).error(), Some("x"));
    }
}
