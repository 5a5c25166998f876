//! Overlay record as exchanged with the remote store.
//!
//! Example JSON:
//! ```json
//! {
//!   "_id": "66f0c2...",
//!   "type": "text",
//!   "content": "Overlay text",
//!   "x": 1.25, "y": 2.22, "width": 18.75, "height": 8.89,
//!   "coord_unit": "percent",
//!   "created_at": 1727000000.0
//! }
//! ```
//!
//! Older records may lack `coord_unit` and carry pixel values; those are resolved by
//! [`super::normalize`].

use serde::{Deserialize, Serialize};

use super::model::{OverlayId, OverlayKind};

/// Unit marker stored next to the geometry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordUnit {
    Percent,
    /// Anything else a backend may have written; treated like a missing tag.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawOverlay {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OverlayId>,
    #[serde(rename = "type", default)]
    pub kind: OverlayKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord_unit: Option<CoordUnit>,
    /// Fields owned by the store (timestamps and the like), kept for round-trips.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawOverlay {
    pub fn is_percent_tagged(&self) -> bool {
        self.coord_unit == Some(CoordUnit::Percent)
    }

    /// Label used in log lines.
    pub fn describe(&self) -> String {
        match &self.id {
            Some(id) => id.to_string(),
            None => format!("<unsaved {:?}>", self.content),
        }
    }
}
