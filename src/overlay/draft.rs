use bevy::prelude::*;

use crate::constants::{
    DEFAULT_DRAFT_CONTENT, DEFAULT_DRAFT_HEIGHT, DEFAULT_DRAFT_WIDTH, DEFAULT_DRAFT_X,
    DEFAULT_DRAFT_Y,
};

use super::model::{Geometry, OverlayKind};
use super::store::OverlayDraft;

/// Form state for the "New overlay" panel. Geometry fields are percent.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct DraftForm {
    pub kind: OverlayKind,
    pub content: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for DraftForm {
    fn default() -> Self {
        Self {
            kind: OverlayKind::Text,
            content: DEFAULT_DRAFT_CONTENT.to_string(),
            x: DEFAULT_DRAFT_X,
            y: DEFAULT_DRAFT_Y,
            width: DEFAULT_DRAFT_WIDTH,
            height: DEFAULT_DRAFT_HEIGHT,
        }
    }
}

impl DraftForm {
    /// Build a draft from the form, clamping geometry into `[0, 100]`.
    pub fn to_draft(&self) -> Result<OverlayDraft, String> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(match self.kind {
                OverlayKind::Text => "Overlay text cannot be empty".to_string(),
                OverlayKind::Image => "Image overlays need an image URL".to_string(),
            });
        }

        Ok(OverlayDraft {
            kind: self.kind,
            content: content.to_string(),
            geometry: Geometry::new(self.x, self.y, self.width, self.height)
                .clamped()
                .rounded(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_form() {
        let form = DraftForm::default();
        assert_eq!(form.kind, OverlayKind::Text);
        assert_eq!(form.content, "Overlay text");
        assert_eq!(form.x, 1.25);
        assert_eq!(form.height, 8.89);
    }

    #[test]
    fn test_to_draft_clamps_and_trims() {
        let form = DraftForm {
            content: "  Live  ".into(),
            x: -3.0,
            y: 150.0,
            width: 20.005,
            ..default()
        };
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.content, "Live");
        assert_eq!(draft.geometry.x, 0.0);
        assert_eq!(draft.geometry.y, 100.0);
        assert!((draft.geometry.width - 20.0).abs() < 0.011);
    }

    #[test]
    fn test_to_draft_rejects_empty_content() {
        let form = DraftForm {
            kind: OverlayKind::Image,
            content: "   ".into(),
            ..default()
        };
        assert!(form.to_draft().is_err());
    }
}
