//! The rendering surface: a fixed-aspect stand-in for the video with overlays painted on top.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::AppConfig;
use crate::constants::DEFAULT_SURFACE_ASPECT_RATIO;
use crate::interaction::{handle_rect, InteractionMachine};
use crate::overlay::{Overlay, OverlayKind, OverlayStore};
use crate::surface::SurfaceMetrics;
use crate::theme;

const OVERLAY_FONT_SIZE: f32 = 16.0;
const OVERLAY_PADDING: f32 = 4.0;

/// Largest surface of the given aspect ratio that fits `available`, capped at `max_width`.
pub fn surface_size(available: egui::Vec2, max_width: f32, aspect_ratio: f32) -> egui::Vec2 {
    let aspect_ratio = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        DEFAULT_SURFACE_ASPECT_RATIO
    };

    let mut width = available.x.min(max_width).max(0.0);
    let mut height = width / aspect_ratio;
    if height > available.y {
        height = available.y.max(0.0);
        width = height * aspect_ratio;
    }
    egui::vec2(width, height)
}

fn offset(v: Vec2) -> egui::Vec2 {
    egui::vec2(v.x, v.y)
}

fn paint_overlay(
    painter: &egui::Painter,
    origin: egui::Pos2,
    surface: Vec2,
    overlay: &Overlay,
    handle_px: f32,
    highlighted: bool,
) {
    let (min, max) = overlay.geometry.rect_px(surface);
    let rect = egui::Rect::from_min_max(origin + offset(min), origin + offset(max));

    match overlay.kind {
        OverlayKind::Text => {
            painter.rect_filled(rect, 2.0, theme::OVERLAY_FILL);
            let galley = painter.layout(
                overlay.content.clone(),
                egui::FontId::proportional(OVERLAY_FONT_SIZE),
                theme::OVERLAY_TEXT,
                (rect.width() - 2.0 * OVERLAY_PADDING).max(1.0),
            );
            painter
                .with_clip_rect(rect)
                .galley(rect.min + egui::vec2(OVERLAY_PADDING, OVERLAY_PADDING), galley, theme::OVERLAY_TEXT);
        }
        OverlayKind::Image => {
            // Images are not fetched; the URL stands in for the picture
            painter.rect_filled(rect, 2.0, theme::IMAGE_PLACEHOLDER);
            let galley = painter.layout(
                format!("🖼 {}", overlay.content),
                egui::FontId::proportional(OVERLAY_FONT_SIZE * 0.75),
                theme::ui::LABEL_TEXT,
                (rect.width() - 2.0 * OVERLAY_PADDING).max(1.0),
            );
            painter
                .with_clip_rect(rect)
                .galley(rect.min + egui::vec2(OVERLAY_PADDING, OVERLAY_PADDING), galley, theme::ui::LABEL_TEXT);
        }
    }

    let border = if highlighted {
        egui::Stroke::new(2.0, theme::GESTURE_HIGHLIGHT)
    } else {
        egui::Stroke::new(1.0, theme::status_color(&overlay.status))
    };
    painter.rect_stroke(rect, 2.0, border, egui::StrokeKind::Inside);

    let (handle_min, handle_max) = handle_rect(overlay.geometry, surface, handle_px);
    let handle = egui::Rect::from_min_max(origin + offset(handle_min), origin + offset(handle_max));
    painter.rect_filled(handle, 1.0, theme::RESIZE_HANDLE);
}

/// Central panel hosting the surface. Records the laid-out size for percent math.
pub fn surface_view_ui(
    mut contexts: EguiContexts,
    config: Res<AppConfig>,
    mut metrics: ResMut<SurfaceMetrics>,
    store: Res<OverlayStore>,
    machine: Res<InteractionMachine>,
) -> Result {
    egui::CentralPanel::default().show(contexts.ctx_mut()?, |ui| {
        let size = surface_size(
            ui.available_size(),
            config.data.surface_max_width,
            config.data.surface_aspect_ratio,
        );

        ui.vertical_centered(|ui| {
            let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
            metrics.observe(
                Vec2::new(rect.min.x, rect.min.y),
                Vec2::new(rect.width(), rect.height()),
            );

            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, theme::SURFACE_BACKGROUND);
            painter.rect_stroke(
                rect,
                0.0,
                egui::Stroke::new(1.0, theme::SURFACE_FRAME),
                egui::StrokeKind::Outside,
            );

            let surface = metrics.size();
            let target = machine.gesture().target();
            for overlay in store.iter() {
                paint_overlay(
                    &painter,
                    rect.min,
                    surface,
                    overlay,
                    config.data.resize_handle_px,
                    target == Some(overlay.key),
                );
            }

            if store.is_empty() {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "No overlays yet",
                    egui::FontId::proportional(14.0),
                    theme::ui::HINT_TEXT,
                );
            }
        });
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_capped_by_max_width() {
        let size = surface_size(egui::vec2(1200.0, 900.0), 800.0, 16.0 / 9.0);
        assert_eq!(size.x, 800.0);
        assert!((size.y - 450.0).abs() < 0.01);
    }

    #[test]
    fn test_surface_size_shrinks_to_width() {
        let size = surface_size(egui::vec2(640.0, 900.0), 800.0, 16.0 / 9.0);
        assert_eq!(size.x, 640.0);
        assert!((size.y - 360.0).abs() < 0.01);
    }

    #[test]
    fn test_surface_size_limited_by_height() {
        let size = surface_size(egui::vec2(800.0, 225.0), 800.0, 16.0 / 9.0);
        assert_eq!(size.y, 225.0);
        assert!((size.x - 400.0).abs() < 0.01);
    }

    #[test]
    fn test_surface_size_bad_aspect_uses_default() {
        let size = surface_size(egui::vec2(800.0, 900.0), 800.0, 0.0);
        assert!((size.y - 450.0).abs() < 0.01);
    }
}
