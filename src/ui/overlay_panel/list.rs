//! Overlay rows with their actions and the inline editor.

use bevy_egui::egui;

use crate::overlay::{Overlay, OverlayKind, OverlayStore, SyncStatus};
use crate::theme;

use super::{InlineEdit, PanelAction};

const CONTENT_PREVIEW_CHARS: usize = 28;

fn preview(content: &str) -> String {
    if content.chars().count() > CONTENT_PREVIEW_CHARS {
        let head: String = content.chars().take(CONTENT_PREVIEW_CHARS - 1).collect();
        format!("{}…", head)
    } else {
        content.to_string()
    }
}

fn render_row(ui: &mut egui::Ui, overlay: &Overlay, actions: &mut Vec<PanelAction>) {
    let deleting = overlay.status == SyncStatus::Deleting;
    let key = overlay.key;

    ui.horizontal(|ui| {
        let icon = match overlay.kind {
            OverlayKind::Text => "T",
            OverlayKind::Image => "🖼",
        };
        ui.label(egui::RichText::new(icon).weak());
        ui.label(egui::RichText::new(preview(&overlay.content)).size(14.0))
            .on_hover_text(&overlay.content);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if overlay.status.is_pending() {
                ui.spinner();
            }
            let status = ui.label(
                egui::RichText::new(overlay.status.label())
                    .size(11.0)
                    .color(theme::status_color(&overlay.status)),
            );
            if let Some(error) = overlay.status.error() {
                status.on_hover_text(error);
            }
        });
    });

    let g = overlay.geometry;
    ui.label(
        egui::RichText::new(format!(
            "at {:.2}%, {:.2}%  ·  {:.2}% × {:.2}%",
            g.x, g.y, g.width, g.height
        ))
        .size(11.0)
        .color(theme::ui::HINT_TEXT),
    );

    ui.add_enabled_ui(!deleting, |ui| {
        ui.horizontal(|ui| {
            if matches!(overlay.status, SyncStatus::CreateFailed(_)) && ui.small_button("Retry").clicked() {
                actions.push(PanelAction::Retry(key));
            }
            if ui.small_button("Move right").clicked() {
                actions.push(PanelAction::MoveRight(key));
            }
            if ui.small_button("Edit").clicked() {
                actions.push(PanelAction::BeginEdit(key));
            }
            if ui.small_button("Delete").clicked() {
                actions.push(PanelAction::Delete(key));
            }
        });
    });
}

fn render_editor(ui: &mut egui::Ui, edit: &mut InlineEdit, actions: &mut Vec<PanelAction>) {
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::symmetric(6, 6))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label("Type:");
                egui::ComboBox::from_id_salt(("edit_kind", edit.key.0))
                    .selected_text(edit.kind.display_name())
                    .show_ui(ui, |ui| {
                        for kind in OverlayKind::all() {
                            ui.selectable_value(&mut edit.kind, *kind, kind.display_name());
                        }
                    });
            });
            ui.add(egui::TextEdit::singleline(&mut edit.content).desired_width(f32::INFINITY));

            egui::Grid::new(("edit_geometry", edit.key.0))
                .num_columns(4)
                .spacing([6.0, 4.0])
                .show(ui, |ui| {
                    for (label, value) in [("X", &mut edit.geometry.x), ("Y", &mut edit.geometry.y)] {
                        ui.label(label);
                        ui.add(egui::DragValue::new(value).speed(0.25).range(0.0..=100.0).suffix("%"));
                    }
                    ui.end_row();
                    for (label, value) in [
                        ("W", &mut edit.geometry.width),
                        ("H", &mut edit.geometry.height),
                    ] {
                        ui.label(label);
                        ui.add(egui::DragValue::new(value).speed(0.25).range(0.0..=100.0).suffix("%"));
                    }
                    ui.end_row();
                });

            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() {
                    actions.push(PanelAction::ApplyEdit);
                }
                if ui.button("Cancel").clicked() {
                    actions.push(PanelAction::CancelEdit);
                }
            });

            if let Some(error) = &edit.error {
                ui.colored_label(theme::ui::ERROR_TEXT, error);
            }
        });
}

/// Renders every overlay in render order, with the inline editor under the edited row.
pub fn render_overlay_list(
    ui: &mut egui::Ui,
    store: &OverlayStore,
    editing: &mut Option<InlineEdit>,
    actions: &mut Vec<PanelAction>,
) {
    if store.is_empty() {
        ui.label(egui::RichText::new("No overlays").weak().italics());
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for overlay in store.iter() {
                egui::Frame::new()
                    .inner_margin(egui::Margin::symmetric(4, 4))
                    .show(ui, |ui| {
                        render_row(ui, overlay, actions);
                        if let Some(edit) = editing.as_mut().filter(|e| e.key == overlay.key) {
                            ui.add_space(4.0);
                            render_editor(ui, edit, actions);
                        }
                    });
                ui.separator();
            }
        });
}
