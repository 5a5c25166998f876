//! "New overlay" form.

use bevy_egui::egui;

use crate::overlay::{DraftForm, OverlayKind};
use crate::theme;

use super::PanelAction;

fn percent_field(ui: &mut egui::Ui, label: &str, value: &mut f32) {
    ui.label(label);
    ui.add(
        egui::DragValue::new(value)
            .speed(0.25)
            .range(0.0..=100.0)
            .suffix("%"),
    );
}

/// Renders the draft form. Returns `Add` when the operator submits it.
pub fn render_draft_form(
    ui: &mut egui::Ui,
    form: &mut DraftForm,
    form_error: Option<&str>,
) -> Option<PanelAction> {
    let mut action = None;

    ui.label(egui::RichText::new("New Overlay").strong());
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        ui.label("Type:");
        egui::ComboBox::from_id_salt("draft_kind")
            .selected_text(form.kind.display_name())
            .show_ui(ui, |ui| {
                for kind in OverlayKind::all() {
                    ui.selectable_value(&mut form.kind, *kind, kind.display_name());
                }
            });
    });

    let hint = match form.kind {
        OverlayKind::Text => "Overlay text",
        OverlayKind::Image => "https://example.com/logo.png",
    };
    ui.add(
        egui::TextEdit::singleline(&mut form.content)
            .hint_text(hint)
            .desired_width(f32::INFINITY),
    );

    egui::Grid::new("draft_geometry")
        .num_columns(4)
        .spacing([6.0, 4.0])
        .show(ui, |ui| {
            percent_field(ui, "X", &mut form.x);
            percent_field(ui, "Y", &mut form.y);
            ui.end_row();
            percent_field(ui, "W", &mut form.width);
            percent_field(ui, "H", &mut form.height);
            ui.end_row();
        });

    ui.add_space(4.0);
    if ui
        .add_sized([ui.available_width(), 26.0], egui::Button::new("Add Overlay"))
        .clicked()
    {
        action = Some(PanelAction::Add);
    }

    if let Some(error) = form_error {
        ui.colored_label(theme::ui::ERROR_TEXT, error);
    }

    action
}
