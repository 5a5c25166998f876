//! Main overlay panel UI orchestration.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::overlay::{DraftForm, OverlayStore};
use crate::sync::{SyncCommand, SyncOutbox};
use crate::theme;

use super::draft::render_draft_form;
use super::list::render_overlay_list;
use super::{move_right_patch, InlineEdit, OverlayPanelState, PanelAction};

fn apply_action(
    action: PanelAction,
    panel: &mut OverlayPanelState,
    form: &DraftForm,
    store: &mut OverlayStore,
    sync_commands: &mut MessageWriter<SyncCommand>,
) {
    match action {
        PanelAction::Add => match form.to_draft() {
            Ok(draft) => {
                let key = store.insert_draft(draft);
                debug!("Added draft overlay {:?}", key);
                sync_commands.write(SyncCommand::Create(key));
                panel.form_error = None;
            }
            Err(e) => panel.form_error = Some(e),
        },
        PanelAction::Refresh => {
            sync_commands.write(SyncCommand::Refresh);
        }
        PanelAction::Retry(key) => {
            sync_commands.write(SyncCommand::Create(key));
        }
        PanelAction::Delete(key) => {
            if panel.editing.as_ref().is_some_and(|e| e.key == key) {
                panel.editing = None;
            }
            sync_commands.write(SyncCommand::Remove(key));
        }
        PanelAction::MoveRight(key) => {
            if let Some(overlay) = store.get(key) {
                sync_commands.write(SyncCommand::Commit {
                    key,
                    patch: Some(move_right_patch(overlay.geometry)),
                });
            }
        }
        PanelAction::BeginEdit(key) => {
            panel.editing = store.get(key).map(InlineEdit::from_overlay);
        }
        PanelAction::ApplyEdit => {
            if let Some(edit) = panel.editing.as_mut() {
                match edit.to_patch() {
                    Ok(patch) => {
                        sync_commands.write(SyncCommand::Commit {
                            key: edit.key,
                            patch: Some(patch),
                        });
                        panel.editing = None;
                    }
                    Err(e) => edit.error = Some(e),
                }
            }
        }
        PanelAction::CancelEdit => panel.editing = None,
    }
}

/// Left panel: draft form, refresh, and the overlay list.
pub fn overlay_panel_ui(
    mut contexts: EguiContexts,
    mut panel: ResMut<OverlayPanelState>,
    mut form: ResMut<DraftForm>,
    mut store: ResMut<OverlayStore>,
    outbox: Res<SyncOutbox>,
    mut sync_commands: MessageWriter<SyncCommand>,
) -> Result {
    // Overlay deleted elsewhere while its editor was open
    if let Some(key) = panel.editing.as_ref().map(|e| e.key)
        && !store.contains(key)
    {
        panel.editing = None;
    }

    let mut actions = Vec::new();
    let panel = &mut *panel;

    egui::SidePanel::left("overlay_panel")
        .default_width(280.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Overlays").heading().size(18.0));
            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            if let Some(action) = render_draft_form(ui, &mut form, panel.form_error.as_deref()) {
                actions.push(action);
            }

            ui.add_space(8.0);
            ui.separator();

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(format!("Saved ({})", store.len())).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let refreshing = outbox.is_listing();
                    if ui
                        .add_enabled(!refreshing, egui::Button::new("Refresh"))
                        .clicked()
                    {
                        actions.push(PanelAction::Refresh);
                    }
                    if refreshing {
                        ui.spinner();
                    }
                });
            });

            if let Some(error) = store.listing_error() {
                ui.colored_label(theme::ui::ERROR_TEXT, format!("Overlays unavailable: {}", error));
            }
            ui.add_space(4.0);

            render_overlay_list(ui, &store, &mut panel.editing, &mut actions);
        });

    for action in actions {
        apply_action(action, panel, &form, &mut store, &mut sync_commands);
    }
    Ok(())
}
