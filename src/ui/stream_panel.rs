//! Right-side panel: stream slots and backend health.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::stream::{BackendHealth, StreamCommand, StreamPhase, StreamSlot, StreamState};
use crate::theme;

fn health_line(ui: &mut egui::Ui, health: &BackendHealth) {
    ui.horizontal(|ui| {
        let (color, store) = if health.store_reachable() {
            (theme::STATUS_SYNCED, format!("store: {}", health.store_status))
        } else {
            (theme::STATUS_FAILED, format!("store: {}", health.store_status))
        };
        ui.colored_label(color, "●");
        ui.label(egui::RichText::new(store).size(12.0));
    });
    ui.horizontal(|ui| {
        let (color, text) = if health.transcoder_available {
            (theme::STATUS_SYNCED, "ffmpeg: available")
        } else {
            (theme::STATUS_FAILED, "ffmpeg: missing")
        };
        ui.colored_label(color, "●");
        ui.label(egui::RichText::new(text).size(12.0));
    });
}

fn render_slot(
    ui: &mut egui::Ui,
    index: usize,
    slot: &mut StreamSlot,
    stream_commands: &mut MessageWriter<StreamCommand>,
) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(format!("Stream {}", index + 1)).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let color = match slot.phase {
                    StreamPhase::Running { .. } => theme::ui::STREAM_RUNNING,
                    StreamPhase::Idle => theme::ui::HINT_TEXT,
                    StreamPhase::Starting | StreamPhase::Stopping => theme::STATUS_PENDING,
                };
                ui.label(egui::RichText::new(slot.phase.label()).size(11.0).color(color));
            });
        });

        ui.label(egui::RichText::new("RTSP source").size(12.0).color(theme::ui::LABEL_TEXT));
        ui.add_enabled(
            matches!(slot.phase, StreamPhase::Idle),
            egui::TextEdit::singleline(&mut slot.rtsp_url).desired_width(f32::INFINITY),
        );

        ui.horizontal(|ui| {
            let busy = slot.phase.is_busy();
            let running = matches!(slot.phase, StreamPhase::Running { .. });
            if ui
                .add_enabled(!busy && !running && !slot.rtsp_url.trim().is_empty(), egui::Button::new("Start"))
                .clicked()
            {
                stream_commands.write(StreamCommand::Start(index));
            }
            if ui
                .add_enabled(!busy && running, egui::Button::new("Stop"))
                .clicked()
            {
                stream_commands.write(StreamCommand::Stop(index));
            }
            if busy {
                ui.spinner();
            }
        });

        ui.label(egui::RichText::new("Playable URL").size(12.0).color(theme::ui::LABEL_TEXT));
        ui.add(egui::TextEdit::singleline(&mut slot.playable_url).desired_width(f32::INFINITY));
        if ui
            .add_enabled(!slot.playable_url.trim().is_empty(), egui::Button::new("Open in player"))
            .on_hover_text("Open the playlist with the system media player")
            .clicked()
        {
            stream_commands.write(StreamCommand::OpenPlayer(index));
        }
    });
}

/// Stream controls and health indicators.
pub fn stream_panel_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<StreamState>,
    mut stream_commands: MessageWriter<StreamCommand>,
) -> Result {
    egui::SidePanel::right("stream_panel")
        .default_width(240.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Streams").heading().size(18.0));
            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            let state = &mut *state;
            for (index, slot) in state.slots.iter_mut().enumerate() {
                render_slot(ui, index, slot, &mut stream_commands);
                ui.add_space(8.0);
            }

            if let Some(message) = state.status_message.clone() {
                ui.horizontal_wrapped(|ui| {
                    ui.colored_label(theme::ui::NOTICE_TEXT, message);
                    if ui.small_button("✕").clicked() {
                        state.status_message = None;
                    }
                });
            }

            ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                ui.add_space(8.0);
                health_line(ui, &state.health);
                ui.label(egui::RichText::new("Backend").strong());
            });
        });
    Ok(())
}
