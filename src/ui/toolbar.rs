use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::AppConfig;
use crate::sync::{SyncFeedback, SyncOutbox};
use crate::theme;

use super::settings_dialog::SettingsDialogState;

/// Main toolbar showing the app title, sync activity and settings
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    outbox: Res<SyncOutbox>,
    config: Res<AppConfig>,
    mut settings: ResMut<SettingsDialogState>,
) -> Result {
    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Overlaycast").size(16.0).strong());
                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                let in_flight = outbox.in_flight_count();
                if in_flight > 0 {
                    ui.spinner();
                    ui.label(egui::RichText::new(format!("Syncing {}", in_flight)).size(12.0));
                } else {
                    ui.label(
                        egui::RichText::new("All changes sent")
                            .size(12.0)
                            .color(theme::ui::HINT_TEXT),
                    );
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add(egui::Button::new("Settings").min_size(egui::vec2(0.0, 24.0)))
                        .clicked()
                    {
                        settings.load_from_config(&config);
                        settings.is_open = true;
                    }
                    ui.label(
                        egui::RichText::new(config.data.effective_api_base_url())
                            .size(11.0)
                            .color(theme::ui::HINT_TEXT),
                    );
                });
            });
        });
    Ok(())
}

/// Bottom bar listing recent sync failures and notices
pub fn sync_feedback_ui(mut contexts: EguiContexts, mut feedback: ResMut<SyncFeedback>) -> Result {
    if feedback.is_empty() {
        return Ok(());
    }

    let mut dismissed = None;
    let mut clear_all = false;

    egui::TopBottomPanel::bottom("sync_feedback")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 6)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            for (index, entry) in feedback.iter().enumerate() {
                ui.horizontal(|ui| {
                    let color = if entry.is_error {
                        theme::ui::ERROR_TEXT
                    } else {
                        theme::ui::NOTICE_TEXT
                    };
                    if ui.small_button("✕").clicked() {
                        dismissed = Some(index);
                    }
                    ui.colored_label(color, &entry.message);
                });
            }
            if ui.small_button("Dismiss all").clicked() {
                clear_all = true;
            }
        });

    if clear_all {
        feedback.clear();
    } else if let Some(index) = dismissed {
        feedback.dismiss(index);
    }
    Ok(())
}
