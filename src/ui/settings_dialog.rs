use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::api::parse_base;
use crate::config::{AppConfig, AppConfigData, BackendSettingsChanged, SaveConfigRequest};
use crate::interaction::InteractionMachine;
use crate::surface::SurfaceMetrics;
use crate::theme;

/// State for the settings dialog
#[derive(Resource, Default)]
pub struct SettingsDialogState {
    /// Whether the dialog is open
    pub is_open: bool,
    /// Edited copy of the config, applied on save
    pub edited: AppConfigData,
    /// Validation failure from the last save attempt
    pub error: Option<String>,
}

impl SettingsDialogState {
    /// Initialize the dialog state from current config
    pub fn load_from_config(&mut self, config: &AppConfig) {
        self.edited = config.data.clone();
        self.error = None;
    }

    pub fn has_changes(&self, config: &AppConfig) -> bool {
        self.edited != config.data
    }
}

/// True when the clients talking to the backend need rebuilding.
fn backend_settings_changed(old: &AppConfigData, new: &AppConfigData) -> bool {
    old.api_base_url != new.api_base_url
        || old.request_timeout_secs != new.request_timeout_secs
        || old.health_poll_secs != new.health_poll_secs
}

fn validate(data: &AppConfigData) -> Result<(), String> {
    parse_base(data.api_base_url.trim())
        .map_err(|e| format!("Invalid backend URL: {}", e))?;
    if data.fallback_surface_width < 1.0 || data.fallback_surface_height < 1.0 {
        return Err("Fallback surface size must be at least 1x1".to_string());
    }
    Ok(())
}

/// Renders the settings dialog
pub fn settings_dialog_ui(
    mut contexts: EguiContexts,
    mut dialog_state: ResMut<SettingsDialogState>,
    mut config: ResMut<AppConfig>,
    mut machine: ResMut<InteractionMachine>,
    mut metrics: ResMut<SurfaceMetrics>,
    mut save_events: MessageWriter<SaveConfigRequest>,
    mut backend_events: MessageWriter<BackendSettingsChanged>,
) -> Result {
    if !dialog_state.is_open {
        return Ok(());
    }

    let mut should_close = false;
    let mut should_save = false;
    let has_changes = dialog_state.has_changes(&config);
    let state = &mut *dialog_state;

    egui::Window::new("Settings")
        .collapsible(false)
        .resizable(true)
        .min_width(400.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.heading("Application Settings");
            ui.add_space(12.0);

            // Backend section
            ui.group(|ui| {
                ui.label(egui::RichText::new("Backend").strong());
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.label("API URL:");
                    ui.add(
                        egui::TextEdit::singleline(&mut state.edited.api_base_url)
                            .desired_width(260.0),
                    );
                });
                ui.horizontal(|ui| {
                    ui.label("Request timeout:");
                    ui.add(
                        egui::DragValue::new(&mut state.edited.request_timeout_secs)
                            .range(1..=120)
                            .suffix(" s"),
                    );
                    ui.add_space(12.0);
                    ui.label("Health check every:");
                    ui.add(
                        egui::DragValue::new(&mut state.edited.health_poll_secs)
                            .range(1..=300)
                            .suffix(" s"),
                    );
                });

                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(format!(
                        "The {} environment variable overrides the URL when set.",
                        crate::constants::API_BASE_URL_ENV
                    ))
                    .weak()
                    .small(),
                );
            });

            ui.add_space(12.0);

            // Surface section
            ui.group(|ui| {
                ui.label(egui::RichText::new("Surface").strong());
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.label("Fallback size:");
                    ui.add(
                        egui::DragValue::new(&mut state.edited.fallback_surface_width)
                            .range(1.0..=7680.0)
                            .suffix(" px"),
                    );
                    ui.label("×");
                    ui.add(
                        egui::DragValue::new(&mut state.edited.fallback_surface_height)
                            .range(1.0..=4320.0)
                            .suffix(" px"),
                    );
                });
                ui.horizontal(|ui| {
                    ui.label("Max width:");
                    ui.add(
                        egui::DragValue::new(&mut state.edited.surface_max_width)
                            .range(160.0..=7680.0)
                            .suffix(" px"),
                    );
                });
                ui.horizontal(|ui| {
                    ui.label("Resize handle:");
                    ui.add(
                        egui::DragValue::new(&mut state.edited.resize_handle_px)
                            .range(4.0..=48.0)
                            .suffix(" px"),
                    );
                    ui.add_space(12.0);
                    ui.label("Minimum overlay size:");
                    ui.add(
                        egui::DragValue::new(&mut state.edited.min_overlay_px)
                            .range(1.0..=200.0)
                            .suffix(" px"),
                    );
                });
            });

            if let Some(error) = &state.error {
                ui.add_space(8.0);
                ui.colored_label(theme::ui::ERROR_TEXT, error);
            }

            ui.add_space(16.0);

            // Action buttons
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(has_changes, egui::Button::new("Save"))
                    .clicked()
                {
                    should_save = true;
                }

                if ui.button("Cancel").clicked() {
                    should_close = true;
                }
            });
        });

    // Handle save
    if should_save {
        let mut edited = state.edited.clone();
        edited.api_base_url = edited.api_base_url.trim().to_string();

        match validate(&edited) {
            Ok(()) => {
                let backend_changed = backend_settings_changed(&config.data, &edited);
                machine.set_min_size_px(edited.min_overlay_px);
                metrics.set_fallback(Vec2::new(
                    edited.fallback_surface_width,
                    edited.fallback_surface_height,
                ));

                config.data = edited;
                config.dirty = true;
                save_events.write(SaveConfigRequest);
                if backend_changed {
                    info!("Backend settings changed, reconnecting");
                    backend_events.write(BackendSettingsChanged);
                }
                should_close = true;
            }
            Err(e) => state.error = Some(e),
        }
    }

    // Handle close
    if should_close {
        state.is_open = false;
        // Reset state from config
        state.load_from_config(&config);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_change_detection() {
        let old = AppConfigData::default();

        let mut surface_only = old.clone();
        surface_only.resize_handle_px = 20.0;
        assert!(!backend_settings_changed(&old, &surface_only));

        let mut new_url = old.clone();
        new_url.api_base_url = "http://10.0.0.2:5000".into();
        assert!(backend_settings_changed(&old, &new_url));

        let mut new_timeout = old.clone();
        new_timeout.request_timeout_secs = 30;
        assert!(backend_settings_changed(&old, &new_timeout));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let data = AppConfigData {
            api_base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(validate(&data).is_err());
        assert!(validate(&AppConfigData::default()).is_ok());
    }

    #[test]
    fn test_has_changes_tracks_edits() {
        let config = AppConfig::default();
        let mut state = SettingsDialogState::default();
        state.load_from_config(&config);
        assert!(!state.has_changes(&config));

        state.edited.min_overlay_px = 24.0;
        assert!(state.has_changes(&config));
    }
}
