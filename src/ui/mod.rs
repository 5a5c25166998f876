mod notifications;
mod overlay_panel;
mod settings_dialog;
mod stream_panel;
mod surface_view;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::ConfigResetNotification;
use crate::interaction::drive_gestures;

/// Whether any modal dialog is open. `drive_gestures` ignores presses on the
/// surface while it is set.
#[derive(Resource, Default)]
pub struct DialogState {
    /// True when any modal dialog is open that should block surface input
    pub any_modal_open: bool,
}

/// System to aggregate all dialog open states into a single resource.
/// Runs in First schedule before input handlers.
fn update_dialog_state(
    settings: Res<settings_dialog::SettingsDialogState>,
    config_reset: Res<ConfigResetNotification>,
    mut dialog_state: ResMut<DialogState>,
) {
    dialog_state.any_modal_open = settings.is_open || config_reset.show;
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            .init_resource::<overlay_panel::OverlayPanelState>()
            .init_resource::<settings_dialog::SettingsDialogState>()
            // Side panels must render first so top panels fit between them
            // Use chain() to enforce ordering
            .add_systems(
                EguiPrimaryContextPass,
                (
                    // First: side panels
                    overlay_panel::overlay_panel_ui,
                    stream_panel::stream_panel_ui,
                    // Second: top/bottom bars (after side panels)
                    toolbar::toolbar_ui,
                    toolbar::sync_feedback_ui,
                    // Third: gestures, then the surface in the remaining space
                    drive_gestures,
                    surface_view::surface_view_ui,
                )
                    .chain(),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    // Last: dialogs/overlays
                    notifications::config_reset_notification_ui,
                    settings_dialog::settings_dialog_ui,
                )
                    .after(surface_view::surface_view_ui),
            )
            // Update dialog state at the start of each frame
            .add_systems(First, update_dialog_state);
    }
}
