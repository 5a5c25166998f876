//! Pointer-driven drag and resize of overlays.
//!
//! ## Module Structure
//!
//! - [`state`] - Gesture state machine (`Idle`, `Dragging`, `Resizing`)
//! - [`geometry`] - Drag/resize arithmetic in surface pixels and percent
//! - [`hit_detection`] - Which overlay part a press landed on
//! - [`systems`] - egui pointer input adapter

mod geometry;
mod hit_detection;
mod state;
mod systems;


pub use hit_detection::handle_rect;
pub use state::InteractionMachine;
pub use systems::drive_gestures;

use bevy::prelude::*;

use crate::config::{AppConfig, ConfigLoaded};

/// Startup system to pick up the configured minimum overlay size
fn apply_configured_min_size(config: Res<AppConfig>, mut machine: ResMut<InteractionMachine>) {
    machine.set_min_size_px(config.data.min_overlay_px);
}

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InteractionMachine>()
            .add_systems(Startup, apply_configured_min_size.after(ConfigLoaded));
    }
}
