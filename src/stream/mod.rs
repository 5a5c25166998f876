//! Stream lifecycle control and backend health.
//!
//! Two stream slots can each be started from an RTSP source; the backend answers with
//! an HLS playlist URL, which can be handed to the system's media player. Health is
//! polled on a timer.

mod client;
mod state;
mod systems;

pub use client::BackendHealth;
pub use state::{StreamCommand, StreamPhase, StreamSlot, StreamState};

use bevy::prelude::*;

use crate::config::{BackendSettingsChanged, ConfigLoaded};

pub struct StreamPlugin;

impl Plugin for StreamPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StreamState>()
            .init_resource::<state::StreamClientHandle>()
            .add_message::<StreamCommand>()
            .add_systems(Startup, systems::init_streams.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    systems::reconnect_stream_client.run_if(on_message::<BackendSettingsChanged>),
                    systems::handle_stream_commands.run_if(on_message::<StreamCommand>),
                    systems::poll_health,
                    systems::poll_stream_tasks,
                ),
            );
    }
}
