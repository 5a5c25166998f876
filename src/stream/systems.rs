use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::tasks::AsyncComputeTaskPool;
use futures_lite::future;

use crate::config::{AppConfig, AppConfigData, BackendSettingsChanged};

use super::client::StreamClient;
use super::state::{
    StreamClientHandle, StreamCommand, StreamPhase, StreamReply, StreamState, StreamTask,
};

fn spawn_health_check(commands: &mut Commands, state: &mut StreamState, client: &StreamClientHandle) {
    if state.health_pending {
        return;
    }
    state.health_pending = true;
    let client = client.0.clone();
    let task_pool = AsyncComputeTaskPool::get();
    let task = task_pool.spawn(async move { StreamReply::Health(client.health()) });
    commands.spawn(StreamTask(task));
}

fn stream_client(data: &AppConfigData) -> Arc<StreamClient> {
    Arc::new(StreamClient::new(
        &data.effective_api_base_url(),
        Duration::from_secs(data.request_timeout_secs),
    ))
}

/// Startup system to build stream slots and the client from config
pub fn init_streams(
    mut commands: Commands,
    config: Res<AppConfig>,
    mut state: ResMut<StreamState>,
    mut client: ResMut<StreamClientHandle>,
) {
    *state = StreamState::new(&config.data.streams, config.data.health_poll_secs);
    client.0 = stream_client(&config.data);
    spawn_health_check(&mut commands, &mut state, &client);
}

/// System to switch backends after the settings changed
pub fn reconnect_stream_client(
    mut commands: Commands,
    mut events: MessageReader<BackendSettingsChanged>,
    config: Res<AppConfig>,
    mut state: ResMut<StreamState>,
    mut client: ResMut<StreamClientHandle>,
) {
    events.clear();
    client.0 = stream_client(&config.data);
    state
        .health_timer
        .set_duration(Duration::from_secs(config.data.health_poll_secs.max(1)));
    spawn_health_check(&mut commands, &mut state, &client);
}

/// System to run operator stream actions
pub fn handle_stream_commands(
    mut commands: Commands,
    mut events: MessageReader<StreamCommand>,
    mut state: ResMut<StreamState>,
    client: Res<StreamClientHandle>,
) {
    let task_pool = AsyncComputeTaskPool::get();
    for event in events.read() {
        match *event {
            StreamCommand::Start(index) => {
                let Some(slot) = state.slot_mut(index) else {
                    continue;
                };
                if slot.phase.is_busy() {
                    continue;
                }
                slot.phase = StreamPhase::Starting;
                let rtsp_url = slot.rtsp_url.trim().to_string();
                let target = slot.target.clone();
                info!("Starting stream {} from {}", target, rtsp_url);

                let client = client.0.clone();
                let task = task_pool.spawn(async move {
                    StreamReply::Started {
                        slot: index,
                        result: client.start(&rtsp_url, &target),
                    }
                });
                commands.spawn(StreamTask(task));
            }
            StreamCommand::Stop(index) => {
                let Some(slot) = state.slot_mut(index) else {
                    continue;
                };
                if slot.phase.is_busy() {
                    continue;
                }
                let previous = std::mem::replace(&mut slot.phase, StreamPhase::Stopping);
                info!("Stopping stream {}", slot.target);

                let client = client.0.clone();
                let task = task_pool.spawn(async move {
                    StreamReply::Stopped {
                        slot: index,
                        previous,
                        result: client.stop(),
                    }
                });
                commands.spawn(StreamTask(task));
            }
            StreamCommand::OpenPlayer(index) => {
                let Some(slot) = state.slot_mut(index) else {
                    continue;
                };
                let url = slot.playable_url.trim().to_string();
                if url.is_empty() {
                    continue;
                }
                if let Err(e) = open::that(&url) {
                    warn!("Failed to open {}: {}", url, e);
                    state.status_message = Some(format!("Could not open {}: {}", url, e));
                }
            }
        }
    }
}

/// System to poll backend health periodically
pub fn poll_health(
    mut commands: Commands,
    time: Res<Time>,
    mut state: ResMut<StreamState>,
    client: Res<StreamClientHandle>,
) {
    if state.health_timer.tick(time.delta()).just_finished() {
        spawn_health_check(&mut commands, &mut state, &client);
    }
}

/// System to poll stream tasks
pub fn poll_stream_tasks(
    mut commands: Commands,
    mut state: ResMut<StreamState>,
    mut tasks: Query<(Entity, &mut StreamTask)>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(reply) = future::block_on(future::poll_once(&mut task.0)) {
            match reply {
                StreamReply::Started { slot, result } => state.apply_start(slot, result),
                StreamReply::Stopped {
                    slot,
                    previous,
                    result,
                } => state.apply_stop(slot, previous, result),
                StreamReply::Health(health) => state.apply_health(health),
            }
            commands.entity(entity).despawn();
        }
    }
}
