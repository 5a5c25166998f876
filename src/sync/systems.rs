use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::tasks::AsyncComputeTaskPool;
use futures_lite::future;

use crate::config::{AppConfig, AppConfigData, BackendSettingsChanged};
use crate::overlay::OverlayStore;
use crate::surface::SurfaceMetrics;

use super::messages::SyncCommand;
use super::outbox::SyncOutbox;
use super::protocol::{execute, SyncRequest};
use super::remote::{HttpRemoteStore, RemoteStore};
use super::state::{RemoteStoreHandle, SyncFeedback, SyncTask};

fn spawn_request(commands: &mut Commands, remote: Arc<dyn RemoteStore>, request: SyncRequest) {
    debug!("Sending {:?} request for {:?}", request.action(), request.key());
    let task_pool = AsyncComputeTaskPool::get();
    let task = task_pool.spawn(async move { execute(remote.as_ref(), request) });
    commands.spawn(SyncTask(task));
}

fn http_remote_store(data: &AppConfigData) -> Arc<dyn RemoteStore> {
    let base_url = data.effective_api_base_url();
    info!("Using overlay store at {}", base_url);
    Arc::new(HttpRemoteStore::new(
        &base_url,
        Duration::from_secs(data.request_timeout_secs),
    ))
}

/// Startup system to point the remote store at the configured backend
pub fn connect_remote_store(config: Res<AppConfig>, mut remote: ResMut<RemoteStoreHandle>) {
    remote.0 = http_remote_store(&config.data);
}

/// System to switch backends after the settings changed, then reload the list
pub fn reconnect_remote_store(
    mut events: MessageReader<BackendSettingsChanged>,
    config: Res<AppConfig>,
    mut remote: ResMut<RemoteStoreHandle>,
    mut sync_commands: MessageWriter<SyncCommand>,
) {
    events.clear();
    remote.0 = http_remote_store(&config.data);
    sync_commands.write(SyncCommand::Refresh);
}

/// Startup system to load the initial overlay list
pub fn request_initial_listing(mut sync_commands: MessageWriter<SyncCommand>) {
    sync_commands.write(SyncCommand::Refresh);
}

/// System to turn sync commands into remote requests
pub fn dispatch_sync_commands(
    mut commands: Commands,
    mut events: MessageReader<SyncCommand>,
    mut outbox: ResMut<SyncOutbox>,
    mut store: ResMut<OverlayStore>,
    remote: Res<RemoteStoreHandle>,
) {
    for event in events.read() {
        if let Some(request) = outbox.submit(&mut store, event.clone()) {
            spawn_request(&mut commands, remote.0.clone(), request);
        }
    }
}

/// System to poll in-flight requests and reconcile their responses
pub fn poll_sync_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut SyncTask)>,
    mut outbox: ResMut<SyncOutbox>,
    mut store: ResMut<OverlayStore>,
    mut feedback: ResMut<SyncFeedback>,
    metrics: Res<SurfaceMetrics>,
    remote: Res<RemoteStoreHandle>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        let Some(response) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        commands.entity(entity).despawn();

        let completion = outbox.complete(&mut store, response, metrics.size());
        if let Some(failure) = completion.reconciled.failure {
            feedback.error(failure.to_string());
        }
        let assumed = completion.reconciled.notices.len();
        if assumed > 0 {
            feedback.notice(format!(
                "{} overlay(s) had no unit tag and no pixel-sized field; treated as percent",
                assumed
            ));
        }
        if let Some(request) = completion.next {
            spawn_request(&mut commands, remote.0.clone(), request);
        }
    }
}
