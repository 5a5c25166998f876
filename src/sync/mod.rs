//! Synchronization of the local overlay store with the remote store.
//!
//! Local edits are applied optimistically and committed in the background. Responses
//! are reconciled on the main thread, never on the task that received them.
//!
//! ## Module Structure
//!
//! - [`remote`] - `RemoteStore` trait and its HTTP implementation
//! - [`protocol`] - Request preparation, execution and reconciliation
//! - [`outbox`] - One in-flight request per overlay, parked follow-ups
//! - [`messages`] - `SyncCommand` message
//! - `state` - Resources and task component
//! - `systems` - Dispatch and polling systems

mod messages;
mod outbox;
mod protocol;
mod remote;
mod state;
mod systems;

#[cfg(test)]
mod tests;

pub use messages::SyncCommand;
pub use outbox::SyncOutbox;
pub use state::SyncFeedback;

use bevy::prelude::*;

use crate::config::{BackendSettingsChanged, ConfigLoaded};

pub struct SyncPlugin;

impl Plugin for SyncPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<state::RemoteStoreHandle>()
            .init_resource::<SyncOutbox>()
            .init_resource::<SyncFeedback>()
            .add_message::<SyncCommand>()
            .add_systems(
                Startup,
                (systems::connect_remote_store, systems::request_initial_listing)
                    .chain()
                    .after(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    systems::reconnect_remote_store.run_if(on_message::<BackendSettingsChanged>),
                    systems::dispatch_sync_commands.run_if(on_message::<SyncCommand>),
                    systems::poll_sync_tasks,
                )
                    .chain(),
            );
    }
}
