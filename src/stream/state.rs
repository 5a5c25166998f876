use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::tasks::Task;

use crate::config::StreamSource;
use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_HEALTH_POLL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    STREAM_TARGETS,
};
use crate::error::OverlayError;

use super::client::{BackendHealth, StartOutcome, StopOutcome, StreamClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamPhase {
    #[default]
    Idle,
    Starting,
    Running {
        playlist_ready: bool,
    },
    Stopping,
}

impl StreamPhase {
    pub fn label(&self) -> &'static str {
        match self {
            StreamPhase::Idle => "stopped",
            StreamPhase::Starting => "starting",
            StreamPhase::Running {
                playlist_ready: true,
            } => "running",
            StreamPhase::Running {
                playlist_ready: false,
            } => "running (waiting for playlist)",
            StreamPhase::Stopping => "stopping",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, StreamPhase::Starting | StreamPhase::Stopping)
    }
}

/// One of the two stream inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSlot {
    /// Playlist name on the backend (`stream`, `stream2`).
    pub target: String,
    pub rtsp_url: String,
    /// Where the playlist can be played from; editable, replaced on start.
    pub playable_url: String,
    pub phase: StreamPhase,
}

impl StreamSlot {
    pub fn from_source(target: &str, source: &StreamSource) -> Self {
        Self {
            target: target.to_string(),
            rtsp_url: source.rtsp_url.clone(),
            playable_url: source.hls_url.clone(),
            phase: StreamPhase::Idle,
        }
    }
}

#[derive(Resource, Debug)]
pub struct StreamState {
    pub slots: Vec<StreamSlot>,
    pub health: BackendHealth,
    /// Latest operator-facing message (already-running, missing transcoder, failures).
    pub status_message: Option<String>,
    pub health_timer: Timer,
    pub health_pending: bool,
}

impl Default for StreamState {
    fn default() -> Self {
        Self::new(&[], DEFAULT_HEALTH_POLL_SECS)
    }
}

impl StreamState {
    /// Slots are created for the known targets, paired with configured sources in order.
    pub fn new(sources: &[StreamSource], health_poll_secs: u64) -> Self {
        let slots = STREAM_TARGETS
            .iter()
            .enumerate()
            .map(|(i, target)| {
                let source = sources.get(i).cloned().unwrap_or_else(|| StreamSource::for_target(target));
                StreamSlot::from_source(target, &source)
            })
            .collect();
        Self {
            slots,
            health: BackendHealth::default(),
            status_message: None,
            health_timer: Timer::new(
                Duration::from_secs(health_poll_secs.max(1)),
                TimerMode::Repeating,
            ),
            health_pending: false,
        }
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut StreamSlot> {
        self.slots.get_mut(index)
    }

    /// Fold a start reply into the slot.
    pub fn apply_start(&mut self, index: usize, result: Result<StartOutcome, OverlayError>) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        match result {
            Ok(StartOutcome::Started {
                playable_url,
                playlist_ready,
            }) => {
                info!("Stream {} started at {}", slot.target, playable_url);
                slot.playable_url = playable_url.to_string();
                slot.phase = StreamPhase::Running { playlist_ready };
                self.status_message = (!playlist_ready).then(|| {
                    format!(
                        "Stream {} started, but the playlist is not ready yet",
                        slot.target
                    )
                });
            }
            Ok(StartOutcome::AlreadyRunning) => {
                info!("Stream {} not started: backend already busy", slot.target);
                slot.phase = StreamPhase::Idle;
                self.status_message = Some(
                    "A stream is already running on the server. Stop it first or use a backend \
                     that supports multiple simultaneous streams."
                        .to_string(),
                );
            }
            Err(e) => {
                error!("Failed to start stream {}: {}", slot.target, e);
                slot.phase = StreamPhase::Idle;
                self.status_message = Some(format!("Failed to start {}: {}", slot.target, e));
            }
        }
    }

    /// Fold a stop reply into the slot. `previous` is restored on failure.
    pub fn apply_stop(
        &mut self,
        index: usize,
        previous: StreamPhase,
        result: Result<StopOutcome, OverlayError>,
    ) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        match result {
            Ok(outcome) => {
                info!("Stream {} stopped ({:?})", slot.target, outcome);
                slot.phase = StreamPhase::Idle;
            }
            Err(e) => {
                error!("Failed to stop stream {}: {}", slot.target, e);
                slot.phase = previous;
                self.status_message = Some(format!("Failed to stop {}: {}", slot.target, e));
            }
        }
    }

    pub fn apply_health(&mut self, health: BackendHealth) {
        if !health.transcoder_available && health.store_status != "unreachable" {
            self.status_message =
                Some("ffmpeg not found on the backend PATH; streaming will fail".to_string());
        }
        self.health = health;
        self.health_pending = false;
    }
}

/// Stream endpoints used by the background tasks.
#[derive(Resource, Clone)]
pub struct StreamClientHandle(pub Arc<StreamClient>);

impl Default for StreamClientHandle {
    fn default() -> Self {
        Self(Arc::new(StreamClient::new(
            DEFAULT_API_BASE_URL,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )))
    }
}

/// Reply from a stream task
pub enum StreamReply {
    Started {
        slot: usize,
        result: Result<StartOutcome, OverlayError>,
    },
    Stopped {
        slot: usize,
        previous: StreamPhase,
        result: Result<StopOutcome, OverlayError>,
    },
    Health(BackendHealth),
}

/// Component for an in-flight stream request
#[derive(Component)]
pub struct StreamTask(pub Task<StreamReply>);

/// Message for operator stream actions
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCommand {
    Start(usize),
    Stop(usize),
    OpenPlayer(usize),
}
