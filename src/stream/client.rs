//! Stream lifecycle and health endpoints of the backend.
//!
//! The backend transcodes an RTSP source into an HLS playlist. This client only starts
//! and stops that process and asks for the playlist location; playback is external.

use std::time::Duration;

use bevy::prelude::*;
use serde::Deserialize;
use url::Url;

use crate::api::{read_json, resolve, ApiEndpoint};
use crate::error::OverlayError;

const START_PATH: &str = "api/start_stream";
const STOP_PATH: &str = "api/stop_stream";
const HEALTH_PATH: &str = "api/health";

/// Body of start/stop replies. Errors come back as `{ "error": ... }`, usually with a
/// 4xx/5xx status.
#[derive(Debug, Clone, Default, Deserialize)]
struct StreamReply {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    hls_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    Started {
        playable_url: Url,
        /// False when the transcoder is running but has not written a playlist yet.
        playlist_ready: bool,
    },
    /// The backend runs a single transcoder and it is busy.
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

/// Backend health as last reported.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackendHealth {
    #[serde(rename = "ffmpeg", default)]
    pub transcoder_available: bool,
    #[serde(rename = "mongo", default = "unknown_status")]
    pub store_status: String,
}

fn unknown_status() -> String {
    "unknown".to_string()
}

impl Default for BackendHealth {
    fn default() -> Self {
        Self {
            transcoder_available: false,
            store_status: unknown_status(),
        }
    }
}

impl BackendHealth {
    /// What a failed health request is reported as.
    pub fn unreachable() -> Self {
        Self {
            transcoder_available: false,
            store_status: "unreachable".to_string(),
        }
    }

    pub fn store_reachable(&self) -> bool {
        matches!(self.store_status.as_str(), "ok" | "dev")
    }
}

fn interpret_start(base: &Url, reply: StreamReply) -> Result<StartOutcome, OverlayError> {
    if let Some(error) = reply.error {
        return Err(OverlayError::RemoteRejection(error));
    }
    match reply.status.as_deref() {
        Some("already_running") => Ok(StartOutcome::AlreadyRunning),
        Some(status @ ("started" | "started_but_no_playlist_yet")) => {
            let hls_url = reply.hls_url.ok_or_else(|| {
                OverlayError::RemoteRejection("stream started without an hls_url".into())
            })?;
            let playable_url = resolve(base, &hls_url).map_err(|e| {
                OverlayError::RemoteRejection(format!("bad hls_url {:?}: {}", hls_url, e))
            })?;
            Ok(StartOutcome::Started {
                playable_url,
                playlist_ready: status == "started",
            })
        }
        other => Err(OverlayError::RemoteRejection(format!(
            "unexpected stream status {:?}",
            other
        ))),
    }
}

fn interpret_stop(reply: StreamReply) -> Result<StopOutcome, OverlayError> {
    if let Some(error) = reply.error {
        return Err(OverlayError::RemoteRejection(error));
    }
    match reply.status.as_deref() {
        Some("not_running") => Ok(StopOutcome::NotRunning),
        _ => Ok(StopOutcome::Stopped),
    }
}

/// Read a reply body from either a success or an error status.
fn read_reply(result: Result<ureq::Response, ureq::Error>) -> Result<StreamReply, OverlayError> {
    match result {
        Ok(response) => read_json(response),
        Err(ureq::Error::Status(code, response)) => {
            let reply = response.into_json::<StreamReply>().unwrap_or_default();
            match reply.error {
                Some(error) => Err(OverlayError::RemoteRejection(error)),
                None => Err(OverlayError::RemoteRejection(format!("HTTP {}", code))),
            }
        }
        Err(e) => Err(e.into()),
    }
}

pub struct StreamClient {
    endpoint: ApiEndpoint,
}

impl StreamClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            endpoint: ApiEndpoint::new(base_url, timeout),
        }
    }

    /// Ask the backend to transcode `rtsp_url` into the playlist named `target`.
    pub fn start(&self, rtsp_url: &str, target: &str) -> Result<StartOutcome, OverlayError> {
        let url = self.endpoint.url(START_PATH)?;
        let result = self.endpoint.agent().post(url.as_str()).send_json(serde_json::json!({
            "rtsp_url": rtsp_url,
            "target": target,
        }));
        interpret_start(self.endpoint.base()?, read_reply(result)?)
    }

    pub fn stop(&self) -> Result<StopOutcome, OverlayError> {
        let url = self.endpoint.url(STOP_PATH)?;
        let result = self.endpoint.agent().post(url.as_str()).call();
        interpret_stop(read_reply(result)?)
    }

    /// Never fails: anything but a readable reply counts as unreachable.
    pub fn health(&self) -> BackendHealth {
        let result = self
            .endpoint
            .url(HEALTH_PATH)
            .and_then(|url| {
                self.endpoint
                    .agent()
                    .get(url.as_str())
                    .call()
                    .map_err(OverlayError::from)
            })
            .and_then(read_json::<BackendHealth>);
        match result {
            Ok(health) => health,
            Err(e) => {
                debug!("Health check failed: {}", e);
                BackendHealth::unreachable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::parse_base;

    fn reply(json: &str) -> StreamReply {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_started_joins_playlist_against_base() {
        let base = parse_base("http://localhost:5000").unwrap();
        let outcome = interpret_start(
            &base,
            reply(r#"{"status": "started", "hls_url": "/hls/stream.m3u8"}"#),
        )
        .unwrap();
        assert_eq!(
            outcome,
            StartOutcome::Started {
                playable_url: Url::parse("http://localhost:5000/hls/stream.m3u8").unwrap(),
                playlist_ready: true,
            }
        );
    }

    #[test]
    fn test_started_without_playlist() {
        let base = parse_base("http://localhost:5000").unwrap();
        let outcome = interpret_start(
            &base,
            reply(r#"{"status": "started_but_no_playlist_yet", "hls_url": "/hls/stream2.m3u8"}"#),
        )
        .unwrap();
        assert!(matches!(
            outcome,
            StartOutcome::Started {
                playlist_ready: false,
                ..
            }
        ));
    }

    #[test]
    fn test_already_running() {
        let base = parse_base("http://localhost:5000").unwrap();
        let outcome = interpret_start(&base, reply(r#"{"status": "already_running"}"#)).unwrap();
        assert_eq!(outcome, StartOutcome::AlreadyRunning);
    }

    #[test]
    fn test_start_error_body() {
        let base = parse_base("http://localhost:5000").unwrap();
        let err = interpret_start(&base, reply(r#"{"error": "rtsp_url required"}"#)).unwrap_err();
        assert_eq!(err, OverlayError::RemoteRejection("rtsp_url required".into()));
    }

    #[test]
    fn test_started_without_url_is_rejected() {
        let base = parse_base("http://localhost:5000").unwrap();
        assert!(interpret_start(&base, reply(r#"{"status": "started"}"#)).is_err());
    }

    #[test]
    fn test_stop_replies() {
        assert_eq!(
            interpret_stop(reply(r#"{"status": "stopped"}"#)).unwrap(),
            StopOutcome::Stopped
        );
        assert_eq!(
            interpret_stop(reply(r#"{"status": "not_running"}"#)).unwrap(),
            StopOutcome::NotRunning
        );
    }

    #[test]
    fn test_health_parsing() {
        let health: BackendHealth =
            serde_json::from_str(r#"{"ffmpeg": true, "mongo": "ok"}"#).unwrap();
        assert!(health.transcoder_available);
        assert!(health.store_reachable());

        let health: BackendHealth =
            serde_json::from_str(r#"{"ffmpeg": false, "mongo": "error: not_connected"}"#).unwrap();
        assert!(!health.transcoder_available);
        assert!(!health.store_reachable());
    }

    #[test]
    fn test_unreachable_health() {
        let health = BackendHealth::unreachable();
        assert!(!health.transcoder_available);
        assert_eq!(health.store_status, "unreachable");
    }
}
