//! Backend endpoint shared by the overlay store and the stream clients.

use std::time::Duration;

use bevy::prelude::*;
use url::Url;

use crate::error::OverlayError;

const USER_AGENT: &str = concat!("overlaycast/", env!("CARGO_PKG_VERSION"));

/// Parse a base URL so that relative joins append to its path instead of replacing
/// the last segment.
pub fn parse_base(base_url: &str) -> Result<Url, url::ParseError> {
    let trimmed = base_url.trim();
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{}/", trimmed))
    }
}

/// Resolve a server-provided path (`/hls/stream.m3u8`) or absolute URL against the base.
pub fn resolve(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    base.join(path.trim_start_matches('/'))
}

/// HTTP agent plus base URL of the backend.
#[derive(Clone)]
pub struct ApiEndpoint {
    base: Result<Url, String>,
    agent: ureq::Agent,
}

impl ApiEndpoint {
    /// An unparsable base is kept as an error and reported on every request.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let base = parse_base(base_url).map_err(|e| {
            warn!("Invalid API base URL {:?}: {}", base_url, e);
            format!("invalid API base URL {:?}: {}", base_url, e)
        });
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { base, agent }
    }

    pub fn base(&self) -> Result<&Url, OverlayError> {
        self.base
            .as_ref()
            .map_err(|e| OverlayError::NetworkFailure(e.clone()))
    }

    pub fn url(&self, path: &str) -> Result<Url, OverlayError> {
        let base = self.base()?;
        resolve(base, path).map_err(|e| OverlayError::NetworkFailure(format!("bad path {:?}: {}", path, e)))
    }

    pub fn agent(&self) -> &ureq::Agent {
        &self.agent
    }
}

/// Read a JSON body, mapping decode failures to a rejection.
pub fn read_json<T: serde::de::DeserializeOwned>(response: ureq::Response) -> Result<T, OverlayError> {
    response
        .into_json::<T>()
        .map_err(|e| OverlayError::RemoteRejection(format!("unreadable response: {}", e)))
}
