//! The remote overlay store seam and its HTTP implementation.

use std::time::Duration;

use bevy::prelude::*;

use crate::api::{read_json, ApiEndpoint};
use crate::error::OverlayError;
use crate::overlay::{OverlayId, RawOverlay};

const OVERLAYS_PATH: &str = "api/overlays";

/// CRUD access to the authoritative overlay store.
///
/// Calls block; they are only ever made from async compute tasks.
pub trait RemoteStore: Send + Sync {
    fn list(&self) -> Result<Vec<RawOverlay>, OverlayError>;
    fn create(&self, payload: &RawOverlay) -> Result<RawOverlay, OverlayError>;
    fn update(&self, id: &OverlayId, payload: &RawOverlay) -> Result<RawOverlay, OverlayError>;
    fn delete(&self, id: &OverlayId) -> Result<(), OverlayError>;
}

/// `RemoteStore` over the backend's REST API.
pub struct HttpRemoteStore {
    endpoint: ApiEndpoint,
}

impl HttpRemoteStore {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            endpoint: ApiEndpoint::new(base_url, timeout),
        }
    }

    fn overlay_url(&self, id: &OverlayId) -> Result<url::Url, OverlayError> {
        let mut url = self.endpoint.url(OVERLAYS_PATH)?;
        url.path_segments_mut()
            .map_err(|_| OverlayError::NetworkFailure("API base URL cannot have a path".into()))?
            .push(id.as_str());
        Ok(url)
    }
}

impl RemoteStore for HttpRemoteStore {
    fn list(&self) -> Result<Vec<RawOverlay>, OverlayError> {
        let url = self.endpoint.url(OVERLAYS_PATH)?;
        let response = self.endpoint.agent().get(url.as_str()).call()?;
        let body: serde_json::Value = read_json(response)?;

        let serde_json::Value::Array(items) = body else {
            return Err(OverlayError::RemoteRejection(
                "overlay listing is not an array".into(),
            ));
        };

        // One malformed record should not hide the rest
        let records = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<RawOverlay>(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping malformed overlay record: {}", e);
                    None
                }
            })
            .collect();
        Ok(records)
    }

    fn create(&self, payload: &RawOverlay) -> Result<RawOverlay, OverlayError> {
        let url = self.endpoint.url(OVERLAYS_PATH)?;
        let response = self.endpoint.agent().post(url.as_str()).send_json(payload)?;
        read_json(response)
    }

    fn update(&self, id: &OverlayId, payload: &RawOverlay) -> Result<RawOverlay, OverlayError> {
        let url = self.overlay_url(id)?;
        // The id travels in the path only
        let body = RawOverlay {
            id: None,
            ..payload.clone()
        };
        let response = self.endpoint.agent().put(url.as_str()).send_json(&body)?;
        read_json(response)
    }

    fn delete(&self, id: &OverlayId) -> Result<(), OverlayError> {
        let url = self.overlay_url(id)?;
        self.endpoint.agent().delete(url.as_str()).call()?;
        Ok(())
    }
}
