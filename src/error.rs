//! Error kinds surfaced by the overlay engine.
//!
//! Only `NetworkFailure` and `RemoteRejection` are ever returned as `Err` from remote
//! operations. The other two kinds describe conditions the engine resolves on its own
//! (by heuristic or by clamping) and are reported through logs and UI notices.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    /// The request never completed (connection refused, timeout, broken body).
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The store answered, but not with a usable persistent record.
    #[error("remote store rejected the request: {0}")]
    RemoteRejection(String),

    /// An untagged record had no field above 100, so it was assumed to be percent.
    #[error("overlay {0} has no unit tag and no pixel-sized field; assumed percent")]
    NormalizationAmbiguity(String),

    /// A resize tried to shrink an overlay below the minimum size and was clamped.
    #[error("resize below {min_px}px was clamped")]
    InvalidGeometry { min_px: f32 },
}

impl From<ureq::Error> for OverlayError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => {
                let body = response.into_string().unwrap_or_default();
                if body.is_empty() {
                    OverlayError::RemoteRejection(format!("HTTP {}", code))
                } else {
                    OverlayError::RemoteRejection(format!("HTTP {}: {}", code, body.trim()))
                }
            }
            ureq::Error::Transport(transport) => OverlayError::NetworkFailure(transport.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = OverlayError::RemoteRejection("missing _id".into());
        assert_eq!(err.to_string(), "remote store rejected the request: missing _id");

        let err = OverlayError::InvalidGeometry { min_px: 10.0 };
        assert_eq!(err.to_string(), "resize below 10px was clamped");
    }
}
