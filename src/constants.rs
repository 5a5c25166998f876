//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration defaults that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1400.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 860.0;

/// Backend used when no config or environment override says otherwise
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Environment variable overriding the configured backend URL
pub const API_BASE_URL_ENV: &str = "OVERLAYCAST_API";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_HEALTH_POLL_SECS: u64 = 5;

/// Surface size used before the surface has been laid out
pub const DEFAULT_SURFACE_WIDTH: f32 = 800.0;
pub const DEFAULT_SURFACE_HEIGHT: f32 = 450.0;

/// The rendering surface never grows wider than this
pub const DEFAULT_SURFACE_MAX_WIDTH: f32 = 800.0;

pub const DEFAULT_SURFACE_ASPECT_RATIO: f32 = 16.0 / 9.0;

/// Resize handle square side in pixels
pub const DEFAULT_RESIZE_HANDLE_PX: f32 = 12.0;

/// Resize floor per dimension in pixels
pub const DEFAULT_MIN_OVERLAY_PX: f32 = 10.0;

/// Backend playlist names, one per stream slot
pub const STREAM_TARGETS: [&str; 2] = ["stream", "stream2"];

pub const DEFAULT_RTSP_URL: &str = "rtsp://rtsp.me/sample";

/// "New overlay" form defaults (percent): 10px/10px offset and a 150x40 box on 800x450
pub const DEFAULT_DRAFT_CONTENT: &str = "Overlay text";
pub const DEFAULT_DRAFT_X: f32 = 1.25;
pub const DEFAULT_DRAFT_Y: f32 = 2.22;
pub const DEFAULT_DRAFT_WIDTH: f32 = 18.75;
pub const DEFAULT_DRAFT_HEIGHT: f32 = 8.89;

/// Percent added to x by the "Move right" action
pub const MOVE_RIGHT_STEP: f32 = 10.0;

/// Maximum number of sync messages kept for display
pub const MAX_SYNC_FEEDBACK: usize = 5;
