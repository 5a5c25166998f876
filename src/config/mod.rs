use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{
    API_BASE_URL_ENV, DEFAULT_API_BASE_URL, DEFAULT_HEALTH_POLL_SECS, DEFAULT_MIN_OVERLAY_PX,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RESIZE_HANDLE_PX, DEFAULT_RTSP_URL,
    DEFAULT_SURFACE_ASPECT_RATIO, DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_MAX_WIDTH,
    DEFAULT_SURFACE_WIDTH, STREAM_TARGETS,
};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// An RTSP input and where its HLS playlist is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSource {
    pub rtsp_url: String,
    pub hls_url: String,
}

impl StreamSource {
    /// Default source for a backend playlist name.
    pub fn for_target(target: &str) -> Self {
        Self {
            rtsp_url: DEFAULT_RTSP_URL.to_string(),
            hls_url: format!("{}/hls/{}.m3u8", DEFAULT_API_BASE_URL, target),
        }
    }
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfigData {
    /// Backend serving the overlay store, stream control and health endpoints
    pub api_base_url: String,

    /// Timeout for every backend request
    pub request_timeout_secs: u64,

    /// Surface size used for percent math before the surface is laid out
    pub fallback_surface_width: f32,
    pub fallback_surface_height: f32,

    /// Largest width the rendering surface grows to
    pub surface_max_width: f32,

    /// Width / height of the rendering surface
    pub surface_aspect_ratio: f32,

    /// Side of the resize handle square, in pixels
    pub resize_handle_px: f32,

    /// Resize floor per dimension, in pixels
    pub min_overlay_px: f32,

    /// Interval between backend health checks
    pub health_poll_secs: u64,

    /// Stream inputs, in slot order
    pub streams: Vec<StreamSource>,
}

impl Default for AppConfigData {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            fallback_surface_width: DEFAULT_SURFACE_WIDTH,
            fallback_surface_height: DEFAULT_SURFACE_HEIGHT,
            surface_max_width: DEFAULT_SURFACE_MAX_WIDTH,
            surface_aspect_ratio: DEFAULT_SURFACE_ASPECT_RATIO,
            resize_handle_px: DEFAULT_RESIZE_HANDLE_PX,
            min_overlay_px: DEFAULT_MIN_OVERLAY_PX,
            health_poll_secs: DEFAULT_HEALTH_POLL_SECS,
            streams: STREAM_TARGETS
                .iter()
                .map(|target| StreamSource::for_target(target))
                .collect(),
        }
    }
}

impl AppConfigData {
    /// Backend base URL, with the environment override applied.
    pub fn effective_api_base_url(&self) -> String {
        api_base_url_with_override(&self.api_base_url, std::env::var(API_BASE_URL_ENV).ok())
    }
}

fn api_base_url_with_override(configured: &str, env_value: Option<String>) -> String {
    match env_value {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => configured.to_string(),
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: get_config_path(),
            dirty: false,
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message sent after the backend URL or timeouts changed, so clients reconnect
#[derive(Message)]
pub struct BackendSettingsChanged;

/// Get the path to the config file (platform-appropriate location)
fn get_config_path() -> PathBuf {
    crate::paths::config_file()
}

/// Result of loading config from disk
struct LoadConfigResult {
    config: AppConfig,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

/// Parse config file contents
fn parse_config(json: &str) -> Result<AppConfigData, serde_json::Error> {
    serde_json::from_str(json)
}

/// Load configuration from disk
fn load_config() -> LoadConfigResult {
    let config_path = get_config_path();

    let (data, reset_reason) = if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(json) => match parse_config(&json) {
                Ok(data) => {
                    info!("Loaded config from {:?}", config_path);
                    (data, None)
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}", e);
                    (
                        AppConfigData::default(),
                        Some(format!("Configuration file was corrupted: {}", e)),
                    )
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (AppConfigData::default(), None)
    };

    LoadConfigResult {
        config: AppConfig {
            data,
            config_path,
            dirty: false,
        },
        reset_reason,
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config();
    config.data = result.config.data;
    config.config_path = result.config.config_path;
    config.dirty = result.config.dirty;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<BackendSettingsChanged>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                save_config_system.run_if(on_message::<SaveConfigRequest>),
            );
    }
}
