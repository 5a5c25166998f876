//! Rendering surface metrics.
//!
//! The surface is the area overlays are positioned within. Its pixel size is the
//! denominator for every pixel/percent conversion, so readers always get a usable size:
//! the last observed one, or the configured fallback before the surface is mounted.

use bevy::prelude::*;

use crate::config::{AppConfig, ConfigLoaded};
use crate::constants::{DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH};

/// Smallest size accepted as a real observation (anything below is a collapsed layout).
const MIN_OBSERVED_PX: f32 = 1.0;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    /// Last observed size in logical pixels, `None` until mounted.
    current: Option<Vec2>,
    /// Screen position of the surface's top-left corner.
    origin: Vec2,
    fallback: Vec2,
}

impl Default for SurfaceMetrics {
    fn default() -> Self {
        Self::with_fallback(Vec2::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT))
    }
}

impl SurfaceMetrics {
    pub fn with_fallback(fallback: Vec2) -> Self {
        Self {
            current: None,
            origin: Vec2::ZERO,
            fallback,
        }
    }

    fn is_usable(size: Vec2) -> bool {
        size.is_finite() && size.x >= MIN_OBSERVED_PX && size.y >= MIN_OBSERVED_PX
    }

    pub fn set_fallback(&mut self, fallback: Vec2) {
        if Self::is_usable(fallback) {
            self.fallback = fallback;
        } else {
            warn!("Ignoring unusable fallback surface size {:?}", fallback);
        }
    }

    /// Record the surface layout. Returns true when the size changed.
    ///
    /// Collapsed or non-finite sizes are ignored and the last known size stays in use.
    pub fn observe(&mut self, origin: Vec2, size: Vec2) -> bool {
        if !Self::is_usable(size) {
            return false;
        }
        self.origin = origin;
        if self.current == Some(size) {
            return false;
        }
        debug!("Surface resized to {}x{}", size.x, size.y);
        self.current = Some(size);
        true
    }

    pub fn is_mounted(&self) -> bool {
        self.current.is_some()
    }

    /// Current size in pixels, never zero.
    pub fn size(&self) -> Vec2 {
        self.current.unwrap_or(self.fallback)
    }

    /// Convert a screen position into surface-local pixels.
    pub fn to_local(&self, screen: Vec2) -> Vec2 {
        screen - self.origin
    }
}

/// Startup system to pick up the configured fallback size
fn apply_configured_fallback(config: Res<AppConfig>, mut metrics: ResMut<SurfaceMetrics>) {
    metrics.set_fallback(Vec2::new(
        config.data.fallback_surface_width,
        config.data.fallback_surface_height,
    ));
}

pub struct SurfacePlugin;

impl Plugin for SurfacePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SurfaceMetrics>()
            .add_systems(Startup, apply_configured_fallback.after(ConfigLoaded));
    }
}
