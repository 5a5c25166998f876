//! Pointer-to-geometry arithmetic for drag and resize gestures.
//!
//! All pointer positions are surface-local pixels (origin at the surface's top-left,
//! y growing downwards). Results are percent, rounded to two decimals.

use bevy::prelude::*;

use crate::overlay::{round2, Geometry};

/// New geometry for a drag step.
///
/// The top-left corner follows the pointer minus the grab offset and is clamped to the
/// surface. The far edges are not clamped, so an overlay may hang off the bottom/right.
pub fn dragged(geometry: Geometry, pointer: Vec2, pointer_offset: Vec2, surface: Vec2) -> Geometry {
    let top_left = (pointer - pointer_offset).clamp(Vec2::ZERO, surface);
    Geometry {
        x: round2(top_left.x / surface.x * 100.0),
        y: round2(top_left.y / surface.y * 100.0),
        ..geometry
    }
}

/// Result of a resize step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resized {
    pub geometry: Geometry,
    /// The pointer asked for less than the minimum size on at least one axis.
    pub floored: bool,
}

/// New geometry for a resize step anchored at the overlay's top-left.
///
/// Width and height are whole pixels, floored at `min_size_px` on each axis.
pub fn resized(geometry: Geometry, pointer: Vec2, surface: Vec2, min_size_px: f32) -> Resized {
    let top_left = geometry.top_left_px(surface);
    let requested = (pointer - top_left).round();
    let size = requested.max(Vec2::splat(min_size_px));
    Resized {
        geometry: Geometry {
            width: round2(size.x / surface.x * 100.0),
            height: round2(size.y / surface.y * 100.0),
            ..geometry
        },
        floored: requested.x < min_size_px || requested.y < min_size_px,
    }
}

/// Pointer offset from the overlay's top-left, captured when a drag starts.
pub fn grab_offset(geometry: Geometry, pointer: Vec2, surface: Vec2) -> Vec2 {
    pointer - geometry.top_left_px(surface)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: Vec2 = Vec2::new(800.0, 450.0);

    #[test]
    fn test_drag_preserves_grab_point() {
        let geometry = Geometry::new(10.0, 10.0, 20.0, 20.0);
        // Overlay top-left is (80, 45); grab 20px right and 15px down of it
        let offset = grab_offset(geometry, Vec2::new(100.0, 60.0), SURFACE);
        assert_eq!(offset, Vec2::new(20.0, 15.0));

        let moved = dragged(geometry, Vec2::new(420.0, 240.0), offset, SURFACE);
        assert_eq!(moved.x, 50.0);
        assert_eq!(moved.y, 50.0);
        assert_eq!(moved.width, 20.0);
        assert_eq!(moved.height, 20.0);
    }

    #[test]
    fn test_drag_clamps_negative_to_zero() {
        let geometry = Geometry::new(10.0, 10.0, 20.0, 20.0);
        let moved = dragged(geometry, Vec2::new(5.0, 5.0), Vec2::new(20.0, 15.0), SURFACE);
        assert_eq!(moved.x, 0.0);
        assert_eq!(moved.y, 0.0);
    }

    #[test]
    fn test_drag_clamps_one_axis_only() {
        let geometry = Geometry::new(10.0, 10.0, 20.0, 20.0);
        let moved = dragged(geometry, Vec2::new(5.0, 240.0), Vec2::new(20.0, 15.0), SURFACE);
        assert_eq!(moved.x, 0.0);
        assert_eq!(moved.y, 50.0);
    }

    #[test]
    fn test_drag_may_hang_off_far_edge() {
        let geometry = Geometry::new(10.0, 10.0, 20.0, 20.0);
        // Top-left lands at (760, 405): the overlay extends past the surface
        let moved = dragged(geometry, Vec2::new(780.0, 420.0), Vec2::new(20.0, 15.0), SURFACE);
        assert_eq!(moved.x, 95.0);
        assert_eq!(moved.y, 90.0);
        assert!(moved.x + moved.width > 100.0);
    }

    #[test]
    fn test_drag_top_left_stays_on_surface() {
        let geometry = Geometry::new(10.0, 10.0, 20.0, 20.0);
        let moved = dragged(geometry, Vec2::new(2000.0, 900.0), Vec2::ZERO, SURFACE);
        assert_eq!(moved.x, 100.0);
        assert_eq!(moved.y, 100.0);
    }

    #[test]
    fn test_resize_follows_pointer() {
        let geometry = Geometry::new(10.0, 10.0, 20.0, 20.0);
        let result = resized(geometry, Vec2::new(480.0, 270.0), SURFACE, 10.0);
        assert!(!result.floored);
        assert_eq!(result.geometry.x, 10.0);
        assert_eq!(result.geometry.y, 10.0);
        assert_eq!(result.geometry.width, 50.0);
        assert_eq!(result.geometry.height, 50.0);
    }

    #[test]
    fn test_resize_floor_at_top_left() {
        let geometry = Geometry::new(10.0, 10.0, 20.0, 20.0);
        let result = resized(geometry, Vec2::new(80.0, 45.0), SURFACE, 10.0);
        assert!(result.floored);
        assert_eq!(result.geometry.width, 1.25);
        assert_eq!(result.geometry.height, 2.22);
    }

    #[test]
    fn test_resize_floor_before_top_left() {
        let geometry = Geometry::new(10.0, 10.0, 20.0, 20.0);
        let result = resized(geometry, Vec2::new(0.0, 0.0), SURFACE, 10.0);
        assert!(result.floored);
        assert!(result.geometry.width > 0.0);
        assert!(result.geometry.height > 0.0);
        assert_eq!(result.geometry.width, 1.25);
        assert_eq!(result.geometry.height, 2.22);
    }

    #[test]
    fn test_resize_rounds_to_whole_pixels() {
        let geometry = Geometry::new(0.0, 0.0, 20.0, 20.0);
        let result = resized(geometry, Vec2::new(100.4, 45.6), SURFACE, 10.0);
        assert_eq!(result.geometry.width, 12.5);
        assert_eq!(result.geometry.height, 10.22);
    }
}
