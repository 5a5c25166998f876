//! Coordinate normalization: raw store records into canonical percent.
//!
//! Unit detection for untagged records is a heuristic: if any geometry field exceeds
//! 100 the record is read as pixels of the current surface, otherwise it is read as
//! percent. Small pixel records (everything at or below 100px) are therefore taken as
//! percent. That limitation is kept as-is because changing it would move overlays that
//! are already stored.

use bevy::prelude::*;

use crate::error::OverlayError;

use super::model::round2;
use super::wire::{CoordUnit, RawOverlay};

/// Which rule the normalizer applied to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitAssumption {
    /// Already tagged as percent; passed through unchanged.
    Tagged,
    /// A field exceeded 100, read as pixels and converted.
    Pixels,
    /// No tag and nothing above 100, assumed to be percent.
    AssumedPercent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Percent-tagged record.
    pub record: RawOverlay,
    pub assumption: UnitAssumption,
}

impl Normalized {
    /// The ambiguity notice for records resolved by assumption, if any.
    pub fn ambiguity(&self) -> Option<OverlayError> {
        match self.assumption {
            UnitAssumption::AssumedPercent => {
                Some(OverlayError::NormalizationAmbiguity(self.record.describe()))
            }
            _ => None,
        }
    }
}

fn looks_like_pixels(raw: &RawOverlay) -> bool {
    raw.x > 100.0 || raw.y > 100.0 || raw.width > 100.0 || raw.height > 100.0
}

/// Convert a raw record into canonical percent against `surface` (pixels, both > 0).
///
/// Pure and idempotent: the output is always tagged, so feeding it back in is a no-op.
pub fn normalize(raw: &RawOverlay, surface: Vec2) -> Normalized {
    if raw.is_percent_tagged() {
        return Normalized {
            record: raw.clone(),
            assumption: UnitAssumption::Tagged,
        };
    }

    let mut record = raw.clone();
    let assumption = if looks_like_pixels(raw) {
        record.x = round2(raw.x / surface.x * 100.0);
        record.y = round2(raw.y / surface.y * 100.0);
        record.width = round2(raw.width / surface.x * 100.0);
        record.height = round2(raw.height / surface.y * 100.0);
        UnitAssumption::Pixels
    } else {
        record.x = round2(raw.x);
        record.y = round2(raw.y);
        record.width = round2(raw.width);
        record.height = round2(raw.height);
        UnitAssumption::AssumedPercent
    };
    record.coord_unit = Some(CoordUnit::Percent);

    Normalized { record, assumption }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: Vec2 = Vec2::new(800.0, 450.0);

    fn raw(x: f32, y: f32, width: f32, height: f32) -> RawOverlay {
        RawOverlay {
            content: "test".into(),
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    #[test]
    fn test_pixel_record_is_converted() {
        let normalized = normalize(&raw(760.0, 50.0, 640.0, 80.0), SURFACE);
        assert_eq!(normalized.assumption, UnitAssumption::Pixels);
        let r = &normalized.record;
        assert_eq!(r.x, 95.0);
        assert_eq!(r.y, 11.11);
        assert_eq!(r.width, 80.0);
        assert_eq!(r.height, 17.78);
        assert!(r.is_percent_tagged());
        assert!(normalized.ambiguity().is_none());
    }

    #[test]
    fn test_small_record_is_assumed_percent() {
        let normalized = normalize(&raw(40.0, 22.5, 16.0, 9.0), SURFACE);
        assert_eq!(normalized.assumption, UnitAssumption::AssumedPercent);
        assert_eq!(normalized.record.x, 40.0);
        assert_eq!(normalized.record.y, 22.5);
        assert_eq!(normalized.record.width, 16.0);
        assert_eq!(normalized.record.height, 9.0);
        assert!(normalized.record.is_percent_tagged());
        assert!(matches!(
            normalized.ambiguity(),
            Some(OverlayError::NormalizationAmbiguity(_))
        ));
    }

    #[test]
    fn test_exactly_100_is_not_pixels() {
        let normalized = normalize(&raw(100.0, 0.0, 100.0, 100.0), SURFACE);
        assert_eq!(normalized.assumption, UnitAssumption::AssumedPercent);
        assert_eq!(normalized.record.width, 100.0);
    }

    #[test]
    fn test_single_large_field_triggers_pixels() {
        // Only height is above 100, but every field is converted.
        let normalized = normalize(&raw(80.0, 45.0, 80.0, 225.0), SURFACE);
        assert_eq!(normalized.assumption, UnitAssumption::Pixels);
        assert_eq!(normalized.record.x, 10.0);
        assert_eq!(normalized.record.y, 10.0);
        assert_eq!(normalized.record.width, 10.0);
        assert_eq!(normalized.record.height, 50.0);
    }

    #[test]
    fn test_tagged_record_passes_through_unchanged() {
        let mut tagged = raw(12.345, 150.0, 3.0, 4.0);
        tagged.coord_unit = Some(CoordUnit::Percent);
        let normalized = normalize(&tagged, SURFACE);
        assert_eq!(normalized.assumption, UnitAssumption::Tagged);
        assert_eq!(normalized.record, tagged);
    }

    #[test]
    fn test_unknown_tag_is_treated_as_untagged() {
        let mut record = raw(400.0, 225.0, 80.0, 45.0);
        record.coord_unit = Some(CoordUnit::Other);
        let normalized = normalize(&record, SURFACE);
        assert_eq!(normalized.assumption, UnitAssumption::Pixels);
        assert_eq!(normalized.record.x, 50.0);
        assert_eq!(normalized.record.y, 50.0);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for record in [
            raw(760.0, 50.0, 640.0, 80.0),
            raw(40.0, 22.5, 16.0, 9.0),
            raw(1.234_567, 2.0, 3.0, 4.0),
        ] {
            let once = normalize(&record, SURFACE).record;
            let twice = normalize(&once, SURFACE).record;
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_normalize_does_not_depend_on_surface_once_tagged() {
        let once = normalize(&raw(760.0, 50.0, 640.0, 80.0), SURFACE).record;
        let other_surface = normalize(&once, Vec2::new(1920.0, 1080.0)).record;
        assert_eq!(once, other_surface);
    }

    #[test]
    fn test_extra_fields_survive() {
        let mut record = raw(760.0, 50.0, 640.0, 80.0);
        record
            .extra
            .insert("created_at".into(), serde_json::json!(1727000000.0));
        let normalized = normalize(&record, SURFACE);
        assert!(normalized.record.extra.contains_key("created_at"));
    }
}
