// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen-space hit testing of projected handle geometry.
//!
//! Representations project their handle points and segments through the
//! [`Interactor`] and compare pixel distances against [`HitParams`]. Point
//! handles always win over segments so that a control point sitting on a
//! segment stays grabbable.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Line, ParamCurveNearest, Point};

use glam::DVec3;

use crate::Interactor;

/// Pixel tolerances for picking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitParams {
    /// Maximum distance from a point handle, in pixels.
    pub handle_tolerance: f64,
    /// Maximum distance from a segment between control points, in pixels.
    pub segment_tolerance: f64,
}

impl Default for HitParams {
    fn default() -> Self {
        Self {
            handle_tolerance: 8.0,
            segment_tolerance: 4.0,
        }
    }
}

/// What was hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitKind {
    /// A point handle.
    Handle,
    /// A segment between handles.
    Segment,
}

/// Result of a successful hit test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitScore {
    /// Pixel distance from the pointer.
    pub distance: f64,
    /// Kind of geometry hit.
    pub kind: HitKind,
}

impl HitScore {
    /// Returns `true` if `self` should be preferred over `other`.
    pub fn beats(&self, other: &Self) -> bool {
        match (self.kind, other.kind) {
            (HitKind::Handle, HitKind::Segment) => true,
            (HitKind::Segment, HitKind::Handle) => false,
            _ => self.distance < other.distance,
        }
    }
}

fn to_screen(interactor: &dyn Interactor, world: DVec3) -> Option<Point> {
    interactor
        .world_to_display(world)
        .map(|d| Point::new(d.x, d.y))
}

/// Hit tests a point handle at `world` against pointer `position`.
pub fn hit_point(
    interactor: &dyn Interactor,
    world: DVec3,
    position: Point,
    params: &HitParams,
) -> Option<HitScore> {
    let distance = to_screen(interactor, world)?.distance(position);
    (distance <= params.handle_tolerance).then_some(HitScore {
        distance,
        kind: HitKind::Handle,
    })
}

/// Hit tests the segment `a`–`b` against pointer `position`.
pub fn hit_segment(
    interactor: &dyn Interactor,
    a: DVec3,
    b: DVec3,
    position: Point,
    params: &HitParams,
) -> Option<HitScore> {
    let line = Line::new(to_screen(interactor, a)?, to_screen(interactor, b)?);
    let distance = line.nearest(position, 0.).distance_sq.sqrt();
    (distance <= params.segment_tolerance).then_some(HitScore {
        distance,
        kind: HitKind::Segment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ViewProjection;
    use kurbo::Size;

    // 1 world unit == 10 px, world origin at the viewport center.
    fn camera() -> ViewProjection {
        ViewProjection::orthographic(DVec3::ZERO, 10.0, Size::new(200.0, 200.0)).unwrap()
    }

    #[test]
    fn point_within_tolerance_hits() {
        let hit = hit_point(
            &camera(),
            DVec3::ZERO,
            Point::new(105.0, 100.0),
            &HitParams::default(),
        )
        .unwrap();
        assert!((hit.distance - 5.0).abs() < 1e-9);
        assert_eq!(hit.kind, HitKind::Handle);
    }

    #[test]
    fn point_outside_tolerance_misses() {
        let params = HitParams::default();
        assert!(hit_point(&camera(), DVec3::ZERO, Point::new(109.0, 100.0), &params).is_none());
    }

    #[test]
    fn segment_distance_is_perpendicular() {
        let a = DVec3::new(-5.0, 0.0, 0.0);
        let b = DVec3::new(5.0, 0.0, 0.0);
        let params = HitParams::default();
        let hit = hit_segment(&camera(), a, b, Point::new(120.0, 103.0), &params).unwrap();
        assert!((hit.distance - 3.0).abs() < 1e-9);
        assert!(hit_segment(&camera(), a, b, Point::new(120.0, 106.0), &params).is_none());
    }

    #[test]
    fn handles_beat_closer_segments() {
        let handle = HitScore {
            distance: 7.0,
            kind: HitKind::Handle,
        };
        let segment = HitScore {
            distance: 0.5,
            kind: HitKind::Segment,
        };
        assert!(handle.beats(&segment));
        assert!(!segment.beats(&handle));
    }
}
