// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion between node-local parameters and world-space handle geometry.
//!
//! ## Usage
//!
//! 1) Resolve the node's parent transform with [`ParentTransform::resolve`].
//! 2) Call [`to_world`] to obtain the geometry a handle should display.
//! 3) After the user edits the handle, call [`to_local`] with the same
//!    transform to obtain parameters to store back into the node.
//!
//! ```
//! use glam::{DMat4, DVec3};
//! use marksync_geometry::{BoxParams, NodeGeometry, ParentTransform, to_local, to_world};
//!
//! let params = NodeGeometry::Box(BoxParams::new(DVec3::ZERO, DVec3::ONE));
//! let parent = ParentTransform::Linear(DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0)));
//!
//! let world = to_world(&params, &parent);
//! let bounds = world.bounds().unwrap();
//! assert_eq!(bounds.to_array(), [4.0, 6.0, -1.0, 1.0, -1.0, 1.0]);
//!
//! assert_eq!(to_local(&world, &parent), params);
//! ```

use glam::DVec3;
use smallvec::SmallVec;

use crate::bounds::{Axis, Bounds3, Side};
use crate::transform::{LinearTransform, ParentTransform};

/// Control points of a point-based annotation.
///
/// Four inline slots cover fiducials, rulers, angles and calipers without
/// allocating.
pub type ControlPoints = SmallVec<[DVec3; 4]>;

/// Box parameters in the semantic form stored by region-of-interest nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxParams {
    /// Center of the box.
    pub center: DVec3,
    /// Half-extent along each axis. Never negative.
    pub radius: DVec3,
}

impl BoxParams {
    /// Creates box parameters; negative radii are folded to their magnitude.
    pub fn new(center: DVec3, radius: DVec3) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }
}

/// Geometry of a node in its own local (untransformed) space.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeGeometry {
    /// Center and half-extents of a box.
    Box(BoxParams),
    /// Ordered control points.
    Points(ControlPoints),
}

impl NodeGeometry {
    /// Convenience constructor for point geometry.
    pub fn points(points: impl IntoIterator<Item = DVec3>) -> Self {
        Self::Points(points.into_iter().collect())
    }

    /// Compares with `other`, allowing `tolerance` relative to the largest
    /// coordinate magnitude involved (at least 1).
    pub fn relative_eq(&self, other: &Self, tolerance: f64) -> bool {
        fn within(a: &[DVec3], b: &[DVec3], tolerance: f64) -> bool {
            let scale = a
                .iter()
                .chain(b.iter())
                .map(|p| p.abs().max_element())
                .fold(1.0, f64::max);
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(a, b)| (*a - *b).abs().max_element() <= tolerance * scale)
        }
        match (self, other) {
            (Self::Box(a), Self::Box(b)) => {
                within(&[a.center, a.radius], &[b.center, b.radius], tolerance)
            }
            (Self::Points(a), Self::Points(b)) => within(a, b, tolerance),
            _ => false,
        }
    }
}

/// World-space box: two diagonally opposite corners in the box's own frame,
/// plus the frame-to-world transform.
///
/// A box under a rotated or sheared parent stays an oriented box; only
/// [`BoxCorners::bounds`] flattens it to axis-aligned world bounds, in the
/// fixed `(min0, max0, min1, max1, min2, max2)` order. Face and body motion
/// is applied in the frame, so editing a rotated box keeps it a box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxCorners {
    corners: [DVec3; 2],
    frame: LinearTransform,
}

impl BoxCorners {
    /// Creates an axis-aligned world box from two opposite corners.
    pub const fn new(a: DVec3, b: DVec3) -> Self {
        Self::in_frame(a, b, LinearTransform::IDENTITY)
    }

    /// Creates a box from two opposite corners expressed in `frame`.
    pub const fn in_frame(a: DVec3, b: DVec3, frame: LinearTransform) -> Self {
        Self {
            corners: [a, b],
            frame,
        }
    }

    /// An axis-aligned world box whose first corner is the bounds minimum.
    pub fn from_bounds(bounds: Bounds3) -> Self {
        Self::new(bounds.min(), bounds.max())
    }

    /// The two corners in frame coordinates, in storage order.
    pub const fn corners(&self) -> [DVec3; 2] {
        self.corners
    }

    /// The frame-to-world transform.
    pub const fn frame(&self) -> &LinearTransform {
        &self.frame
    }

    /// Bounds of the box in frame coordinates.
    pub fn frame_bounds(&self) -> Bounds3 {
        Bounds3::from_corners(self.corners[0], self.corners[1])
    }

    /// Axis-aligned world bounds enclosing all eight transformed corners.
    pub fn bounds(&self) -> Bounds3 {
        let (lo, hi) = (self.corners[0], self.corners[1]);
        let first = self.frame.apply(lo);
        let (min, max) = (1..8_u8)
            .map(|i| {
                let pick = |bit: u8, a: f64, b: f64| if i & bit == 0 { a } else { b };
                DVec3::new(pick(1, lo.x, hi.x), pick(2, lo.y, hi.y), pick(4, lo.z, hi.z))
            })
            .map(|c| self.frame.apply(c))
            .fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Bounds3::from_corners(min, max)
    }

    /// World position of the box center.
    pub fn center(&self) -> DVec3 {
        self.frame.apply(self.frame_bounds().center())
    }

    /// World position of one face center.
    pub fn face_center(&self, axis: Axis, side: Side) -> DVec3 {
        self.frame.apply(self.frame_bounds().face_center(axis, side))
    }

    /// Moves one face by the frame-axis component of the world motion `delta`.
    /// The face never crosses its opposite.
    pub fn move_face(&mut self, axis: Axis, side: Side, delta: DVec3) {
        let i = axis.index();
        let along = self.frame.apply_inverse_vector(delta)[i];
        let first_is_min = self.corners[0][i] <= self.corners[1][i];
        let (moving, fixed) = match (side, first_is_min) {
            (Side::Min, true) | (Side::Max, false) => (0, 1),
            (Side::Min, false) | (Side::Max, true) => (1, 0),
        };
        let limit = self.corners[fixed][i];
        let moved = self.corners[moving][i] + along;
        self.corners[moving][i] = match side {
            Side::Min => moved.min(limit),
            Side::Max => moved.max(limit),
        };
    }

    /// Moves the whole box by the world motion `delta`.
    pub fn translate(&mut self, delta: DVec3) {
        let delta = self.frame.apply_inverse_vector(delta);
        self.corners[0] += delta;
        self.corners[1] += delta;
    }
}

/// Geometry held by a handle representation, in world space.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldGeometry {
    /// A box.
    Box(BoxCorners),
    /// Ordered control points.
    Points(ControlPoints),
}

impl WorldGeometry {
    /// Bounds of a box geometry; `None` for points.
    pub fn bounds(&self) -> Option<Bounds3> {
        match self {
            Self::Box(corners) => Some(corners.bounds()),
            Self::Points(_) => None,
        }
    }

    /// Control points of a point geometry; `None` for boxes.
    pub fn points(&self) -> Option<&[DVec3]> {
        match self {
            Self::Box(_) => None,
            Self::Points(points) => Some(points),
        }
    }
}

/// Maps node-local parameters to world geometry.
///
/// Non-linear and singular transforms are applied as identity.
pub fn to_world(params: &NodeGeometry, transform: &ParentTransform) -> WorldGeometry {
    to_world_with(params, &transform.resolve())
}

/// Maps world geometry back to node-local parameters.
///
/// Applies the inverse of the same transform [`to_world`] would apply.
pub fn to_local(world: &WorldGeometry, transform: &ParentTransform) -> NodeGeometry {
    to_local_with(world, &transform.resolve())
}

/// [`to_world`] with an already resolved transform.
pub fn to_world_with(params: &NodeGeometry, transform: &LinearTransform) -> WorldGeometry {
    match params {
        NodeGeometry::Box(BoxParams { center, radius }) => WorldGeometry::Box(
            BoxCorners::in_frame(*center - *radius, *center + *radius, *transform),
        ),
        NodeGeometry::Points(points) => {
            WorldGeometry::Points(points.iter().map(|p| transform.apply(*p)).collect())
        }
    }
}

/// [`to_local`] with an already resolved transform.
pub fn to_local_with(world: &WorldGeometry, transform: &LinearTransform) -> NodeGeometry {
    match world {
        WorldGeometry::Box(corners) => {
            let [mut a, mut b] = corners.corners();
            if corners.frame() != transform {
                let frame = corners.frame();
                a = transform.apply_inverse(frame.apply(a));
                b = transform.apply_inverse(frame.apply(b));
            }
            NodeGeometry::Box(BoxParams::new((a + b) * 0.5, (b - a) * 0.5))
        }
        WorldGeometry::Points(points) => {
            NodeGeometry::Points(points.iter().map(|p| transform.apply_inverse(*p)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_4;
    use glam::{DMat4, DQuat};

    fn unit_box() -> NodeGeometry {
        NodeGeometry::Box(BoxParams::new(DVec3::ZERO, DVec3::ONE))
    }

    fn rotated_z(angle: f64) -> ParentTransform {
        ParentTransform::Linear(DMat4::from_quat(DQuat::from_rotation_z(angle)))
    }

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).abs().max_element() < 1e-12
    }

    #[test]
    fn identity_box_bounds() {
        let world = to_world(&unit_box(), &ParentTransform::Identity);
        assert_eq!(
            world.bounds().unwrap().to_array(),
            [-1.0, 1.0, -1.0, 1.0, -1.0, 1.0]
        );
    }

    #[test]
    fn edited_bounds_map_to_center_and_radius() {
        let corners = BoxCorners::from_bounds(Bounds3::from_array([-2.0, 2.0, -1.0, 1.0, -1.0, 1.0]));
        let local = to_local(&WorldGeometry::Box(corners), &ParentTransform::Identity);
        assert_eq!(
            local,
            NodeGeometry::Box(BoxParams::new(DVec3::ZERO, DVec3::new(2.0, 1.0, 1.0)))
        );
    }

    #[test]
    fn mirrored_parent_round_trips() {
        let parent = ParentTransform::Linear(DMat4::from_scale(DVec3::new(-1.0, 2.0, 1.0)));
        let params = NodeGeometry::Box(BoxParams::new(DVec3::new(1.0, 2.0, 3.0), DVec3::ONE));
        let world = to_world(&params, &parent);
        assert_eq!(
            world.bounds().unwrap().to_array(),
            [-2.0, 0.0, 2.0, 6.0, 2.0, 4.0]
        );
        assert_eq!(to_local(&world, &parent), params);
    }

    #[test]
    fn rotated_box_bounds_enclose_every_corner() {
        let world = to_world(&unit_box(), &rotated_z(FRAC_PI_4));
        let [x0, x1, y0, y1, z0, z1] = world.bounds().unwrap().to_array();
        let diagonal = 2.0_f64.sqrt();
        for (got, want) in [(x0, -diagonal), (x1, diagonal), (y0, -diagonal), (y1, diagonal)] {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }
        assert_eq!((z0, z1), (-1.0, 1.0));
    }

    #[test]
    fn rotated_face_moves_along_its_own_axis() {
        let parent = rotated_z(FRAC_PI_4);
        let WorldGeometry::Box(mut corners) = to_world(&unit_box(), &parent) else {
            unreachable!("box parameters map to a box");
        };
        let normal = corners.face_center(Axis::X, Side::Max) - corners.center();
        assert!(close(normal, DVec3::new(FRAC_PI_4.cos(), FRAC_PI_4.sin(), 0.0)));

        // Motion across the face normal is ignored.
        corners.move_face(Axis::X, Side::Max, normal + normal.cross(DVec3::Z) * 3.0);
        let local = to_local(&WorldGeometry::Box(corners), &parent);
        let NodeGeometry::Box(params) = local else {
            unreachable!("box geometry maps back to box parameters");
        };
        assert!(close(params.center, DVec3::new(0.5, 0.0, 0.0)));
        assert!(close(params.radius, DVec3::new(1.5, 1.0, 1.0)));
    }

    #[test]
    fn axis_aligned_edit_under_translated_parent() {
        let parent = ParentTransform::Linear(DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0)));
        let edited = BoxCorners::new(DVec3::new(3.0, -1.0, -1.0), DVec3::new(7.0, 1.0, 1.0));
        let local = to_local(&WorldGeometry::Box(edited), &parent);
        let expected = NodeGeometry::Box(BoxParams::new(DVec3::ZERO, DVec3::new(2.0, 1.0, 1.0)));
        assert!(local.relative_eq(&expected, 1e-12), "{local:?}");
    }

    #[test]
    fn face_move_clamps_at_opposite_face() {
        let mut corners = BoxCorners::from_bounds(Bounds3::from_center(DVec3::ZERO, DVec3::ONE));
        corners.move_face(Axis::X, Side::Max, DVec3::new(0.5, 9.0, 0.0));
        assert_eq!(corners.bounds().axis(Axis::X), (-1.0, 1.5));
        corners.move_face(Axis::X, Side::Max, DVec3::new(-10.0, 0.0, 0.0));
        assert_eq!(corners.bounds().axis(Axis::X), (-1.0, -1.0));
        corners.move_face(Axis::Y, Side::Min, DVec3::new(0.0, -1.0, 0.0));
        assert_eq!(corners.bounds().axis(Axis::Y), (-2.0, 1.0));
    }

    #[test]
    fn face_move_respects_flipped_corners() {
        let mut corners = BoxCorners::new(DVec3::new(1.0, -1.0, -1.0), DVec3::new(-1.0, 1.0, 1.0));
        corners.move_face(Axis::X, Side::Max, DVec3::new(2.0, 0.0, 0.0));
        assert_eq!(corners.corners()[0].x, 3.0);
        assert_eq!(corners.corners()[1].x, -1.0);
    }

    #[test]
    fn rotated_points_round_trip() {
        let parent = ParentTransform::Linear(DMat4::from_rotation_translation(
            DQuat::from_rotation_z(0.7),
            DVec3::new(1.0, 2.0, 3.0),
        ));
        let params = NodeGeometry::points([DVec3::ZERO, DVec3::new(4.0, -2.0, 1.0)]);
        let world = to_world(&params, &parent);
        assert!(to_local(&world, &parent).relative_eq(&params, 1e-12));
    }

    #[test]
    fn non_linear_parent_is_identity() {
        let params = NodeGeometry::points([DVec3::new(1.0, 2.0, 3.0)]);
        let world = to_world(&params, &ParentTransform::NonLinear);
        assert_eq!(world.points().unwrap(), &[DVec3::new(1.0, 2.0, 3.0)]);
    }
}
