// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounds in the fixed six-scalar ordering used by box handles.

use glam::DVec3;

/// A coordinate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// First axis (R / x).
    X,
    /// Second axis (A / y).
    Y,
    /// Third axis (S / z).
    Z,
}

impl Axis {
    /// All axes in order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Index of the axis into a vector.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Which end of an axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The minimum face.
    Min,
    /// The maximum face.
    Max,
}

/// Axis-aligned bounds stored as `(min0, max0, min1, max1, min2, max2)`.
///
/// The ordering is a fixed contract with box representations. Every
/// constructor reorders its input so that `min <= max` holds on each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds3([f64; 6]);

impl Bounds3 {
    /// Bounds spanned by two arbitrary corner points.
    pub fn from_corners(a: DVec3, b: DVec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self([min.x, max.x, min.y, max.y, min.z, max.z])
    }

    /// Bounds from six scalars, swapping any pair given as `(max, min)`.
    pub fn from_array(values: [f64; 6]) -> Self {
        Self::from_corners(
            DVec3::new(values[0], values[2], values[4]),
            DVec3::new(values[1], values[3], values[5]),
        )
    }

    /// Bounds around `center` extending `half_extents` along each axis.
    pub fn from_center(center: DVec3, half_extents: DVec3) -> Self {
        Self::from_corners(center - half_extents, center + half_extents)
    }

    /// The six scalars in `(min0, max0, min1, max1, min2, max2)` order.
    pub const fn to_array(self) -> [f64; 6] {
        self.0
    }

    /// The minimum corner.
    pub fn min(&self) -> DVec3 {
        DVec3::new(self.0[0], self.0[2], self.0[4])
    }

    /// The maximum corner.
    pub fn max(&self) -> DVec3 {
        DVec3::new(self.0[1], self.0[3], self.0[5])
    }

    /// `(min, max)` along one axis.
    pub fn axis(&self, axis: Axis) -> (f64, f64) {
        let i = axis.index() * 2;
        (self.0[i], self.0[i + 1])
    }

    /// The center point.
    pub fn center(&self) -> DVec3 {
        (self.min() + self.max()) * 0.5
    }

    /// Half of the size along each axis.
    pub fn half_extents(&self) -> DVec3 {
        (self.max() - self.min()) * 0.5
    }

    /// The center of one face.
    pub fn face_center(&self, axis: Axis, side: Side) -> DVec3 {
        let mut point = self.center();
        let (min, max) = self.axis(axis);
        point[axis.index()] = match side {
            Side::Min => min,
            Side::Max => max,
        };
        point
    }
}
