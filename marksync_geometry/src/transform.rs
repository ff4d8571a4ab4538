// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parent transforms and their resolution to an applicable linear transform.

use glam::{DMat4, DVec3, DVec4};

/// Transform-to-world of a node, as reported by the document scene.
///
/// Only linear (affine, invertible) transforms can be applied to handle
/// geometry. Everything else resolves to identity in [`ParentTransform::resolve`];
/// this is a known limitation of the conversion, not an error.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ParentTransform {
    /// The node has no parent transform.
    #[default]
    Identity,
    /// A 4×4 matrix mapping node-local coordinates to world coordinates.
    Linear(DMat4),
    /// A warping transform (grid, b-spline, ...). Unsupported for handles.
    NonLinear,
}

impl ParentTransform {
    /// Composes `self` (parent-to-world) with `child` (node-to-parent).
    ///
    /// The result maps node-local coordinates to world. A non-linear link
    /// anywhere makes the whole chain non-linear.
    #[must_use]
    pub fn then_child(self, child: Self) -> Self {
        match (self, child) {
            (Self::NonLinear, _) | (_, Self::NonLinear) => Self::NonLinear,
            (Self::Identity, other) | (other, Self::Identity) => other,
            (Self::Linear(parent), Self::Linear(child)) => Self::Linear(parent * child),
        }
    }

    /// Resolves to a transform the adapter can apply in both directions.
    ///
    /// Non-linear and singular transforms resolve to identity.
    pub fn resolve(&self) -> LinearTransform {
        match self {
            Self::Identity => LinearTransform::IDENTITY,
            Self::Linear(matrix) => LinearTransform::new(*matrix).unwrap_or_else(|| {
                log::debug!("singular or projective parent transform treated as identity");
                LinearTransform::IDENTITY
            }),
            Self::NonLinear => {
                log::debug!("non-linear parent transform treated as identity");
                LinearTransform::IDENTITY
            }
        }
    }
}

/// An invertible affine transform together with its inverse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearTransform {
    forward: DMat4,
    inverse: DMat4,
}

impl Default for LinearTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl LinearTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        forward: DMat4::IDENTITY,
        inverse: DMat4::IDENTITY,
    };

    /// Builds a transform from an affine matrix.
    ///
    /// Returns `None` when the matrix is not finite, has a projective bottom
    /// row, or cannot be inverted.
    pub fn new(matrix: DMat4) -> Option<Self> {
        if !matrix.is_finite() || matrix.row(3) != DVec4::W {
            return None;
        }
        let det = matrix.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inverse = matrix.inverse();
        inverse.is_finite().then_some(Self {
            forward: matrix,
            inverse,
        })
    }

    /// Maps a local point to world.
    #[inline]
    pub fn apply(&self, point: DVec3) -> DVec3 {
        self.forward.transform_point3(point)
    }

    /// Maps a world point back to local.
    #[inline]
    pub fn apply_inverse(&self, point: DVec3) -> DVec3 {
        self.inverse.transform_point3(point)
    }

    /// Maps a world displacement back to local, ignoring translation.
    #[inline]
    pub fn apply_inverse_vector(&self, vector: DVec3) -> DVec3 {
        self.inverse.transform_vector3(vector)
    }
}
