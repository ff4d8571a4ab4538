// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marksync Geometry: node-local annotation parameters ↔ world-space handle geometry.
//!
//! Annotation nodes (regions of interest, fiducials, rulers, angles, splines,
//! bidimensional measurements) store their geometry in their own local space.
//! Interactive handles display and edit that geometry in world space. This
//! crate is the pure, stateless bridge between the two:
//!
//! - [`NodeGeometry`]: the node's semantic parameters, either box
//!   center + half-extents ([`BoxParams`]) or ordered [`ControlPoints`].
//! - [`WorldGeometry`]: what a handle holds, either an oriented box
//!   ([`BoxCorners`]: corners in the parent frame plus that frame) or
//!   transformed control points.
//! - [`ParentTransform`] / [`LinearTransform`]: the node's transform-to-world.
//! - [`Bounds3`]: world bounds in the fixed `(min0, max0, min1, max1, min2, max2)`
//!   order expected by box handles.
//!
//! ## Round trip
//!
//! For every invertible linear parent transform `T` and every parameter set
//! `p`, `to_local(&to_world(&p, &T), &T)` equals `p` up to floating-point
//! rounding. Boxes keep their corners in the parent frame, so a rotated or
//! mirrored parent still shows (and edits) the node's own box, and world
//! bounds enclose all eight transformed corners.
//!
//! ## Unsupported transforms
//!
//! Non-linear parents (and singular or projective matrices) are applied as
//! identity. This mirrors the scope of transforms the viewer supports and is
//! reported at `debug` level through the `log` facade, never as an error.
//!
//! This crate is `no_std` compatible (with `alloc`) when built without the
//! default `std` feature and with `libm`.

#![cfg_attr(not(feature = "std"), no_std)]

mod adapter;
mod bounds;
mod transform;

pub use adapter::{
    BoxCorners, BoxParams, ControlPoints, NodeGeometry, WorldGeometry, to_local, to_local_with,
    to_world, to_world_with,
};
pub use bounds::{Axis, Bounds3, Side};
pub use transform::{LinearTransform, ParentTransform};

pub use glam::{DMat4, DVec3};
