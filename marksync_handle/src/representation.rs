// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The visual and geometric half of a handle.

use core::fmt;

use glam::DVec3;
use kurbo::Point;
use marksync_geometry::{Axis, Side, WorldGeometry};

use crate::{HitParams, HitScore, Interactor};

/// A grabbable part of a representation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Part {
    /// Nothing; the pointer is away from every handle.
    #[default]
    Outside,
    /// One face of a box, moved along its axis.
    Face {
        /// Axis the face is perpendicular to.
        axis: Axis,
        /// Which end of the axis.
        side: Side,
    },
    /// A single control point.
    Point(usize),
    /// The whole shape, translated rigidly.
    Body,
}

/// A pick result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Part under the pointer.
    pub part: Part,
    /// Score used to rank competing hits.
    pub score: HitScore,
}

impl Hit {
    pub(crate) fn keep_best(best: &mut Option<Self>, part: Part, score: Option<HitScore>) {
        let Some(score) = score else {
            return;
        };
        if best.is_none_or(|b| score.beats(&b.score)) {
            *best = Some(Self { part, score });
        }
    }
}

/// World geometry a handle displays and edits, plus how it is picked and moved.
///
/// Implementations hold geometry in world coordinates only. Conversions to
/// and from node-local parameters happen outside, in the sync layer.
pub trait Representation: fmt::Debug {
    /// The current world geometry, or `None` after [`clear`](Self::clear).
    fn world_geometry(&self) -> Option<WorldGeometry>;

    /// Replaces the displayed geometry.
    ///
    /// Returns `false` and leaves the representation unchanged if the
    /// geometry has the wrong shape for it.
    fn set_world_geometry(&mut self, geometry: WorldGeometry) -> bool;

    /// Releases the displayed geometry.
    fn clear(&mut self);

    /// Returns `true` when no geometry is displayed.
    fn is_empty(&self) -> bool {
        self.world_geometry().is_none()
    }

    /// Finds the part under `position`.
    fn pick(&self, interactor: &dyn Interactor, position: Point, params: &HitParams)
    -> Option<Hit>;

    /// World location that a drag of `part` is pinned to.
    fn anchor(&self, part: Part) -> Option<DVec3>;

    /// Moves `part` by the world-space `delta`.
    fn apply_motion(&mut self, part: Part, delta: DVec3);

    /// Currently highlighted part.
    fn highlight(&self) -> Part;

    /// Sets the highlighted part.
    fn set_highlight(&mut self, part: Part);
}
