// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box representation for regions of interest.

use glam::DVec3;
use kurbo::Point;
use marksync_geometry::{Axis, BoxCorners, Side, WorldGeometry};

use crate::hit::hit_point;
use crate::{Hit, HitParams, Interactor, Part, Representation};

/// A box with a handle on each face center and one at its center.
///
/// The box may be rotated by its frame. Face handles move a single face
/// along the face normal; the center handle translates the whole box.
#[derive(Clone, Debug, Default)]
pub struct BoxRepresentation {
    corners: Option<BoxCorners>,
    highlight: Part,
}

impl BoxRepresentation {
    /// Creates an empty box representation.
    pub fn new() -> Self {
        Self::default()
    }

    /// The displayed corners.
    pub fn corners(&self) -> Option<&BoxCorners> {
        self.corners.as_ref()
    }

    fn handles(corners: &BoxCorners) -> impl Iterator<Item = (Part, DVec3)> + '_ {
        // Center first, so it wins ties with faces projected onto it.
        core::iter::once((Part::Body, corners.center())).chain(
            Axis::ALL
                .into_iter()
                .flat_map(|axis| [(axis, Side::Min), (axis, Side::Max)])
                .map(move |(axis, side)| {
                    (Part::Face { axis, side }, corners.face_center(axis, side))
                }),
        )
    }
}

impl Representation for BoxRepresentation {
    fn world_geometry(&self) -> Option<WorldGeometry> {
        self.corners.map(WorldGeometry::Box)
    }

    fn set_world_geometry(&mut self, geometry: WorldGeometry) -> bool {
        match geometry {
            WorldGeometry::Box(corners) => {
                self.corners = Some(corners);
                true
            }
            WorldGeometry::Points(_) => false,
        }
    }

    fn clear(&mut self) {
        self.corners = None;
        self.highlight = Part::Outside;
    }

    fn pick(
        &self,
        interactor: &dyn Interactor,
        position: Point,
        params: &HitParams,
    ) -> Option<Hit> {
        let corners = self.corners.as_ref()?;
        let mut best = None;
        for (part, world) in Self::handles(corners) {
            Hit::keep_best(
                &mut best,
                part,
                hit_point(interactor, world, position, params),
            );
        }
        best
    }

    fn anchor(&self, part: Part) -> Option<DVec3> {
        let corners = self.corners.as_ref()?;
        match part {
            Part::Face { axis, side } => Some(corners.face_center(axis, side)),
            Part::Body => Some(corners.center()),
            Part::Point(_) | Part::Outside => None,
        }
    }

    fn apply_motion(&mut self, part: Part, delta: DVec3) {
        let Some(corners) = self.corners.as_mut() else {
            return;
        };
        match part {
            Part::Face { axis, side } => corners.move_face(axis, side, delta),
            Part::Body => corners.translate(delta),
            Part::Point(_) | Part::Outside => {}
        }
    }

    fn highlight(&self) -> Part {
        self.highlight
    }

    fn set_highlight(&mut self, part: Part) {
        self.highlight = part;
    }
}
