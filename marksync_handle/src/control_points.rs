// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control-point representations: point sets, lines, splines and calipers.

use glam::DVec3;
use kurbo::Point;
use marksync_geometry::{ControlPoints, WorldGeometry};

use crate::hit::{hit_point, hit_segment};
use crate::{Hit, HitParams, Interactor, Part, Representation};

/// How control points are connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Unconnected points.
    PointSet,
    /// Exactly two points joined by one segment.
    Line,
    /// Two or more points joined in order.
    Spline,
    /// Exactly three points, `0-1-2`, with the vertex in the middle.
    Angle,
    /// Two crossing segments, `0-1` and `2-3`.
    Caliper,
}

impl Topology {
    /// Returns `true` if `count` control points fit this topology.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::PointSet => count >= 1,
            Self::Line => count == 2,
            Self::Spline => count >= 2,
            Self::Angle => count == 3,
            Self::Caliper => count == 4,
        }
    }

    /// Index pairs of the segments joining `count` points.
    pub fn segments(self, count: usize) -> impl Iterator<Item = (usize, usize)> {
        let (pairs, step) = match self {
            Self::PointSet => (0, 1),
            Self::Line => (1, 1),
            Self::Spline => (count.saturating_sub(1), 1),
            Self::Angle => (2, 1),
            Self::Caliper => (2, 2),
        };
        (0..pairs)
            .map(move |i| (i * step, i * step + 1))
            .filter(move |&(_, b)| b < count)
    }
}

/// Point handles, optionally joined by segments.
///
/// Each point is grabbed individually. Grabbing a segment, or using the
/// translate modifier, moves all points together.
#[derive(Clone, Debug)]
pub struct ControlPointRepresentation {
    topology: Topology,
    points: ControlPoints,
    highlight: Part,
}

impl ControlPointRepresentation {
    /// Creates an empty representation with the given topology.
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            points: ControlPoints::new(),
            highlight: Part::Outside,
        }
    }

    /// The connection topology.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// The displayed control points.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    fn centroid(&self) -> Option<DVec3> {
        if self.points.is_empty() {
            return None;
        }
        let sum: DVec3 = self.points.iter().copied().sum();
        Some(sum / self.points.len() as f64)
    }
}

impl Representation for ControlPointRepresentation {
    fn world_geometry(&self) -> Option<WorldGeometry> {
        (!self.points.is_empty()).then(|| WorldGeometry::Points(self.points.clone()))
    }

    fn set_world_geometry(&mut self, geometry: WorldGeometry) -> bool {
        match geometry {
            WorldGeometry::Points(points) if self.topology.accepts(points.len()) => {
                self.points = points;
                if let Part::Point(i) = self.highlight
                    && i >= self.points.len()
                {
                    self.highlight = Part::Outside;
                }
                true
            }
            _ => false,
        }
    }

    fn clear(&mut self) {
        self.points.clear();
        self.highlight = Part::Outside;
    }

    fn pick(
        &self,
        interactor: &dyn Interactor,
        position: Point,
        params: &HitParams,
    ) -> Option<Hit> {
        let mut best = None;
        for (i, &p) in self.points.iter().enumerate() {
            Hit::keep_best(
                &mut best,
                Part::Point(i),
                hit_point(interactor, p, position, params),
            );
        }
        for (a, b) in self.topology.segments(self.points.len()) {
            Hit::keep_best(
                &mut best,
                Part::Body,
                hit_segment(interactor, self.points[a], self.points[b], position, params),
            );
        }
        best
    }

    fn anchor(&self, part: Part) -> Option<DVec3> {
        match part {
            Part::Point(i) => self.points.get(i).copied(),
            Part::Body => self.centroid(),
            Part::Face { .. } | Part::Outside => None,
        }
    }

    fn apply_motion(&mut self, part: Part, delta: DVec3) {
        match part {
            Part::Point(i) => {
                if let Some(p) = self.points.get_mut(i) {
                    *p += delta;
                }
            }
            Part::Body => self.points.iter_mut().for_each(|p| *p += delta),
            Part::Face { .. } | Part::Outside => {}
        }
    }

    fn highlight(&self) -> Part {
        self.highlight
    }

    fn set_highlight(&mut self, part: Part) {
        self.highlight = part;
    }
}
