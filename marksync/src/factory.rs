// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Choosing a representation for an annotation kind.

use alloc::boxed::Box;

use marksync_handle::{BoxRepresentation, ControlPointRepresentation, Representation, Topology};

use crate::AnnotationKind;

/// Builds the representation used for nodes of a given kind.
///
/// This is the only place where kinds map to representation variants.
pub trait RepresentationFactory {
    /// Creates an empty representation for `kind`.
    fn create(&self, kind: AnnotationKind) -> Box<dyn Representation>;
}

impl<F> RepresentationFactory for F
where
    F: Fn(AnnotationKind) -> Box<dyn Representation>,
{
    fn create(&self, kind: AnnotationKind) -> Box<dyn Representation> {
        self(kind)
    }
}

/// The stock kind → representation mapping.
///
/// | Kind | Representation |
/// |---|---|
/// | `Roi` | [`BoxRepresentation`] |
/// | `Fiducial`, `Text` | points, [`Topology::PointSet`] |
/// | `Ruler` | points, [`Topology::Line`] |
/// | `Angle` | points, [`Topology::Angle`] |
/// | `Spline` | points, [`Topology::Spline`] |
/// | `Bidimensional` | points, [`Topology::Caliper`] |
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRepresentations;

impl DefaultRepresentations {
    /// Topology used for a control-point kind, `None` for box kinds.
    pub fn topology(kind: AnnotationKind) -> Option<Topology> {
        match kind {
            AnnotationKind::Roi => None,
            AnnotationKind::Fiducial | AnnotationKind::Text => Some(Topology::PointSet),
            AnnotationKind::Ruler => Some(Topology::Line),
            AnnotationKind::Angle => Some(Topology::Angle),
            AnnotationKind::Spline => Some(Topology::Spline),
            AnnotationKind::Bidimensional => Some(Topology::Caliper),
        }
    }
}

impl RepresentationFactory for DefaultRepresentations {
    fn create(&self, kind: AnnotationKind) -> Box<dyn Representation> {
        match Self::topology(kind) {
            Some(topology) => Box::new(ControlPointRepresentation::new(topology)),
            None => Box::new(BoxRepresentation::new()),
        }
    }
}
