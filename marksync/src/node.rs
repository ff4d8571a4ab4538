// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document nodes and their identifiers.

use alloc::rc::Rc;
use core::borrow::Borrow;
use core::fmt;

use marksync_geometry::NodeGeometry;

/// Unique identifier of a document node.
///
/// Annotation nodes and transform nodes share one id space. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Rc<str>);

impl NodeId {
    /// Creates an id from a string.
    pub fn new(id: &str) -> Self {
        Self(Rc::from(id))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({:?})", &*self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of an annotation node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// Region of interest: an axis-aligned box.
    Roi,
    /// A single point landmark.
    Fiducial,
    /// A distance between two points.
    Ruler,
    /// An angle between three points.
    Angle,
    /// An open curve through two or more points.
    Spline,
    /// Two perpendicular measurements, four points.
    Bidimensional,
    /// A text label anchored at one point.
    Text,
}

impl AnnotationKind {
    /// Every kind.
    pub const ALL: [Self; 7] = [
        Self::Roi,
        Self::Fiducial,
        Self::Ruler,
        Self::Angle,
        Self::Spline,
        Self::Bidimensional,
        Self::Text,
    ];

    /// Returns `true` if `geometry` has the right shape for this kind.
    pub fn accepts(self, geometry: &NodeGeometry) -> bool {
        match (self, geometry) {
            (Self::Roi, NodeGeometry::Box(_)) => true,
            (Self::Roi, NodeGeometry::Points(_)) | (_, NodeGeometry::Box(_)) => false,
            (Self::Fiducial | Self::Text, NodeGeometry::Points(p)) => p.len() == 1,
            (Self::Ruler, NodeGeometry::Points(p)) => p.len() == 2,
            (Self::Angle, NodeGeometry::Points(p)) => p.len() == 3,
            (Self::Bidimensional, NodeGeometry::Points(p)) => p.len() == 4,
            (Self::Spline, NodeGeometry::Points(p)) => p.len() >= 2,
        }
    }

    /// The single-bit set holding this kind.
    pub const fn as_set(self) -> KindSet {
        match self {
            Self::Roi => KindSet::ROI,
            Self::Fiducial => KindSet::FIDUCIAL,
            Self::Ruler => KindSet::RULER,
            Self::Angle => KindSet::ANGLE,
            Self::Spline => KindSet::SPLINE,
            Self::Bidimensional => KindSet::BIDIMENSIONAL,
            Self::Text => KindSet::TEXT,
        }
    }
}

bitflags::bitflags! {
    /// A set of annotation kinds, used to choose which nodes get handles.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KindSet: u8 {
        /// [`AnnotationKind::Roi`].
        const ROI = 1 << 0;
        /// [`AnnotationKind::Fiducial`].
        const FIDUCIAL = 1 << 1;
        /// [`AnnotationKind::Ruler`].
        const RULER = 1 << 2;
        /// [`AnnotationKind::Angle`].
        const ANGLE = 1 << 3;
        /// [`AnnotationKind::Spline`].
        const SPLINE = 1 << 4;
        /// [`AnnotationKind::Bidimensional`].
        const BIDIMENSIONAL = 1 << 5;
        /// [`AnnotationKind::Text`].
        const TEXT = 1 << 6;
    }
}

impl Default for KindSet {
    fn default() -> Self {
        Self::all()
    }
}

impl KindSet {
    /// Returns `true` if `kind` is in the set.
    pub fn has(self, kind: AnnotationKind) -> bool {
        self.contains(kind.as_set())
    }
}

/// An annotation node as stored by the document scene.
///
/// Geometry is always in the node's local space. The parent transform, if
/// any, is referenced by id and resolved by the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentNode {
    /// Identifier.
    pub id: NodeId,
    /// Kind.
    pub kind: AnnotationKind,
    /// Local geometry.
    pub geometry: NodeGeometry,
    /// Shown in viewers.
    pub visible: bool,
    /// Protected from interactive edits.
    pub locked: bool,
    /// Selected by the user.
    pub selected: bool,
    /// Transform node this node is placed under.
    pub parent_transform: Option<NodeId>,
}

impl DocumentNode {
    /// Creates a visible, unlocked, unselected node with no parent transform.
    pub fn new(id: impl Into<NodeId>, kind: AnnotationKind, geometry: NodeGeometry) -> Self {
        Self {
            id: id.into(),
            kind,
            geometry,
            visible: true,
            locked: false,
            selected: false,
            parent_transform: None,
        }
    }

    /// Places the node under a transform.
    #[must_use]
    pub fn with_parent_transform(mut self, transform: impl Into<NodeId>) -> Self {
        self.parent_transform = Some(transform.into());
        self
    }

    /// Sets the lock state.
    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Sets the visibility.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}
