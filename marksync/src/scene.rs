// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document scene interface and the events it fires.

use alloc::vec::Vec;
use core::fmt;

use marksync_geometry::{NodeGeometry, ParentTransform};
use smallvec::SmallVec;

use crate::{DocumentNode, NodeId};

bitflags::bitflags! {
    /// What changed on a modified node.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeChange: u8 {
        /// Local geometry.
        const GEOMETRY = 1 << 0;
        /// Visibility.
        const DISPLAY = 1 << 1;
        /// Lock state.
        const LOCK = 1 << 2;
        /// Selection state.
        const SELECTION = 1 << 3;
        /// The parent transform reference.
        const TRANSFORM = 1 << 4;
    }
}

/// How pointer input in the viewers is currently interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InteractionMode {
    /// Viewing and editing existing annotations.
    #[default]
    ViewTransform,
    /// Placing new annotations; existing handles must not grab input.
    Place,
}

/// A notification fired by the document scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    /// A node was inserted.
    NodeAdded(NodeId),
    /// A node was removed.
    NodeRemoved(NodeId),
    /// A node's state changed.
    NodeModified {
        /// The node.
        node: NodeId,
        /// What changed.
        change: NodeChange,
    },
    /// A transform node changed; nodes beneath it moved in world space.
    TransformModified(NodeId),
    /// The interaction mode changed.
    InteractionModeModified,
    /// A batch import started. Node additions that follow are partial.
    ImportStarted,
    /// The batch import finished.
    ImportEnded,
    /// The scene is about to be cleared.
    Closing,
    /// The scene was cleared.
    Closed,
}

/// Events fired by one scene mutation, in firing order.
pub type SceneEvents = SmallVec<[SceneEvent; 2]>;

/// Error returned by scene mutators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneError {
    /// No node with this id exists.
    UnknownNode(NodeId),
    /// A node or transform with this id already exists.
    DuplicateNode(NodeId),
    /// The referenced transform does not exist.
    UnknownTransform(NodeId),
    /// The geometry does not fit the node kind.
    GeometryMismatch(NodeId),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "no node with id {id}"),
            Self::DuplicateNode(id) => write!(f, "id {id} is already in use"),
            Self::UnknownTransform(id) => write!(f, "no transform with id {id}"),
            Self::GeometryMismatch(id) => write!(f, "geometry does not fit the kind of node {id}"),
        }
    }
}

impl core::error::Error for SceneError {}

/// The document model, as seen by the synchronization layer.
///
/// Mutators return the events they fired instead of calling observers. The
/// caller that performed a mutation delivers those events to whoever needs
/// them.
pub trait DocumentScene {
    /// Looks up a node. Stale ids yield `None`.
    fn node(&self, id: &NodeId) -> Option<&DocumentNode>;

    /// Ids of every annotation node, in a stable order.
    fn node_ids(&self) -> Vec<NodeId>;

    /// The resolved transform from the node's local space to world.
    fn transform_to_world(&self, id: &NodeId) -> ParentTransform;

    /// Replaces a node's local geometry.
    ///
    /// Setting geometry equal to the current one fires nothing.
    fn set_geometry(&mut self, id: &NodeId, geometry: NodeGeometry)
    -> Result<SceneEvents, SceneError>;

    /// Returns `true` while a batch import is in progress.
    fn is_importing(&self) -> bool;

    /// The current interaction mode.
    fn interaction_mode(&self) -> InteractionMode;
}
