// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory document scene.

use alloc::vec::Vec;

use glam::DMat4;
use hashbrown::{HashMap, HashSet};
use marksync_geometry::{NodeGeometry, ParentTransform};
use smallvec::smallvec;

use crate::{
    DocumentNode, DocumentScene, InteractionMode, NodeChange, NodeId, SceneError, SceneEvent,
    SceneEvents,
};

/// What a transform node does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformKind {
    /// A matrix mapping child space to parent space.
    Linear(DMat4),
    /// A warping transform that handles cannot follow.
    NonLinear,
}

impl TransformKind {
    fn as_parent(self) -> ParentTransform {
        match self {
            Self::Linear(m) => ParentTransform::Linear(m),
            Self::NonLinear => ParentTransform::NonLinear,
        }
    }
}

/// A transform node. Transforms may be placed under other transforms.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformNode {
    /// Identifier, shared with annotation node ids.
    pub id: NodeId,
    /// The transform itself.
    pub kind: TransformKind,
    /// Transform this one is placed under.
    pub parent: Option<NodeId>,
}

impl TransformNode {
    /// A linear transform with no parent.
    pub fn linear(id: impl Into<NodeId>, matrix: DMat4) -> Self {
        Self {
            id: id.into(),
            kind: TransformKind::Linear(matrix),
            parent: None,
        }
    }

    /// A non-linear transform with no parent.
    pub fn non_linear(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            kind: TransformKind::NonLinear,
            parent: None,
        }
    }

    /// Places the transform under another transform.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// A complete [`DocumentScene`] held in memory.
///
/// Every mutator returns the events it fired. Mutations that change nothing
/// fire nothing.
///
/// ```
/// use marksync::{AnnotationKind, DocumentNode, DocumentScene, MemoryScene, SceneEvent};
/// use marksync_geometry::{BoxParams, DVec3, NodeGeometry};
///
/// let mut scene = MemoryScene::new();
/// let geometry = NodeGeometry::Box(BoxParams::new(DVec3::ZERO, DVec3::ONE));
/// let events = scene
///     .add_node(DocumentNode::new("roi", AnnotationKind::Roi, geometry.clone()))
///     .unwrap();
/// assert_eq!(events.as_slice(), [SceneEvent::NodeAdded("roi".into())]);
///
/// // Writing the same geometry back is silent.
/// assert!(scene.set_geometry(&"roi".into(), geometry).unwrap().is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryScene {
    nodes: HashMap<NodeId, DocumentNode>,
    order: Vec<NodeId>,
    transforms: HashMap<NodeId, TransformNode>,
    importing: bool,
    mode: InteractionMode,
}

impl MemoryScene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of annotation nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if there are no annotation nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a transform node.
    pub fn transform(&self, id: &NodeId) -> Option<&TransformNode> {
        self.transforms.get(id)
    }

    fn id_in_use(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id) || self.transforms.contains_key(id)
    }

    fn check_transform(&self, transform: Option<&NodeId>) -> Result<(), SceneError> {
        match transform {
            Some(t) if !self.transforms.contains_key(t) => {
                Err(SceneError::UnknownTransform(t.clone()))
            }
            _ => Ok(()),
        }
    }

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut DocumentNode, SceneError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| SceneError::UnknownNode(id.clone()))
    }

    /// Inserts a node.
    pub fn add_node(&mut self, node: DocumentNode) -> Result<SceneEvents, SceneError> {
        if self.id_in_use(&node.id) {
            return Err(SceneError::DuplicateNode(node.id));
        }
        if !node.kind.accepts(&node.geometry) {
            return Err(SceneError::GeometryMismatch(node.id));
        }
        self.check_transform(node.parent_transform.as_ref())?;
        let id = node.id.clone();
        self.order.push(id.clone());
        self.nodes.insert(id.clone(), node);
        Ok(smallvec![SceneEvent::NodeAdded(id)])
    }

    /// Removes a node.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<SceneEvents, SceneError> {
        if self.nodes.remove(id).is_none() {
            return Err(SceneError::UnknownNode(id.clone()));
        }
        self.order.retain(|n| n != id);
        Ok(smallvec![SceneEvent::NodeRemoved(id.clone())])
    }

    fn modify(
        &mut self,
        id: &NodeId,
        change: NodeChange,
        apply: impl FnOnce(&mut DocumentNode) -> bool,
    ) -> Result<SceneEvents, SceneError> {
        let changed = apply(self.node_mut(id)?);
        Ok(if changed {
            smallvec![SceneEvent::NodeModified {
                node: id.clone(),
                change,
            }]
        } else {
            SceneEvents::new()
        })
    }

    /// Shows or hides a node.
    pub fn set_visible(&mut self, id: &NodeId, visible: bool) -> Result<SceneEvents, SceneError> {
        self.modify(id, NodeChange::DISPLAY, |n| {
            core::mem::replace(&mut n.visible, visible) != visible
        })
    }

    /// Locks or unlocks a node.
    pub fn set_locked(&mut self, id: &NodeId, locked: bool) -> Result<SceneEvents, SceneError> {
        self.modify(id, NodeChange::LOCK, |n| {
            core::mem::replace(&mut n.locked, locked) != locked
        })
    }

    /// Selects or deselects a node.
    pub fn set_selected(&mut self, id: &NodeId, selected: bool) -> Result<SceneEvents, SceneError> {
        self.modify(id, NodeChange::SELECTION, |n| {
            core::mem::replace(&mut n.selected, selected) != selected
        })
    }

    /// Places a node under a transform, or at world level with `None`.
    pub fn set_parent_transform(
        &mut self,
        id: &NodeId,
        transform: Option<NodeId>,
    ) -> Result<SceneEvents, SceneError> {
        self.check_transform(transform.as_ref())?;
        self.modify(id, NodeChange::TRANSFORM, |n| {
            let changed = n.parent_transform != transform;
            n.parent_transform = transform;
            changed
        })
    }

    /// Inserts a transform node.
    ///
    /// Nothing references a new transform yet, so nothing fires.
    pub fn add_transform(&mut self, transform: TransformNode) -> Result<SceneEvents, SceneError> {
        if self.id_in_use(&transform.id) {
            return Err(SceneError::DuplicateNode(transform.id));
        }
        self.check_transform(transform.parent.as_ref())?;
        self.transforms.insert(transform.id.clone(), transform);
        Ok(SceneEvents::new())
    }

    /// Replaces what a transform does.
    pub fn set_transform(
        &mut self,
        id: &NodeId,
        kind: TransformKind,
    ) -> Result<SceneEvents, SceneError> {
        let transform = self
            .transforms
            .get_mut(id)
            .ok_or_else(|| SceneError::UnknownTransform(id.clone()))?;
        if transform.kind == kind {
            return Ok(SceneEvents::new());
        }
        transform.kind = kind;
        Ok(smallvec![SceneEvent::TransformModified(id.clone())])
    }

    /// Places a transform under another transform, or at world level.
    pub fn set_transform_parent(
        &mut self,
        id: &NodeId,
        parent: Option<NodeId>,
    ) -> Result<SceneEvents, SceneError> {
        self.check_transform(parent.as_ref())?;
        let transform = self
            .transforms
            .get_mut(id)
            .ok_or_else(|| SceneError::UnknownTransform(id.clone()))?;
        if transform.parent == parent {
            return Ok(SceneEvents::new());
        }
        transform.parent = parent;
        Ok(smallvec![SceneEvent::TransformModified(id.clone())])
    }

    /// Removes a transform. Nodes and transforms placed under it move to
    /// world level.
    pub fn remove_transform(&mut self, id: &NodeId) -> Result<SceneEvents, SceneError> {
        if self.transforms.remove(id).is_none() {
            return Err(SceneError::UnknownTransform(id.clone()));
        }
        let mut events = SceneEvents::new();
        for t in self.transforms.values_mut() {
            if t.parent.as_ref() == Some(id) {
                t.parent = None;
                events.push(SceneEvent::TransformModified(t.id.clone()));
            }
        }
        for node_id in &self.order {
            if let Some(node) = self.nodes.get_mut(node_id)
                && node.parent_transform.as_ref() == Some(id)
            {
                node.parent_transform = None;
                events.push(SceneEvent::NodeModified {
                    node: node_id.clone(),
                    change: NodeChange::TRANSFORM,
                });
            }
        }
        Ok(events)
    }

    /// Starts a batch import.
    pub fn begin_import(&mut self) -> SceneEvents {
        if self.importing {
            return SceneEvents::new();
        }
        self.importing = true;
        smallvec![SceneEvent::ImportStarted]
    }

    /// Finishes a batch import.
    pub fn end_import(&mut self) -> SceneEvents {
        if !self.importing {
            return SceneEvents::new();
        }
        self.importing = false;
        smallvec![SceneEvent::ImportEnded]
    }

    /// Changes the interaction mode.
    pub fn set_interaction_mode(&mut self, mode: InteractionMode) -> SceneEvents {
        if self.mode == mode {
            return SceneEvents::new();
        }
        self.mode = mode;
        smallvec![SceneEvent::InteractionModeModified]
    }

    /// Clears every node and transform.
    ///
    /// Per-node removal events are not fired; observers get `Closing` and
    /// `Closed` and must drop everything they track.
    pub fn close(&mut self) -> SceneEvents {
        self.nodes.clear();
        self.order.clear();
        self.transforms.clear();
        self.importing = false;
        smallvec![SceneEvent::Closing, SceneEvent::Closed]
    }
}

impl DocumentScene for MemoryScene {
    fn node(&self, id: &NodeId) -> Option<&DocumentNode> {
        self.nodes.get(id)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    fn transform_to_world(&self, id: &NodeId) -> ParentTransform {
        let Some(mut next) = self.nodes.get(id).and_then(|n| n.parent_transform.clone()) else {
            return ParentTransform::Identity;
        };
        let mut to_world = ParentTransform::Identity;
        let mut seen = HashSet::new();
        loop {
            if !seen.insert(next.clone()) {
                log::debug!("transform cycle through {next} treated as non-linear");
                return ParentTransform::NonLinear;
            }
            let Some(transform) = self.transforms.get(&next) else {
                return to_world;
            };
            to_world = transform.kind.as_parent().then_child(to_world);
            match &transform.parent {
                Some(parent) => next = parent.clone(),
                None => return to_world,
            }
        }
    }

    fn set_geometry(
        &mut self,
        id: &NodeId,
        geometry: NodeGeometry,
    ) -> Result<SceneEvents, SceneError> {
        let node = self.node_mut(id)?;
        if !node.kind.accepts(&geometry) {
            return Err(SceneError::GeometryMismatch(id.clone()));
        }
        if node.geometry == geometry {
            return Ok(SceneEvents::new());
        }
        node.geometry = geometry;
        Ok(smallvec![SceneEvent::NodeModified {
            node: id.clone(),
            change: NodeChange::GEOMETRY,
        }])
    }

    fn is_importing(&self) -> bool {
        self.importing
    }

    fn interaction_mode(&self) -> InteractionMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnnotationKind;
    use glam::DVec3;
    use marksync_geometry::BoxParams;

    fn roi(id: &str) -> DocumentNode {
        DocumentNode::new(
            id,
            AnnotationKind::Roi,
            NodeGeometry::Box(BoxParams::new(DVec3::ZERO, DVec3::ONE)),
        )
    }

    fn offset(id: &str, x: f64) -> TransformNode {
        TransformNode::linear(id, DMat4::from_translation(DVec3::new(x, 0.0, 0.0)))
    }

    #[test]
    fn duplicate_and_mismatched_nodes_are_rejected() {
        let mut scene = MemoryScene::new();
        scene.add_node(roi("a")).unwrap();
        assert_eq!(
            scene.add_node(roi("a")),
            Err(SceneError::DuplicateNode("a".into()))
        );
        let bad = DocumentNode::new("b", AnnotationKind::Ruler, NodeGeometry::points([DVec3::ZERO]));
        assert_eq!(
            scene.add_node(bad),
            Err(SceneError::GeometryMismatch("b".into()))
        );
        assert_eq!(
            scene.add_node(roi("c").with_parent_transform("nope")),
            Err(SceneError::UnknownTransform("nope".into()))
        );
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn setters_fire_only_on_change() {
        let mut scene = MemoryScene::new();
        scene.add_node(roi("a")).unwrap();
        let id = NodeId::new("a");
        assert!(scene.set_visible(&id, true).unwrap().is_empty());
        assert_eq!(
            scene.set_locked(&id, true).unwrap().as_slice(),
            [SceneEvent::NodeModified {
                node: id.clone(),
                change: NodeChange::LOCK
            }]
        );
        assert!(scene.set_locked(&id, true).unwrap().is_empty());
        assert_eq!(
            scene.set_selected(&"zz".into(), true),
            Err(SceneError::UnknownNode("zz".into()))
        );
    }

    #[test]
    fn transform_chains_compose() {
        let mut scene = MemoryScene::new();
        scene.add_transform(offset("outer", 10.0)).unwrap();
        scene
            .add_transform(offset("inner", 5.0).with_parent("outer"))
            .unwrap();
        scene.add_node(roi("a").with_parent_transform("inner")).unwrap();
        let ParentTransform::Linear(m) = scene.transform_to_world(&"a".into()) else {
            panic!("expected a linear transform");
        };
        assert_eq!(m.transform_point3(DVec3::ZERO), DVec3::new(15.0, 0.0, 0.0));
    }

    #[test]
    fn non_linear_links_and_cycles_are_non_linear() {
        let mut scene = MemoryScene::new();
        scene.add_transform(TransformNode::non_linear("warp")).unwrap();
        scene.add_transform(offset("t", 1.0).with_parent("warp")).unwrap();
        scene.add_node(roi("a").with_parent_transform("t")).unwrap();
        assert_eq!(scene.transform_to_world(&"a".into()), ParentTransform::NonLinear);

        scene.add_transform(offset("u", 1.0)).unwrap();
        scene.set_transform_parent(&"u".into(), Some("v".into())).unwrap_err();
        scene.add_transform(offset("v", 1.0).with_parent("u")).unwrap();
        scene.set_transform_parent(&"u".into(), Some("v".into())).unwrap();
        scene.set_parent_transform(&"a".into(), Some("u".into())).unwrap();
        assert_eq!(scene.transform_to_world(&"a".into()), ParentTransform::NonLinear);
    }

    #[test]
    fn removing_a_transform_reparents_to_world() {
        let mut scene = MemoryScene::new();
        scene.add_transform(offset("t", 1.0)).unwrap();
        scene.add_node(roi("a").with_parent_transform("t")).unwrap();
        let events = scene.remove_transform(&"t".into()).unwrap();
        assert_eq!(
            events.as_slice(),
            [SceneEvent::NodeModified {
                node: "a".into(),
                change: NodeChange::TRANSFORM
            }]
        );
        assert_eq!(scene.transform_to_world(&"a".into()), ParentTransform::Identity);
    }

    #[test]
    fn close_empties_the_scene() {
        let mut scene = MemoryScene::new();
        scene.add_node(roi("a")).unwrap();
        scene.begin_import();
        assert_eq!(
            scene.close().as_slice(),
            [SceneEvent::Closing, SceneEvent::Closed]
        );
        assert!(scene.is_empty());
        assert!(scene.node_ids().is_empty());
        assert!(!scene.is_importing());
    }

    #[test]
    fn import_and_mode_toggle_once() {
        let mut scene = MemoryScene::new();
        assert_eq!(scene.begin_import().as_slice(), [SceneEvent::ImportStarted]);
        assert!(scene.begin_import().is_empty());
        assert_eq!(scene.end_import().as_slice(), [SceneEvent::ImportEnded]);
        assert_eq!(
            scene.set_interaction_mode(InteractionMode::Place).as_slice(),
            [SceneEvent::InteractionModeModified]
        );
        assert!(scene.set_interaction_mode(InteractionMode::Place).is_empty());
    }
}
