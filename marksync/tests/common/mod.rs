// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures: one viewer observing one in-memory scene.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::rc::Rc;

use kurbo::Size;
use marksync::{
    AnnotationKind, DocumentNode, DocumentScene, MemoryScene, NodeId, SceneEvents, SyncConfig,
    SyncManager,
};
use marksync_geometry::{BoxParams, DVec3, NodeGeometry, WorldGeometry};
use marksync_handle::{HandleEvent, InteractiveHandle, Interactor, ViewProjection};
use marksync_render::{LocalIdleQueue, RenderScheduler};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Orthographic top view: 1 world unit == 10 px, world origin at (100, 100).
pub fn camera() -> Rc<dyn Interactor> {
    Rc::new(ViewProjection::orthographic(DVec3::ZERO, 10.0, Size::new(200.0, 200.0)).unwrap())
}

pub fn roi(id: &str, center: DVec3, radius: DVec3) -> DocumentNode {
    DocumentNode::new(
        id,
        AnnotationKind::Roi,
        NodeGeometry::Box(BoxParams::new(center, radius)),
    )
}

pub fn fiducial(id: &str, at: DVec3) -> DocumentNode {
    DocumentNode::new(id, AnnotationKind::Fiducial, NodeGeometry::points([at]))
}

pub fn assert_close(actual: DVec3, expected: DVec3) {
    assert!(
        (actual - expected).abs().max_element() < 1e-9,
        "{actual:?} != {expected:?}"
    );
}

pub struct Viewer {
    pub scene: MemoryScene,
    pub manager: SyncManager,
    pub queue: LocalIdleQueue,
}

impl Viewer {
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        Self::with_setup(|manager| manager.with_config(config))
    }

    /// A viewer whose manager is customized by `setup` before use.
    pub fn with_setup(setup: impl FnOnce(SyncManager) -> SyncManager) -> Self {
        init_logging();
        let queue = LocalIdleQueue::new();
        let scheduler = RenderScheduler::new(|| {}, Rc::new(queue.clone()));
        let mut viewer = Self {
            scene: MemoryScene::new(),
            manager: setup(SyncManager::new(scheduler)),
            queue,
        };
        viewer.manager.set_interactor(&mut viewer.scene, Some(camera()));
        viewer.queue.run_pending();
        viewer
    }

    pub fn deliver(&mut self, events: SceneEvents) {
        for event in &events {
            self.manager.process_scene_event(&self.scene, event);
        }
    }

    pub fn add(&mut self, node: DocumentNode) {
        let events = self.scene.add_node(node).unwrap();
        self.deliver(events);
    }

    pub fn handle(&self, id: &str) -> &InteractiveHandle {
        self.manager
            .registry()
            .get(&NodeId::new(id))
            .unwrap_or_else(|| panic!("no handle for {id}"))
            .handle()
    }

    pub fn world_bounds(&self, id: &str) -> [f64; 6] {
        self.handle(id)
            .world_geometry()
            .and_then(|g| g.bounds())
            .unwrap()
            .to_array()
    }

    pub fn node_geometry(&self, id: &str) -> NodeGeometry {
        self.scene.node(&NodeId::new(id)).unwrap().geometry.clone()
    }

    /// Sets a handle's geometry as a drag would, then reports `event` for it.
    pub fn commit(&mut self, id: &str, world: WorldGeometry, event: HandleEvent) -> SceneEvents {
        let id = NodeId::new(id);
        let entry = self.manager.registry_mut().get_mut(&id).unwrap();
        assert!(entry.handle_mut().set_world_geometry(world));
        let bound = entry.binding().forward(event);
        self.manager.process_handle_event(&mut self.scene, bound)
    }
}
