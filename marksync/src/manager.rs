// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The synchronization hub between document nodes and handles.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;
use marksync_geometry::{to_local, to_world};
use marksync_handle::{HandleEvent, Hit, Interactor, Modifiers};
use marksync_render::RenderScheduler;

use crate::guard::{GuardFlags, Source};
use crate::{
    BoundEvent, DefaultRepresentations, DocumentScene, InteractionMode, NodeId, RegistryEntry,
    RepresentationFactory, SceneEvent, SceneEvents, SyncConfig, UndoSink, WidgetRegistry,
};

/// Counters describing what a [`SyncManager`] has done.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Scene events handled.
    pub scene_events: u64,
    /// Handle events handled.
    pub handle_events: u64,
    /// Calls dropped because the manager was already processing an event.
    pub suppressed: u64,
    /// Events that referred to a node or handle that no longer exists.
    pub missing: u64,
    /// Scene writes that the scene refused.
    pub rejected_writes: u64,
}

/// Keeps handles and document nodes consistent in both directions.
///
/// - Scene → handles: [`process_scene_event`](Self::process_scene_event)
///   creates, updates and destroys handles as nodes come and go.
/// - Handles → scene: [`process_handle_event`](Self::process_handle_event)
///   writes dragged geometry back into the node.
///
/// Writing a node fires scene events, which would normally flow back into the
/// handle that caused them. The manager breaks that loop with two
/// "processing" flags: while either is set, every entry point returns
/// immediately. Suppressed calls are counted in [`SyncStats::suppressed`].
///
/// ```
/// use std::rc::Rc;
/// use marksync::{AnnotationKind, DocumentNode, MemoryScene, SyncManager};
/// use marksync_geometry::{BoxParams, DVec3, NodeGeometry};
/// use marksync_render::{LocalIdleQueue, RenderScheduler};
///
/// let queue = LocalIdleQueue::new();
/// let mut manager = SyncManager::new(RenderScheduler::new(|| {}, Rc::new(queue.clone())));
/// let mut scene = MemoryScene::new();
///
/// let roi = DocumentNode::new(
///     "roi",
///     AnnotationKind::Roi,
///     NodeGeometry::Box(BoxParams::new(DVec3::ZERO, DVec3::ONE)),
/// );
/// for event in scene.add_node(roi).unwrap() {
///     manager.process_scene_event(&scene, &event);
/// }
///
/// let handle = manager.registry().get(&"roi".into()).unwrap().handle();
/// let bounds = handle.world_geometry().unwrap().bounds().unwrap();
/// assert_eq!(bounds.to_array(), [-1.0, 1.0, -1.0, 1.0, -1.0, 1.0]);
///
/// queue.run_pending();
/// assert_eq!(manager.scheduler().frames(), 1);
/// ```
pub struct SyncManager {
    registry: WidgetRegistry,
    factory: Box<dyn RepresentationFactory>,
    scheduler: RenderScheduler,
    guard: Rc<GuardFlags>,
    config: SyncConfig,
    undo: Option<Box<dyn UndoSink>>,
    stats: SyncStats,
}

impl fmt::Debug for SyncManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncManager")
            .field("registry", &self.registry)
            .field("scheduler", &self.scheduler)
            .field("guard", &self.guard)
            .field("config", &self.config)
            .field("undo", &self.undo.is_some())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl SyncManager {
    /// Creates a manager with the default configuration and representations.
    pub fn new(scheduler: RenderScheduler) -> Self {
        let config = SyncConfig::default();
        Self {
            registry: WidgetRegistry::new(config.interaction),
            factory: Box::new(DefaultRepresentations),
            scheduler,
            guard: Rc::new(GuardFlags::default()),
            config,
            undo: None,
            stats: SyncStats::default(),
        }
    }

    /// Replaces the configuration.
    ///
    /// Handles of kinds the new configuration excludes are destroyed.
    /// Nodes of newly included kinds get handles on their next scene
    /// event or on [`update_from_scene`](Self::update_from_scene).
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        let excluded: Vec<NodeId> = self
            .registry
            .iter()
            .filter(|(_, entry)| !config.kinds.has(entry.kind()))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &excluded {
            self.registry.remove(id);
        }
        self.registry.set_params(config.interaction);
        self.config = config;
        self
    }

    /// Replaces the kind → representation mapping.
    #[must_use]
    pub fn with_factory(mut self, factory: impl RepresentationFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// Installs a sink notified when an interactive edit begins.
    #[must_use]
    pub fn with_undo_sink(mut self, undo: impl UndoSink + 'static) -> Self {
        self.undo = Some(Box::new(undo));
        self
    }

    /// The handle table.
    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// Mutable access to the handle table, for programmatic handle edits.
    ///
    /// Changes made here reach the scene only through
    /// [`process_handle_event`](Self::process_handle_event).
    pub fn registry_mut(&mut self) -> &mut WidgetRegistry {
        &mut self.registry
    }

    /// The render scheduler.
    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    /// The configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Counters.
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    fn suppressed(&mut self, what: &dyn fmt::Debug) {
        self.stats.suppressed += 1;
        log::trace!("suppressed reentrant {what:?}");
    }

    /// Handles one scene event.
    pub fn process_scene_event<S>(&mut self, scene: &S, event: &SceneEvent)
    where
        S: DocumentScene + ?Sized,
    {
        let Some(_scope) = self.guard.enter(Source::Scene) else {
            self.suppressed(event);
            return;
        };
        self.stats.scene_events += 1;
        log::trace!("scene event {event:?}");
        match event {
            SceneEvent::NodeAdded(id) => {
                if scene.is_importing() {
                    log::trace!("deferring {id} until import ends");
                    return;
                }
                self.sync_node(scene, id);
            }
            SceneEvent::NodeRemoved(id) => {
                self.registry.remove(id);
            }
            SceneEvent::NodeModified { node, .. } => {
                if scene.is_importing() && !self.registry.contains(node) {
                    return;
                }
                self.sync_node(scene, node);
            }
            SceneEvent::TransformModified(_) => {
                for id in self.managed_ids() {
                    if scene.node(&id).is_some_and(|n| n.parent_transform.is_some()) {
                        self.sync_node(scene, &id);
                    }
                }
            }
            SceneEvent::InteractionModeModified => {
                for id in self.managed_ids() {
                    self.sync_node(scene, &id);
                }
            }
            SceneEvent::ImportStarted => return,
            SceneEvent::ImportEnded => self.resync(scene),
            SceneEvent::Closing | SceneEvent::Closed => {
                self.registry.remove_all();
            }
        }
        self.scheduler.request_render();
    }

    /// Handles one event from a handle, writing its geometry into the node.
    ///
    /// Scene events fired by the write are delivered back to this manager
    /// (where they are suppressed) and returned, so that other observers of
    /// the scene can be told.
    pub fn process_handle_event<S>(&mut self, scene: &mut S, event: BoundEvent) -> SceneEvents
    where
        S: DocumentScene + ?Sized,
    {
        let Some(_scope) = self.guard.enter(Source::Handle) else {
            self.suppressed(&event);
            return SceneEvents::new();
        };
        self.stats.handle_events += 1;
        log::trace!("handle event {:?} for {}", event.event, event.node);
        let (fired, render) = match event.event {
            HandleEvent::StartInteraction => {
                match scene.node(&event.node) {
                    Some(node) => {
                        if let Some(undo) = self.undo.as_mut() {
                            undo.save_state(node);
                        }
                    }
                    None => self.stats.missing += 1,
                }
                (SceneEvents::new(), false)
            }
            HandleEvent::Interaction | HandleEvent::EndInteraction => {
                let fired = self.write_back(scene, &event.node);
                for e in &fired {
                    self.process_scene_event(&*scene, e);
                }
                let render = event.event == HandleEvent::EndInteraction
                    || self.config.render_on_interaction;
                (fired, render)
            }
            HandleEvent::Enabled | HandleEvent::Disabled => (SceneEvents::new(), true),
        };
        if render {
            self.scheduler.request_render();
        }
        fired
    }

    /// Rebuilds the handle table from the scene.
    ///
    /// Handles of vanished nodes are destroyed; every managed node gets an
    /// up-to-date handle. Use this when attaching to a populated scene.
    pub fn update_from_scene<S>(&mut self, scene: &S)
    where
        S: DocumentScene + ?Sized,
    {
        let Some(_scope) = self.guard.enter(Source::Scene) else {
            self.suppressed(&"update_from_scene");
            return;
        };
        self.resync(scene);
        self.scheduler.request_render();
    }

    /// Attaches every handle to `interactor`, or detaches them with `None`.
    ///
    /// Drags in progress are ended and committed to the scene.
    pub fn set_interactor<S>(
        &mut self,
        scene: &mut S,
        interactor: Option<Rc<dyn Interactor>>,
    ) -> SceneEvents
    where
        S: DocumentScene + ?Sized,
    {
        let mut fired = SceneEvents::new();
        for ended in self.registry.set_interactor(interactor) {
            fired.extend(self.process_handle_event(scene, ended));
        }
        self.scheduler.request_render();
        fired
    }

    /// Routes a pointer press to the nearest handle under `position`.
    pub fn pointer_down<S>(
        &mut self,
        scene: &mut S,
        position: Point,
        modifiers: Modifiers,
    ) -> SceneEvents
    where
        S: DocumentScene + ?Sized,
    {
        if self.registry.active_node().is_some() {
            return SceneEvents::new();
        }
        let mut best: Option<(&NodeId, Hit)> = None;
        for (id, entry) in self.registry.iter() {
            if let Some(hit) = entry.handle().pick(position)
                && best.is_none_or(|(_, b)| hit.score.beats(&b.score))
            {
                best = Some((id, hit));
            }
        }
        let Some(id) = best.map(|(id, _)| id.clone()) else {
            return SceneEvents::new();
        };
        let bound = self.registry.get_mut(&id).and_then(|entry| {
            let event = entry.handle_mut().begin_interaction(position, modifiers)?;
            Some(entry.binding().forward(event))
        });
        match bound {
            Some(bound) => self.process_handle_event(scene, bound),
            None => SceneEvents::new(),
        }
    }

    /// Routes a pointer move to the dragged handle, or updates hover feedback.
    pub fn pointer_move<S>(&mut self, scene: &mut S, position: Point) -> SceneEvents
    where
        S: DocumentScene + ?Sized,
    {
        let Some(id) = self.registry.active_node().cloned() else {
            for (_, entry) in self.registry.iter_mut() {
                entry.handle_mut().pointer_move(position);
            }
            return SceneEvents::new();
        };
        self.forward_from(scene, &id, |entry| {
            entry.handle_mut().pointer_move(position)
        })
    }

    /// Routes a pointer release to the dragged handle.
    pub fn pointer_up<S>(&mut self, scene: &mut S) -> SceneEvents
    where
        S: DocumentScene + ?Sized,
    {
        let Some(id) = self.registry.active_node().cloned() else {
            return SceneEvents::new();
        };
        self.forward_from(scene, &id, |entry| entry.handle_mut().end_interaction())
    }

    fn forward_from<S>(
        &mut self,
        scene: &mut S,
        id: &NodeId,
        f: impl FnOnce(&mut RegistryEntry) -> Option<HandleEvent>,
    ) -> SceneEvents
    where
        S: DocumentScene + ?Sized,
    {
        let bound = self.registry.get_mut(id).and_then(|entry| {
            let event = f(entry)?;
            Some(entry.binding().forward(event))
        });
        match bound {
            Some(bound) => self.process_handle_event(scene, bound),
            None => SceneEvents::new(),
        }
    }

    fn managed_ids(&self) -> Vec<NodeId> {
        self.registry.ids().cloned().collect()
    }

    /// Full scene → handles pass. Assumes the scene guard is held.
    fn resync<S>(&mut self, scene: &S)
    where
        S: DocumentScene + ?Sized,
    {
        log::debug!("resynchronizing handles with the scene");
        for id in self.managed_ids() {
            let keep = scene
                .node(&id)
                .is_some_and(|node| self.config.kinds.has(node.kind));
            if !keep {
                self.registry.remove(&id);
            }
        }
        for id in scene.node_ids() {
            self.sync_node(scene, &id);
        }
    }

    /// Pushes one node's geometry and state into its handle, creating the
    /// handle if needed.
    fn sync_node<S>(&mut self, scene: &S, id: &NodeId)
    where
        S: DocumentScene + ?Sized,
    {
        let Some(node) = scene.node(id) else {
            self.stats.missing += 1;
            log::trace!("no node {id} in the scene");
            return;
        };
        if !self.config.kinds.has(node.kind) {
            return;
        }
        let world = to_world(&node.geometry, &scene.transform_to_world(id));
        let processes_events = !node.locked && scene.interaction_mode() != InteractionMode::Place;

        let entry = self.registry.get_or_create(id, node.kind, &*self.factory);
        let handle = entry.handle_mut();
        if !handle.set_world_geometry(world) {
            log::debug!("representation of {id} rejected its geometry");
        }
        handle.set_visible(node.visible);
        handle.set_processes_events(processes_events);
        // Enable/disable notifications would only request a render, which
        // every caller of this function does anyway.
        let _ = handle.set_enabled(node.visible);
    }

    fn write_back<S>(&mut self, scene: &mut S, id: &NodeId) -> SceneEvents
    where
        S: DocumentScene + ?Sized,
    {
        let world = self
            .registry
            .get(id)
            .and_then(|entry| entry.handle().world_geometry());
        let Some(world) = world.filter(|_| scene.node(id).is_some()) else {
            self.stats.missing += 1;
            log::trace!("dropping write to missing node {id}");
            return SceneEvents::new();
        };
        let local = to_local(&world, &scene.transform_to_world(id));
        match scene.set_geometry(id, local) {
            Ok(fired) => fired,
            Err(err) => {
                self.stats.rejected_writes += 1;
                log::debug!("scene refused geometry for {id}: {err}");
                // Snap the handle back to what the node still holds.
                self.sync_node(&*scene, id);
                SceneEvents::new()
            }
        }
    }
}
