// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marksync: two-way synchronization between annotation nodes and interactive handles.
//!
//! A medical-image viewer shows annotations (regions of interest, fiducials,
//! rulers, angles, splines, bidimensional measurements, text anchors) stored
//! as nodes of a document scene. Each annotation is edited through a
//! draggable 3D handle. This crate keeps the two consistent:
//!
//! - when a node is added, changed, or removed, its handle is created,
//!   updated, or destroyed;
//! - when the user drags a handle, the new geometry is written back into the
//!   node's local space;
//! - redraws are coalesced through a [`RenderScheduler`](marksync_render::RenderScheduler).
//!
//! ## Pieces
//!
//! - [`DocumentScene`]: the interface the document model implements.
//!   [`MemoryScene`] is a complete in-memory implementation.
//! - [`WidgetRegistry`]: owns at most one handle per node, each with a
//!   [`CallbackBinding`] that tags its events with the node id.
//! - [`RepresentationFactory`]: the only place that maps an
//!   [`AnnotationKind`] to a representation; [`DefaultRepresentations`] is the
//!   stock mapping.
//! - [`SyncManager`]: the hub. It receives [`SceneEvent`]s and
//!   [`BoundEvent`]s, converts geometry with `marksync_geometry`, and routes
//!   pointer input to handles.
//!
//! ## Events
//!
//! Scene mutators return the [`SceneEvents`] they fired. The code that
//! mutated the scene passes them to every manager observing it:
//!
//! ```
//! use std::rc::Rc;
//! use marksync::{AnnotationKind, DocumentNode, MemoryScene, SyncManager};
//! use marksync_geometry::{DVec3, NodeGeometry};
//! use marksync_render::{LocalIdleQueue, RenderScheduler};
//!
//! let queue = LocalIdleQueue::new();
//! let mut manager = SyncManager::new(RenderScheduler::new(|| {}, Rc::new(queue.clone())));
//! let mut scene = MemoryScene::new();
//!
//! let fiducial = DocumentNode::new(
//!     "f1",
//!     AnnotationKind::Fiducial,
//!     NodeGeometry::points([DVec3::new(1.0, 2.0, 3.0)]),
//! );
//! for event in scene.add_node(fiducial).unwrap() {
//!     manager.process_scene_event(&scene, &event);
//! }
//! assert_eq!(manager.registry().len(), 1);
//!
//! for event in scene.remove_node(&"f1".into()).unwrap() {
//!     manager.process_scene_event(&scene, &event);
//! }
//! assert!(manager.registry().is_empty());
//! ```
//!
//! When the manager writes a node itself, it delivers the resulting events to
//! itself while still inside the handle event, where they are suppressed,
//! and returns them so other views can be updated.
//!
//! ## Logging
//!
//! Lifecycle (handles created and removed, full resynchronization, refused
//! writes, unsupported transforms) is logged at `debug` level through the
//! `log` facade; per-event flow and suppressed calls at `trace`.
//!
//! This crate is `no_std` compatible (with `alloc`) when built without the
//! default `std` feature and with `libm`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod binding;
mod config;
mod factory;
mod guard;
mod manager;
mod memory;
mod node;
mod registry;
mod scene;
mod undo;

pub use binding::{BoundEvent, CallbackBinding};
pub use config::SyncConfig;
pub use factory::{DefaultRepresentations, RepresentationFactory};
pub use manager::{SyncManager, SyncStats};
pub use memory::{MemoryScene, TransformKind, TransformNode};
pub use node::{AnnotationKind, DocumentNode, KindSet, NodeId};
pub use registry::{RegistryEntry, WidgetRegistry};
pub use scene::{
    DocumentScene, InteractionMode, NodeChange, SceneError, SceneEvent, SceneEvents,
};
pub use undo::UndoSink;
