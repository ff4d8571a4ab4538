// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-handle event binding.

use marksync_handle::HandleEvent;

use crate::NodeId;

/// A handle event tagged with the node it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundEvent {
    /// The node whose handle fired.
    pub node: NodeId,
    /// What happened.
    pub event: HandleEvent,
}

/// Ties one handle to its node.
///
/// The binding refers to the node by id only; it never keeps the node alive.
/// If the node is gone by the time an event is processed, the event is
/// dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackBinding {
    node: NodeId,
}

impl CallbackBinding {
    /// Binds to `node`.
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }

    /// The bound node.
    pub fn node(&self) -> &NodeId {
        &self.node
    }

    /// Tags `event` with the bound node.
    pub fn forward(&self, event: HandleEvent) -> BoundEvent {
        BoundEvent {
            node: self.node.clone(),
            event,
        }
    }
}
