// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ownership of handles, keyed by node.

use alloc::rc::Rc;
use alloc::vec::Vec;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use marksync_handle::{InteractionParams, InteractiveHandle, Interactor};

use crate::{AnnotationKind, BoundEvent, CallbackBinding, NodeId, RepresentationFactory};

/// A handle together with its binding.
#[derive(Debug)]
pub struct RegistryEntry {
    kind: AnnotationKind,
    handle: InteractiveHandle,
    binding: CallbackBinding,
}

impl RegistryEntry {
    /// Kind of the node the handle was created for.
    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    /// The handle.
    pub fn handle(&self) -> &InteractiveHandle {
        &self.handle
    }

    /// Mutable access to the handle.
    pub fn handle_mut(&mut self) -> &mut InteractiveHandle {
        &mut self.handle
    }

    /// The binding forwarding this handle's events.
    pub fn binding(&self) -> &CallbackBinding {
        &self.binding
    }

    fn teardown(&mut self) {
        // Events from a dying handle have nowhere to go.
        let _ = self.handle.detach();
        self.handle.representation_mut().clear();
        let _ = self.handle.set_enabled(false);
    }
}

/// The table of live handles: at most one per node.
///
/// Entries are created lazily by [`get_or_create`](Self::get_or_create) and
/// destroyed by [`remove`](Self::remove) or [`remove_all`](Self::remove_all).
/// Every handle is attached to the registry's current interactor.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    entries: HashMap<NodeId, RegistryEntry>,
    interactor: Option<Rc<dyn Interactor>>,
    params: InteractionParams,
}

impl WidgetRegistry {
    /// Creates an empty registry whose handles use `params`.
    pub fn new(params: InteractionParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no handles.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `id` has a handle.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    /// Looks up the entry for `id`.
    pub fn get(&self, id: &NodeId) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    /// Looks up the entry for `id` mutably.
    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut RegistryEntry> {
        self.entries.get_mut(id)
    }

    /// Iterates over every entry, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &RegistryEntry)> {
        self.entries.iter()
    }

    /// Iterates mutably over every entry, in no particular order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&NodeId, &mut RegistryEntry)> {
        self.entries.iter_mut()
    }

    /// Ids of every node with a handle, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.entries.keys()
    }

    /// Returns the entry for `id`, creating it if needed.
    ///
    /// A new entry gets a representation from `factory`, a binding to `id`,
    /// and the current interactor. Its handle starts disabled.
    pub fn get_or_create(
        &mut self,
        id: &NodeId,
        kind: AnnotationKind,
        factory: &dyn RepresentationFactory,
    ) -> &mut RegistryEntry {
        match self.entries.entry(id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                log::debug!("creating {kind:?} handle for {id}");
                let mut handle = InteractiveHandle::new(factory.create(kind), self.params);
                let _ = handle.set_interactor(self.interactor.clone());
                entry.insert(RegistryEntry {
                    kind,
                    handle,
                    binding: CallbackBinding::new(id.clone()),
                })
            }
        }
    }

    /// Destroys the handle of `id`. Returns `false` if there was none.
    pub fn remove(&mut self, id: &NodeId) -> bool {
        let Some(mut entry) = self.entries.remove(id) else {
            return false;
        };
        log::debug!("removing handle for {id}");
        entry.teardown();
        true
    }

    /// Destroys every handle without consulting the scene.
    ///
    /// Returns how many handles were destroyed.
    pub fn remove_all(&mut self) -> usize {
        let count = self.entries.len();
        for (_, mut entry) in self.entries.drain() {
            entry.teardown();
        }
        if count > 0 {
            log::debug!("removed all {count} handles");
        }
        count
    }

    /// The interactor new and existing handles are attached to.
    pub fn interactor(&self) -> Option<&Rc<dyn Interactor>> {
        self.interactor.as_ref()
    }

    /// Re-attaches every handle to `interactor`.
    ///
    /// A handle in the middle of a drag ends it; those end events are
    /// returned so they can be processed like any other handle event.
    pub fn set_interactor(&mut self, interactor: Option<Rc<dyn Interactor>>) -> Vec<BoundEvent> {
        let mut ended = Vec::new();
        for entry in self.entries.values_mut() {
            if let Some(event) = entry.handle.set_interactor(interactor.clone()) {
                ended.push(entry.binding.forward(event));
            }
        }
        self.interactor = interactor;
        ended
    }

    /// Interaction parameters given to handles.
    pub fn params(&self) -> &InteractionParams {
        &self.params
    }

    /// Changes the interaction parameters of every handle.
    pub fn set_params(&mut self, params: InteractionParams) {
        self.params = params;
        for entry in self.entries.values_mut() {
            entry.handle.set_params(params);
        }
    }

    /// The node whose handle is currently being dragged.
    pub fn active_node(&self) -> Option<&NodeId> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.handle.is_active())
            .map(|(id, _)| id)
    }
}
