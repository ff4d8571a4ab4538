// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reentrancy flags with scoped release.

use alloc::rc::Rc;
use core::cell::Cell;

/// Which side of the synchronization a call is handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Source {
    /// A document scene event.
    Scene,
    /// A handle interaction event.
    Handle,
}

/// The two "currently processing" flags of one manager.
#[derive(Debug, Default)]
pub(crate) struct GuardFlags {
    scene: Cell<bool>,
    handle: Cell<bool>,
}

impl GuardFlags {
    fn flag(&self, source: Source) -> &Cell<bool> {
        match source {
            Source::Scene => &self.scene,
            Source::Handle => &self.handle,
        }
    }

    /// Returns `true` if either flag is set.
    pub(crate) fn busy(&self) -> bool {
        self.scene.get() || self.handle.get()
    }

    /// Sets the flag for `source`, unless any flag is already set.
    ///
    /// The flag is cleared when the returned scope is dropped, including
    /// during unwinding.
    pub(crate) fn enter(self: &Rc<Self>, source: Source) -> Option<GuardScope> {
        if self.busy() {
            return None;
        }
        self.flag(source).set(true);
        Some(GuardScope {
            flags: Rc::clone(self),
            source,
        })
    }
}

/// Clears one guard flag on drop.
#[derive(Debug)]
pub(crate) struct GuardScope {
    flags: Rc<GuardFlags>,
    source: Source,
}

impl Drop for GuardScope {
    fn drop(&mut self) {
        self.flags.flag(self.source).set(false);
    }
}
