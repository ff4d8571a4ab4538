// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Manager configuration.

use marksync_handle::InteractionParams;

use crate::KindSet;

/// Configuration of a [`SyncManager`](crate::SyncManager).
///
/// ```
/// use marksync::{KindSet, SyncConfig};
///
/// let config = SyncConfig::default().with_kinds(KindSet::ROI | KindSet::RULER);
/// assert!(!config.kinds.contains(KindSet::FIDUCIAL));
/// assert!(config.render_on_interaction);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncConfig {
    /// Kinds that get handles. Nodes of other kinds are ignored.
    pub kinds: KindSet,
    /// Picking and drag parameters given to every handle.
    pub interaction: InteractionParams,
    /// Request a render after each handle motion.
    ///
    /// Hosts that redraw continuously while dragging can turn this off.
    pub render_on_interaction: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            kinds: KindSet::all(),
            interaction: InteractionParams::default(),
            render_on_interaction: true,
        }
    }
}

impl SyncConfig {
    /// Restricts handles to `kinds`.
    #[must_use]
    pub fn with_kinds(mut self, kinds: KindSet) -> Self {
        self.kinds = kinds;
        self
    }

    /// Sets the interaction parameters.
    #[must_use]
    pub fn with_interaction(mut self, interaction: InteractionParams) -> Self {
        self.interaction = interaction;
        self
    }

    /// Sets [`render_on_interaction`](Self::render_on_interaction).
    #[must_use]
    pub fn with_render_on_interaction(mut self, render: bool) -> Self {
        self.render_on_interaction = render;
        self
    }
}
