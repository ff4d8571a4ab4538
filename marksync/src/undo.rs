// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Undo hook.

use crate::DocumentNode;

/// Receives node snapshots taken when an interactive edit begins.
///
/// The host's undo stack implements this to record the pre-drag state. The
/// manager never reads anything back.
pub trait UndoSink {
    /// Called once per drag, before the first geometry write.
    fn save_state(&mut self, node: &DocumentNode);
}

impl<F: FnMut(&DocumentNode)> UndoSink for F {
    fn save_state(&mut self, node: &DocumentNode) {
        self(node);
    }
}
