// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag state: successive pointer positions plus the depth the drag is pinned to.
//!
//! A handle grabbed on screen is moved in the plane parallel to the view that
//! passes through the grabbed part. [`DragState`] records that depth when the
//! drag starts, so every motion step can be unprojected at the same depth.
//!
//! ```
//! use kurbo::Point;
//! use marksync_handle::DragState;
//!
//! let mut drag = DragState::default();
//! drag.start(Point::new(10.0, 20.0), 0.5);
//!
//! let (from, to) = drag.update(Point::new(15.0, 25.0)).unwrap();
//! assert_eq!(from, Point::new(10.0, 20.0));
//! assert_eq!(to, Point::new(15.0, 25.0));
//! ```

use kurbo::Point;

/// Tracks one pointer drag.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragState {
    /// Position where the drag started.
    pub start_pos: Option<Point>,
    /// Last position seen during the drag.
    pub last_pos: Option<Point>,
    /// Display depth of the grabbed part.
    pub depth: f64,
}

impl DragState {
    /// Starts a drag at `pos`, pinned to `depth`.
    pub fn start(&mut self, pos: Point, depth: f64) {
        self.start_pos = Some(pos);
        self.last_pos = Some(pos);
        self.depth = depth;
    }

    /// Records `pos` and returns the `(previous, current)` positions.
    ///
    /// Returns `None` when no drag is in progress.
    pub fn update(&mut self, pos: Point) -> Option<(Point, Point)> {
        self.start_pos?;
        let last = self.last_pos.replace(pos)?;
        Some((last, pos))
    }

    /// Ends the drag and resets state.
    pub fn end(&mut self) {
        *self = Self::default();
    }
}
