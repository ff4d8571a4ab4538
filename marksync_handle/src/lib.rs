// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marksync Handle: draggable 3D handles for annotation editing.
//!
//! An [`InteractiveHandle`] couples a [`Representation`] (the world-space
//! geometry being edited, and how it is picked and moved) with a small
//! pointer state machine:
//!
//! ```text
//!   Start --begin_interaction (hit)--> Active{part}
//!   Active --pointer_move-----------> Active{part}   (emits Interaction)
//!   Active --end_interaction--------> Start          (emits EndInteraction)
//!   Active --detach / set_interactor-> Start         (emits EndInteraction)
//! ```
//!
//! Handles never call back into the outside world. Every method that can
//! change something others care about returns an optional [`HandleEvent`],
//! and the caller forwards it.
//!
//! ## Representations
//!
//! - [`BoxRepresentation`]: an axis-aligned box with face and center handles.
//! - [`ControlPointRepresentation`]: point handles joined according to a
//!   [`Topology`] (point set, line, spline, or caliper).
//!
//! ## Viewports
//!
//! Handles project their geometry through an [`Interactor`]. Viewers
//! implement it over their own camera; [`ViewProjection`] is a matrix-based
//! implementation for headless use.
//!
//! Hit testing happens in screen space with pixel tolerances from
//! [`HitParams`]. Drags are pinned to the depth of the grabbed part, so a part
//! moves in the plane parallel to the view.
//!
//! This crate is `no_std` compatible (with `alloc`) when built without the
//! default `std` feature and with `libm`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod boxes;
mod control_points;
mod drag;
mod handle;
mod hit;
mod interactor;
mod representation;

pub use boxes::BoxRepresentation;
pub use control_points::{ControlPointRepresentation, Topology};
pub use drag::DragState;
pub use handle::{
    HandleEvent, HandleFlags, HandleState, InteractionParams, InteractiveHandle, Modifiers,
};
pub use hit::{HitKind, HitParams, HitScore, hit_point, hit_segment};
pub use interactor::{Interactor, ViewProjection};
pub use representation::{Hit, Part, Representation};
