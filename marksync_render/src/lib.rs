// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marksync Render: debounced, deferred redraw.
//!
//! Dragging a handle or loading a document produces bursts of changes, each
//! of which invalidates the viewport. Drawing once per change is wasteful;
//! drawing once per burst is enough. [`RenderScheduler`] coalesces requests
//! into a single task on an [`IdleQueue`], the host's "run when idle"
//! primitive, so the draw happens after the current event is fully handled.
//!
//! - At most one deferred task is queued at any time.
//! - An explicit [`RenderScheduler::render`] makes a queued task a no-op.
//! - Queued tasks hold only a weak reference, so dropping the scheduler
//!   (for example when the viewer is torn down) turns them into no-ops.
//!
//! [`LocalIdleQueue`] is a FIFO implementation for hosts that drain tasks
//! themselves, and for tests.
//!
//! This crate is `no_std` compatible (with `alloc`).

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod idle;
mod scheduler;

pub use idle::{IdleQueue, IdleTask, LocalIdleQueue};
pub use scheduler::{RenderScheduler, Renderer};
