// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debounced redraw requests.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::Cell;
use core::fmt;

use crate::IdleQueue;

/// Draws the viewport.
pub trait Renderer {
    /// Redraws everything.
    fn render(&self);
}

impl<F: Fn()> Renderer for F {
    fn render(&self) {
        self()
    }
}

struct Inner {
    renderer: Box<dyn Renderer>,
    queue: Rc<dyn IdleQueue>,
    pending: Cell<bool>,
    frames: Cell<u64>,
    requests: Cell<u64>,
}

impl Inner {
    fn render(&self) {
        self.renderer.render();
        self.frames.set(self.frames.get() + 1);
        self.pending.set(false);
    }
}

/// Coalesces redraw requests into at most one deferred render.
///
/// [`request_render`](Self::request_render) marks a render as pending and
/// posts one task to the idle queue. Further requests while pending are
/// absorbed. An explicit [`render`](Self::render) clears the pending flag,
/// turning the queued task into a no-op.
///
/// Clones share the same state.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use marksync_render::{LocalIdleQueue, RenderScheduler};
///
/// let queue = LocalIdleQueue::new();
/// let draws = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&draws);
/// let scheduler = RenderScheduler::new(
///     move || counter.set(counter.get() + 1),
///     Rc::new(queue.clone()),
/// );
///
/// for _ in 0..5 {
///     scheduler.request_render();
/// }
/// assert!(scheduler.is_pending());
/// queue.run_pending();
/// assert_eq!(draws.get(), 1);
/// assert!(!scheduler.is_pending());
/// ```
#[derive(Clone)]
pub struct RenderScheduler {
    inner: Rc<Inner>,
}

impl fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("pending", &self.is_pending())
            .field("frames", &self.frames())
            .field("requests", &self.requests())
            .finish_non_exhaustive()
    }
}

impl RenderScheduler {
    /// Creates a scheduler drawing through `renderer` and deferring on `queue`.
    pub fn new(renderer: impl Renderer + 'static, queue: Rc<dyn IdleQueue>) -> Self {
        Self {
            inner: Rc::new(Inner {
                renderer: Box::new(renderer),
                queue,
                pending: Cell::new(false),
                frames: Cell::new(0),
                requests: Cell::new(0),
            }),
        }
    }

    /// Asks for a redraw on the next idle period.
    pub fn request_render(&self) {
        let inner = &self.inner;
        inner.requests.set(inner.requests.get() + 1);
        if inner.pending.get() {
            log::trace!("render already pending");
            return;
        }
        inner.pending.set(true);
        let weak: Weak<Inner> = Rc::downgrade(inner);
        inner.queue.post(Box::new(move || {
            if let Some(inner) = weak.upgrade()
                && inner.pending.get()
            {
                inner.render();
            }
        }));
    }

    /// Draws now and clears any pending request.
    pub fn render(&self) {
        self.inner.render();
    }

    /// Returns `true` if a deferred render is queued.
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get()
    }

    /// Number of renders performed.
    pub fn frames(&self) -> u64 {
        self.inner.frames.get()
    }

    /// Number of render requests received.
    pub fn requests(&self) -> u64 {
        self.inner.requests.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalIdleQueue;

    fn scheduler() -> (RenderScheduler, LocalIdleQueue) {
        let queue = LocalIdleQueue::new();
        (RenderScheduler::new(|| {}, Rc::new(queue.clone())), queue)
    }

    #[test]
    fn requests_coalesce_into_one_task() {
        let (s, queue) = scheduler();
        s.request_render();
        s.request_render();
        s.request_render();
        assert_eq!(queue.len(), 1);
        assert_eq!(s.requests(), 3);
        queue.run_pending();
        assert_eq!(s.frames(), 1);
    }

    #[test]
    fn explicit_render_cancels_queued_task() {
        let (s, queue) = scheduler();
        s.request_render();
        s.render();
        assert!(!s.is_pending());
        queue.run_pending();
        assert_eq!(s.frames(), 1);
    }

    #[test]
    fn request_after_render_queues_again() {
        let (s, queue) = scheduler();
        s.request_render();
        queue.run_pending();
        s.request_render();
        assert!(s.is_pending());
        queue.run_pending();
        assert_eq!(s.frames(), 2);
    }
}
