// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Same-thread "run on next idle" queues.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

/// A deferred task.
pub type IdleTask = Box<dyn FnOnce()>;

/// The platform's "run this when the event loop is idle" primitive.
///
/// Tasks run on the posting thread, after the current event has been fully
/// processed, in posting order.
pub trait IdleQueue {
    /// Queues `task` for the next idle period.
    fn post(&self, task: IdleTask);
}

/// A FIFO [`IdleQueue`] drained explicitly by its owner.
///
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct LocalIdleQueue {
    tasks: Rc<RefCell<VecDeque<IdleTask>>>,
}

impl fmt::Debug for LocalIdleQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalIdleQueue")
            .field("pending", &self.len())
            .finish_non_exhaustive()
    }
}

impl LocalIdleQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Runs the tasks queued before this call and returns how many ran.
    ///
    /// Tasks posted while draining wait for the next call.
    pub fn run_pending(&self) -> usize {
        let count = self.len();
        for _ in 0..count {
            // Never hold the borrow across a task; tasks may post.
            let task = self.tasks.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
        count
    }
}

impl IdleQueue for LocalIdleQueue {
    fn post(&self, task: IdleTask) {
        self.tasks.borrow_mut().push_back(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn runs_in_posting_order() {
        let queue = LocalIdleQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = Rc::clone(&log);
            queue.post(Box::new(move || log.borrow_mut().push(i)));
        }
        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*log.borrow(), [0, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn tasks_posted_while_draining_wait() {
        let queue = LocalIdleQueue::new();
        let ran = Rc::new(Cell::new(0));
        let (q, r) = (queue.clone(), Rc::clone(&ran));
        queue.post(Box::new(move || {
            r.set(r.get() + 1);
            let r = Rc::clone(&r);
            q.post(Box::new(move || r.set(r.get() + 10)));
        }));
        assert_eq!(queue.run_pending(), 1);
        assert_eq!(ran.get(), 1);
        assert_eq!(queue.len(), 1);
        queue.run_pending();
        assert_eq!(ran.get(), 11);
    }
}
