// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debouncing and teardown behavior of the render scheduler.

use std::cell::Cell;
use std::rc::Rc;

use marksync_render::{LocalIdleQueue, RenderScheduler};

fn counting(queue: &LocalIdleQueue) -> (RenderScheduler, Rc<Cell<u32>>) {
    let draws = Rc::new(Cell::new(0));
    let counter = Rc::clone(&draws);
    let scheduler = RenderScheduler::new(
        move || counter.set(counter.get() + 1),
        Rc::new(queue.clone()),
    );
    (scheduler, draws)
}

#[test]
fn any_number_of_requests_draw_once() {
    for k in [1_usize, 2, 17, 500] {
        let queue = LocalIdleQueue::new();
        let (scheduler, draws) = counting(&queue);
        for _ in 0..k {
            scheduler.request_render();
        }
        assert_eq!(queue.len(), 1, "k = {k}");
        queue.run_pending();
        assert_eq!(draws.get(), 1, "k = {k}");
        assert_eq!(scheduler.frames(), 1);
    }
}

#[test]
fn task_after_scheduler_drop_is_noop() {
    let queue = LocalIdleQueue::new();
    let (scheduler, draws) = counting(&queue);
    scheduler.request_render();
    drop(scheduler);
    assert_eq!(queue.run_pending(), 1);
    assert_eq!(draws.get(), 0);
}

#[test]
fn clones_share_pending_state() {
    let queue = LocalIdleQueue::new();
    let (scheduler, draws) = counting(&queue);
    let other = scheduler.clone();
    scheduler.request_render();
    other.request_render();
    assert!(other.is_pending());
    queue.run_pending();
    assert_eq!(draws.get(), 1);
    // The task holds only a weak reference; one surviving clone keeps it live.
    drop(scheduler);
    other.request_render();
    queue.run_pending();
    assert_eq!(draws.get(), 2);
}

#[test]
fn separate_bursts_draw_separately() {
    let queue = LocalIdleQueue::new();
    let (scheduler, draws) = counting(&queue);
    for _ in 0..3 {
        scheduler.request_render();
        scheduler.request_render();
        queue.run_pending();
    }
    assert_eq!(draws.get(), 3);
    assert_eq!(scheduler.requests(), 6);
}
