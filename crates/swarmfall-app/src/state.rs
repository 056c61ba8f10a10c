//! Host-side state shared between the engine's seams and the loop driving it.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use swarmfall_core::state::GameState;
use swarmfall_sim::host::{FrameHandle, FrameScheduler, Presenter};

#[derive(Debug, Default)]
struct QueueState {
    next: u64,
    pending: Option<FrameHandle>,
}

/// Single-slot frame queue. The engine requests through one clone; the
/// loop polls the other for a pending callback.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue(Rc<RefCell<QueueState>>);

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending request, if the engine made one.
    pub fn take_pending(&self) -> Option<FrameHandle> {
        self.0.borrow_mut().pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.0.borrow().pending.is_some()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        let mut queue = self.0.borrow_mut();
        queue.next += 1;
        let handle = FrameHandle(queue.next);
        queue.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut queue = self.0.borrow_mut();
        if queue.pending == Some(handle) {
            queue.pending = None;
        }
    }
}

/// Presenter keeping the latest state for polling, plus a frame count.
#[derive(Debug, Clone, Default)]
pub struct LatestState {
    latest: Arc<Mutex<Option<GameState>>>,
    presented: Arc<Mutex<u64>>,
}

impl LatestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<GameState> {
        self.latest.lock().ok().and_then(|lock| lock.clone())
    }

    pub fn presented(&self) -> u64 {
        self.presented.lock().map_or(0, |count| *count)
    }
}

impl Presenter for LatestState {
    fn present(&mut self, state: &GameState) {
        if let Ok(mut lock) = self.latest.lock() {
            *lock = Some(state.clone());
        }
        if let Ok(mut count) = self.presented.lock() {
            *count += 1;
        }
    }
}
