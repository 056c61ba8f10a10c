//! Seams to the host environment: frame scheduling and presentation.
//!
//! The engine never reads wall-clock time for simulation and never draws.
//! A host supplies a scheduler that calls `Engine::frame` back with its
//! timestamp, and a presenter that receives each finished `GameState`.

use swarmfall_core::state::GameState;

/// Opaque id of a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host frame-callback facility (a display refresh, a timer, a test driver).
pub trait FrameScheduler {
    /// Ask for one more `Engine::frame` call.
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraw a request that has not fired yet.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Drawing surface. Receives the complete state once per frame.
pub trait Presenter {
    fn present(&mut self, state: &GameState);
}

/// Presenter that discards every frame.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _state: &GameState) {}
}
