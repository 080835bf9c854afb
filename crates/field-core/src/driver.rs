//! Frame scheduling shared by both fields.
//!
//! The host owns the actual display loop (`requestAnimationFrame`, a winit
//! redraw, or a test) behind `FrameScheduler`. The driver keeps at most one
//! frame pending, and once `stop` has run no queued callback reaches the
//! client: every callback carries the token it was scheduled with and stale
//! tokens are dropped.

use crate::constants::MAX_FRAME_DT_SEC;
use crate::Viewport;

/// Host-side frame source.
pub trait FrameScheduler {
    type Token: Copy + PartialEq + std::fmt::Debug;

    /// Ask for exactly one future `on_frame` call carrying the returned token.
    fn schedule(&mut self) -> Self::Token;
    fn cancel(&mut self, token: Self::Token);
}

/// Per-frame timing passed to the client.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInfo {
    pub index: u64,
    pub timestamp_ms: f64,
    /// Seconds since the previous frame, 0 on the first, clamped to
    /// `MAX_FRAME_DT_SEC`.
    pub dt_sec: f32,
}

/// A simulation the driver steps.
pub trait FrameClient {
    fn step(&mut self, frame: &FrameInfo);
    fn resize(&mut self, viewport: Viewport);
}

pub struct AnimationDriver<S: FrameScheduler, C: FrameClient> {
    scheduler: S,
    client: C,
    pending: Option<S::Token>,
    running: bool,
    last_timestamp_ms: Option<f64>,
    frames: u64,
}

impl<S: FrameScheduler, C: FrameClient> AnimationDriver<S, C> {
    pub fn new(scheduler: S, client: C) -> Self {
        Self {
            scheduler,
            client,
            pending: None,
            running: false,
            last_timestamp_ms: None,
            frames: 0,
        }
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_timestamp_ms = None;
        self.schedule_next();
    }

    /// Cancel the pending frame; any callback already queued becomes a no-op.
    pub fn stop(&mut self) {
        self.running = false;
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel(token);
        }
    }

    /// Entry point for the host's frame callback.
    pub fn on_frame(&mut self, token: S::Token, timestamp_ms: f64) {
        if !self.running || self.pending != Some(token) {
            log::trace!("dropping stale frame {token:?}");
            return;
        }
        self.pending = None;

        let dt_sec = match self.last_timestamp_ms {
            Some(prev) => (((timestamp_ms - prev) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT_SEC),
            None => 0.0,
        };
        self.last_timestamp_ms = Some(timestamp_ms);
        let frame = FrameInfo {
            index: self.frames,
            timestamp_ms,
            dt_sec,
        };
        self.frames += 1;
        self.client.step(&frame);
        self.schedule_next();
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.client.resize(viewport);
    }

    fn schedule_next(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.schedule());
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending(&self) -> Option<S::Token> {
        self.pending
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

/// Scheduler pumped by hand: `schedule` queues a token, the host pops it
/// with `next_token` and feeds it back through `on_frame`.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    queued: Vec<u64>,
    cancelled: Vec<u64>,
}

impl ManualScheduler {
    /// Oldest queued token, cancelled ones included; a real display loop
    /// may already have a callback in flight when it is cancelled.
    pub fn next_token(&mut self) -> Option<u64> {
        if self.queued.is_empty() {
            None
        } else {
            Some(self.queued.remove(0))
        }
    }

    pub fn queued(&self) -> usize {
        self.queued.len()
    }

    pub fn cancelled(&self) -> &[u64] {
        &self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    type Token = u64;

    fn schedule(&mut self) -> u64 {
        let token = self.next;
        self.next += 1;
        self.queued.push(token);
        token
    }

    fn cancel(&mut self, token: u64) {
        self.cancelled.push(token);
    }
}
