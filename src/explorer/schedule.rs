//! Debounced render scheduling
//!
//! Continuous input (brush drags, slider drags) must collapse into at most
//! one expensive redraw or point restyle per quiet window. Time is injected
//! as [`Instant`] values: the frame loop polls with the current time, tests
//! poll with arithmetic on a fixed base instant. Nothing here sleeps or
//! spawns.

use std::time::{Duration, Instant};

/// Quiet interval shared by both render actions.
pub const QUIET_INTERVAL: Duration = Duration::from_millis(100);

/// A cancellable one-shot timer with last-trigger-wins semantics: each
/// trigger replaces any pending deadline and payload, so only the most
/// recent trigger's state is ever delivered.
#[derive(Debug)]
pub struct Debounce<T> {
    quiet: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debounce<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Schedule (or reschedule) delivery of `payload` one quiet interval
    /// after `now`. Any previously pending payload is dropped, not queued.
    pub fn trigger(&mut self, now: Instant, payload: T) {
        self.pending = Some((now + self.quiet, payload));
    }

    /// Deliver the pending payload if its quiet interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| deadline <= now) {
            self.pending.take().map(|(_, payload)| payload)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, p)| p)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(d, _)| *d)
    }
}

/// What the frame loop should execute once a debounce fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    /// Complete chart reconstruction (dataset load, plot-mode toggle,
    /// structural change).
    Full,
    /// Point styling/visibility only (threshold, opacity, highlight
    /// changes).
    PointsOnly,
}

/// Two independently debounced render actions. The pending state doubles as
/// the cooperative "dirty" signal: set on trigger, cleared when the action
/// actually executes.
#[derive(Debug)]
pub struct RenderScheduler {
    draw: Debounce<()>,
    update: Debounce<()>,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self {
            draw: Debounce::new(QUIET_INTERVAL),
            update: Debounce::new(QUIET_INTERVAL),
        }
    }

    pub fn request_draw(&mut self, now: Instant) {
        log::debug!("draw requested");
        self.draw.trigger(now, ());
    }

    pub fn request_update(&mut self, now: Instant) {
        log::debug!("update requested");
        self.update.trigger(now, ());
    }

    /// Fire at most one render pass. A full redraw restyles every point, so
    /// it also consumes a pending points update; a points update never
    /// touches a pending redraw.
    pub fn poll(&mut self, now: Instant) -> Option<RenderPass> {
        if self.draw.poll(now).is_some() {
            self.update.cancel();
            return Some(RenderPass::Full);
        }
        self.update.poll(now).map(|()| RenderPass::PointsOnly)
    }

    /// True while any action is scheduled but not yet executed.
    pub fn is_dirty(&self) -> bool {
        self.draw.is_pending() || self.update.is_pending()
    }

    /// Earliest pending deadline, for frame-loop wakeup.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.draw.deadline(), self.update.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
