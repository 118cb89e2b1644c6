//! The three scheduling tiers used by window maintenance: per-frame
//! sampling, idle execution and a quiet-period gate.
//!
//! Everything runs on the UI thread; these are just flags and deadlines the
//! frame loop consults. Time is always passed in, which keeps tests free of
//! sleeps.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Collapses any number of scroll events within one frame into a single
/// evaluation.
#[derive(Debug, Default)]
pub struct FrameSampler {
    in_flight: bool,
}

impl FrameSampler {
    /// Ask for a sample on the next frame. Returns false when one is already
    /// queued.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.in_flight, true)
    }

    /// Consume the queued sample, if any.
    pub fn take(&mut self) -> bool {
        std::mem::replace(&mut self.in_flight, false)
    }
}

/// How the host offers idle time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleMode {
    /// The host reports whether the current frame is idle.
    #[default]
    Native,
    /// No idle signal: run on the next frame, like a zero-delay timer.
    NextFrame,
}

/// A single pending idle callback.
#[derive(Debug)]
pub struct IdleSlot {
    mode: IdleMode,
    scheduled: bool,
}

impl IdleSlot {
    pub fn new(mode: IdleMode) -> Self {
        Self {
            mode,
            scheduled: false,
        }
    }

    /// Returns false when a callback is already pending.
    pub fn schedule(&mut self) -> bool {
        !std::mem::replace(&mut self.scheduled, true)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Whether the pending callback runs now. Running clears the slot.
    pub fn fire(&mut self, host_idle: bool) -> bool {
        let ready = match self.mode {
            IdleMode::Native => host_idle,
            IdleMode::NextFrame => true,
        };
        if self.scheduled && ready {
            self.scheduled = false;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.scheduled = false;
    }
}

/// Open only once `quiet` has passed since the last event.
#[derive(Debug)]
pub struct QuietGate {
    quiet: Duration,
    last_event: Option<Instant>,
}

impl QuietGate {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_event: None,
        }
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_event = Some(now);
    }

    #[cfg(test)]
    pub fn is_open(&self, now: Instant) -> bool {
        self.remaining(now).is_none()
    }

    /// Time left until the gate opens, `None` when already open.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let last = self.last_event?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < self.quiet).then(|| self.quiet - elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampler_coalesces_requests() {
        let mut sampler = FrameSampler::default();
        assert!(sampler.request());
        assert!(!sampler.request());
        assert!(!sampler.request());
        assert!(sampler.take());
        assert!(!sampler.take());
        assert!(sampler.request());
    }

    #[test]
    fn native_idle_waits_for_an_idle_frame() {
        let mut slot = IdleSlot::new(IdleMode::Native);
        assert!(!slot.fire(true));
        assert!(slot.schedule());
        assert!(!slot.schedule());
        assert!(!slot.fire(false));
        assert!(slot.fire(true));
        assert!(!slot.is_scheduled());
    }

    #[test]
    fn next_frame_fallback_ignores_idle_signal() {
        let mut slot = IdleSlot::new(IdleMode::NextFrame);
        slot.schedule();
        assert!(slot.fire(false));
    }

    #[test]
    fn cancel_drops_pending_callback() {
        let mut slot = IdleSlot::new(IdleMode::Native);
        slot.schedule();
        slot.cancel();
        assert!(!slot.fire(true));
    }

    #[test]
    fn quiet_gate_opens_after_the_quiet_period() {
        let t0 = Instant::now();
        let mut gate = QuietGate::new(Duration::from_millis(300));
        assert!(gate.is_open(t0));
        gate.touch(t0);
        assert!(!gate.is_open(t0 + Duration::from_millis(100)));
        assert_eq!(
            gate.remaining(t0 + Duration::from_millis(100)),
            Some(Duration::from_millis(200))
        );
        assert!(gate.is_open(t0 + Duration::from_millis(300)));
    }
}
