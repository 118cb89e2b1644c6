//! Scroll-driven growth and pruning of the date window.
//!
//! A scroll event queues one sample per frame. The sample marks edges that
//! need work; the work itself runs in the idle tier. Extension always runs
//! first. Pruning additionally waits for the scroll to go quiet.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::date_window::DateWindow;
use super::scheduler::{FrameSampler, IdleMode, IdleSlot, QuietGate};
use super::scroll_anchor::{ScrollAnchor, ScrollSurface};
use crate::error::ConfigError;

/// Thresholds and chunk sizes, in days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPolicy {
    pub extend_threshold_days: usize,
    pub extend_chunk_days: usize,
    pub prune_threshold_days: usize,
    pub prune_chunk_days: usize,
    pub max_window_days: usize,
    pub prune_quiet: Duration,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            extend_threshold_days: 90,
            extend_chunk_days: 90,
            prune_threshold_days: 240,
            prune_chunk_days: 90,
            max_window_days: 730,
            prune_quiet: Duration::from_millis(300),
        }
    }
}

impl WindowPolicy {
    /// Reject constants that would schedule work every frame: an extension
    /// must clear its own trigger, and a prune must never leave an edge
    /// close enough to re-trigger extension.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extend_chunk_days < self.extend_threshold_days {
            return Err(ConfigError::ExtendChunkTooSmall {
                chunk: self.extend_chunk_days,
                threshold: self.extend_threshold_days,
            });
        }
        if self.prune_chunk_days >= self.prune_threshold_days {
            return Err(ConfigError::PruneChunkTooLarge {
                chunk: self.prune_chunk_days,
                threshold: self.prune_threshold_days,
            });
        }
        if self.prune_threshold_days - self.prune_chunk_days <= self.extend_threshold_days {
            return Err(ConfigError::PruneReachesExtend {
                prune_threshold: self.prune_threshold_days,
                prune_chunk: self.prune_chunk_days,
                extend_threshold: self.extend_threshold_days,
            });
        }
        Ok(())
    }
}

/// Fully off-screen materialized days on each side of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slack {
    pub left: usize,
    pub right: usize,
}

impl Slack {
    /// `visible_width` is the date area only, pinned columns excluded.
    pub fn measure(
        scroll_left: f32,
        visible_width: f32,
        column_width: f32,
        day_count: usize,
    ) -> Self {
        if column_width <= 0.0 || day_count == 0 {
            return Self::default();
        }
        let scroll_left = scroll_left.max(0.0);
        let left = ((scroll_left / column_width).floor() as usize).min(day_count);
        let covered = ((scroll_left + visible_width.max(0.0)) / column_width).ceil() as usize;
        Self {
            left,
            right: day_count.saturating_sub(covered),
        }
    }
}

/// Horizontal geometry the idle pass needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewGeometry {
    pub column_width: f32,
    /// Visible width of the date area.
    pub visible_width: f32,
}

/// What one idle pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaintenanceReport {
    pub extended_left: usize,
    pub extended_right: usize,
    pub pruned_left: usize,
    pub pruned_right: usize,
    /// A prune is pending but the scroll has not been quiet long enough.
    pub prune_waiting: bool,
}

impl MaintenanceReport {
    pub fn window_changed(&self) -> bool {
        self.extended_left + self.extended_right + self.pruned_left + self.pruned_right > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
}

#[derive(Debug)]
pub struct WindowMaintainer {
    policy: WindowPolicy,
    sampler: FrameSampler,
    idle: IdleSlot,
    quiet: QuietGate,
    extend_left: bool,
    extend_right: bool,
    prune: bool,
}

impl WindowMaintainer {
    pub fn new(policy: WindowPolicy, mode: IdleMode) -> Self {
        Self {
            policy,
            sampler: FrameSampler::default(),
            idle: IdleSlot::new(mode),
            quiet: QuietGate::new(policy.prune_quiet),
            extend_left: false,
            extend_right: false,
            prune: false,
        }
    }

    /// Record a scroll event. Returns true when it queued a new sample.
    pub fn on_scroll(&mut self, now: Instant) -> bool {
        self.quiet.touch(now);
        self.request_sample()
    }

    /// Queue a sample without counting as scroll activity.
    pub fn request_sample(&mut self) -> bool {
        self.sampler.request()
    }

    /// Consume this frame's queued sample.
    pub fn take_sample(&mut self) -> bool {
        self.sampler.take()
    }

    /// Mark pending work for the measured slack and schedule the idle pass.
    pub fn evaluate(&mut self, slack: Slack, day_count: usize) {
        let policy = self.policy;
        if slack.right <= policy.extend_threshold_days {
            self.extend_right = true;
        }
        if slack.left <= policy.extend_threshold_days {
            self.extend_left = true;
        }
        if day_count > policy.max_window_days
            && (slack.left >= policy.prune_threshold_days
                || slack.right >= policy.prune_threshold_days)
        {
            self.prune = true;
        }
        if self.has_pending() && self.idle.schedule() {
            trace!(
                extend_left = self.extend_left,
                extend_right = self.extend_right,
                prune = self.prune,
                "window maintenance scheduled"
            );
        }
    }

    pub fn has_pending(&self) -> bool {
        self.extend_left || self.extend_right || self.prune
    }

    #[cfg(test)]
    pub fn extend_left_pending(&self) -> bool {
        self.extend_left
    }

    #[cfg(test)]
    pub fn extend_right_pending(&self) -> bool {
        self.extend_right
    }

    #[cfg(test)]
    pub fn prune_pending(&self) -> bool {
        self.prune
    }

    #[cfg(test)]
    pub fn idle_scheduled(&self) -> bool {
        self.idle.is_scheduled()
    }

    /// How long the host may sleep before it must run another frame, if
    /// maintenance is waiting.
    pub fn wake_after(&self, now: Instant) -> Option<Duration> {
        if !self.idle.is_scheduled() {
            return None;
        }
        if self.prune && !self.extend_left && !self.extend_right {
            return Some(self.quiet.remaining(now).unwrap_or(Duration::ZERO));
        }
        Some(Duration::ZERO)
    }

    /// Run the idle pass if it is due: all pending extension first, then at
    /// most one prune chunk once the scroll is quiet.
    pub fn run_idle(
        &mut self,
        now: Instant,
        host_idle: bool,
        window: &mut DateWindow,
        surface: &mut dyn ScrollSurface,
        geometry: ViewGeometry,
    ) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();
        if !self.idle.fire(host_idle) {
            return report;
        }

        let chunk = self.policy.extend_chunk_days;
        if self.extend_right {
            if window.extend_right(chunk) {
                report.extended_right = chunk;
            }
            self.extend_right = false;
        }
        if self.extend_left {
            if window.extend_left(chunk) {
                // Keep the visible content still: everything moved right by `chunk` columns.
                let shift = chunk as f32 * geometry.column_width;
                surface.set_scroll_left(surface.scroll_left() + shift);
                report.extended_left = chunk;
            }
            self.extend_left = false;
        }
        if report.extended_left + report.extended_right > 0 {
            debug!(
                left = report.extended_left,
                right = report.extended_right,
                start = %window.range_start(),
                end = %window.range_end(),
                "date window extended"
            );
        }

        if self.prune {
            if self.quiet.remaining(now).is_some() {
                self.idle.schedule();
                report.prune_waiting = true;
                trace!("prune waiting for scroll to settle");
            } else {
                self.prune_once(window, surface, geometry, &mut report);
            }
        }
        report
    }

    /// Drop pending work and any scheduled idle pass.
    pub fn cancel(&mut self) {
        self.idle.cancel();
        self.sampler.take();
        self.extend_left = false;
        self.extend_right = false;
        self.prune = false;
    }

    fn prune_once(
        &mut self,
        window: &mut DateWindow,
        surface: &mut dyn ScrollSurface,
        geometry: ViewGeometry,
        report: &mut MaintenanceReport,
    ) {
        let policy = self.policy;
        let col = geometry.column_width;
        if window.len() <= policy.max_window_days {
            self.prune = false;
            return;
        }

        let slack = Slack::measure(surface.scroll_left(), geometry.visible_width, col, window.len());
        let qualifies = |edge_slack: usize| {
            edge_slack >= policy.prune_threshold_days && policy.prune_chunk_days < edge_slack
        };
        let left_ok = qualifies(slack.left) && report.extended_left == 0;
        let right_ok = qualifies(slack.right) && report.extended_right == 0;
        let edge = match (left_ok, right_ok) {
            (true, true) if slack.left >= slack.right => Edge::Left,
            (true, _) if !right_ok => Edge::Left,
            (_, true) => Edge::Right,
            _ => {
                // An edge extended this pass may still qualify on the next one.
                let blocked = (qualifies(slack.left) && report.extended_left > 0)
                    || (qualifies(slack.right) && report.extended_right > 0);
                self.prune = blocked;
                if blocked {
                    self.idle.schedule();
                }
                return;
            }
        };

        let anchor = ScrollAnchor::capture(surface.scroll_left(), col, window.keys());
        let chunk = policy.prune_chunk_days;
        let pruned = match edge {
            Edge::Left => window.prune_left(chunk),
            Edge::Right => window.prune_right(chunk),
        };
        if pruned {
            if let Some(anchor) = anchor {
                anchor.restore(surface, col, window);
            }
            match edge {
                Edge::Left => report.pruned_left = chunk,
                Edge::Right => report.pruned_right = chunk,
            }
            debug!(
                edge = ?edge,
                days = chunk,
                start = %window.range_start(),
                end = %window.range_end(),
                "date window pruned"
            );
        }

        let slack = Slack::measure(surface.scroll_left(), geometry.visible_width, col, window.len());
        self.prune = window.len() > policy.max_window_days
            && (qualifies(slack.left) || qualifies(slack.right));
        if self.prune {
            self.idle.schedule();
        }
    }
}
