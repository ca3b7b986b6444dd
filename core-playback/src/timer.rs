//! # Sleep Timer
//!
//! Bookkeeping for the sleep timer. The controller owns the expiry task; this
//! type only decides when one is due and whether a firing task is still the
//! current one.
//!
//! The countdown runs while the session plays. Every arm starts from the full
//! duration and bumps the epoch, so a task spawned for an older arm sees a
//! stale epoch and does nothing even if its cancellation raced with the
//! deadline.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Upper bound accepted for a timer, one week.
pub const MAX_TIMER_MINUTES: u32 = 7 * 24 * 60;

/// What the controller needs to spawn an expiry task.
#[derive(Debug, Clone)]
pub(crate) struct ArmedTimer {
    pub epoch: u64,
    pub deadline: Instant,
    pub cancel: CancellationToken,
}

#[derive(Debug, Default)]
pub(crate) struct SleepTimer {
    minutes: Option<u32>,
    deadline: Option<Instant>,
    wall_deadline: Option<DateTime<Utc>>,
    epoch: u64,
    cancel: Option<CancellationToken>,
}

impl SleepTimer {
    pub fn minutes(&self) -> Option<u32> {
        self.minutes
    }

    pub fn wall_deadline(&self) -> Option<DateTime<Utc>> {
        self.wall_deadline
    }

    #[cfg(test)]
    fn is_counting(&self) -> bool {
        self.deadline.is_some()
    }

    /// Records a duration without starting the countdown.
    pub fn set_minutes(&mut self, minutes: u32) {
        self.suspend();
        self.minutes = Some(minutes.min(MAX_TIMER_MINUTES));
    }

    /// Starts the countdown from the full duration.
    ///
    /// Returns `None` when no duration is set.
    pub fn arm(&mut self, now: DateTime<Utc>) -> Option<ArmedTimer> {
        self.cancel_pending();
        let minutes = self.minutes?;

        let length = Duration::from_secs(u64::from(minutes) * 60);
        let deadline = Instant::now() + length;
        let cancel = CancellationToken::new();

        self.deadline = Some(deadline);
        self.wall_deadline = chrono::Duration::from_std(length)
            .ok()
            .and_then(|length| now.checked_add_signed(length));
        self.cancel = Some(cancel.clone());

        Some(ArmedTimer {
            epoch: self.epoch,
            deadline,
            cancel,
        })
    }

    /// Stops the countdown but keeps the duration.
    pub fn suspend(&mut self) {
        self.cancel_pending();
    }

    /// Forgets the timer entirely. Returns the duration that was set.
    pub fn clear(&mut self) -> Option<u32> {
        self.cancel_pending();
        self.minutes.take()
    }

    /// Whether a task armed at `epoch` may still fire.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch && self.deadline.is_some()
    }

    /// Time left before expiry; zero when not counting.
    pub fn remaining(&self) -> Duration {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or_default()
    }

    fn cancel_pending(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        self.deadline = None;
        self.wall_deadline = None;
        self.epoch = self.epoch.wrapping_add(1);
    }
}
