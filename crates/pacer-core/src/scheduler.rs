//! One-shot timer capability used to pace word advancement.

use log::{debug, warn};

/// Handle for one scheduled timer. Tokens are never reused within a scheduler
/// until the counter wraps.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimerToken(u32);

impl TimerToken {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

pub trait Scheduler {
    /// Arrange for `token` to become due `delay_ms` from now.
    fn schedule_after(&mut self, delay_ms: u32) -> TimerToken;

    /// Drop a scheduled timer. Unknown or already-fired tokens are ignored.
    fn cancel(&mut self, token: TimerToken);
}

/// Scheduler that is polled by its owner instead of calling back.
pub trait TimerSource: Scheduler {
    /// Advance the clock to `now_ms` and hand out the timer that came due.
    fn poll_due(&mut self, now_ms: u64) -> Option<TimerToken>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Deadline {
    pub token: TimerToken,
    pub due_ms: u64,
}

/// Single-slot deadline timer driven by a monotonic millisecond clock.
#[derive(Clone, Debug)]
pub struct DeadlineScheduler {
    now_ms: u64,
    next_token: u32,
    pending: Option<Deadline>,
}

impl DeadlineScheduler {
    pub const fn new(now_ms: u64) -> Self {
        Self {
            now_ms,
            next_token: 1,
            pending: None,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending(&self) -> Option<Deadline> {
        self.pending
    }
}

impl Default for DeadlineScheduler {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Scheduler for DeadlineScheduler {
    fn schedule_after(&mut self, delay_ms: u32) -> TimerToken {
        if let Some(previous) = self.pending {
            warn!(
                "scheduler: replacing pending token={} due_ms={}",
                previous.token.raw(),
                previous.due_ms
            );
        }

        let token = TimerToken::new(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.pending = Some(Deadline {
            token,
            due_ms: self.now_ms.saturating_add(delay_ms as u64),
        });
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        match self.pending {
            Some(deadline) if deadline.token == token => self.pending = None,
            _ => debug!("scheduler: cancel of inactive token={}", token.raw()),
        }
    }
}

impl TimerSource for DeadlineScheduler {
    fn poll_due(&mut self, now_ms: u64) -> Option<TimerToken> {
        self.now_ms = self.now_ms.max(now_ms);

        let deadline = self.pending?;
        if deadline.due_ms > self.now_ms {
            return None;
        }

        self.pending = None;
        Some(deadline.token)
    }
}
