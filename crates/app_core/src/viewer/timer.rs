//! Interaction-thread timers
//!
//! Timers never fire on their own: the event loop asks for the next deadline,
//! sleeps until then and hands the due timers back to the viewer. This keeps
//! every timer callback on the interaction thread.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Advance the slide animation
    SlideTick,
    /// Show the "loading" tip if the slot is still loading
    LoadingTip { slot: usize },
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    id: TimerId,
    deadline: Instant,
    kind: TimerKind,
}

/// One-shot timers ordered by deadline
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Instant, kind: TimerKind) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Timer { id, deadline, kind });
        tracing::trace!(?id, ?kind, "Timer scheduled");
        id
    }

    /// Cancel a timer; false if it already fired or never existed
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        before != self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    /// Remove and return every timer due at `now`, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<(TimerId, TimerKind)> {
        let mut due: Vec<Timer> = Vec::new();
        self.timers.retain(|t| {
            if t.deadline <= now {
                due.push(*t);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|t| t.deadline);
        due.into_iter().map(|t| (t.id, t.kind)).collect()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
