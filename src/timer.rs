use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Start/end instants of one game; everything else is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    start: Option<Instant>,
    end: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start instant. Returns false if the timer was already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.start.is_some() {
            return false;
        }
        self.start = Some(now);
        true
    }

    /// Freezes the timer. A timer that never started freezes at zero.
    pub fn stop(&mut self, now: Instant) -> bool {
        if self.end.is_some() {
            return false;
        }
        self.end = Some(now);
        true
    }

    pub fn start_instant(&self) -> Option<Instant> {
        self.start
    }

    pub fn end_instant(&self) -> Option<Instant> {
        self.end
    }

    pub fn has_started(&self) -> bool {
        self.start.is_some()
    }

    pub fn has_ended(&self) -> bool {
        self.end.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.has_started() && !self.has_ended()
    }

    pub fn display(&self, now: Instant) -> Duration {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => now.saturating_duration_since(start),
            (None, _) => Duration::ZERO,
        }
    }
}

/// Produces elapsed-time ticks at whole-second boundaries after the start.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickSchedule {
    start: Option<Instant>,
    next_at: Option<Instant>,
    stopped: bool,
}

impl TickSchedule {
    pub fn arm(&mut self, start: Instant) {
        if self.stopped || self.start.is_some() {
            return;
        }
        self.start = Some(start);
        self.next_at = Some(start + TICK_INTERVAL);
    }

    /// Stops the schedule for good; a stopped schedule cannot be re-armed.
    pub fn disarm(&mut self) {
        self.stopped = true;
        self.next_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_at.is_some()
    }

    /// Returns the elapsed time when at least one tick boundary has passed.
    /// Several missed boundaries collapse into a single tick.
    pub fn poll(&mut self, now: Instant) -> Option<Duration> {
        let (start, next_at) = (self.start?, self.next_at?);
        if now < next_at {
            return None;
        }
        let elapsed = now.saturating_duration_since(start);
        let whole = elapsed.as_secs() + 1;
        self.next_at = Some(start + TICK_INTERVAL * whole as u32);
        Some(elapsed)
    }
}

/// `m:ss` with minutes unbounded.
pub fn format_mm_ss(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

/// Compact duration used on leaderboard rows: `0s`, `45s`, `2m 5s`.
pub fn format_duration_pill(seconds: u64) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }
    let (mins, secs) = (seconds / 60, seconds % 60);
    if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
