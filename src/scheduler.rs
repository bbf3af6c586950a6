// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

/// Fixed-interval tick source, independent of how often it is polled.
///
/// The first tick is due one period after start. A late poll fires a single
/// tick and schedules the next one a full period later; missed ticks are not
/// replayed.
#[derive(Clone, Debug)]
pub struct Scheduler {
    period: Duration,
    next_due: Instant,
    cancelled: bool,
}

impl Scheduler {
    pub fn start(period: Duration, now: Instant) -> Self {
        let period = period.max(Duration::from_millis(1));
        Self {
            period,
            next_due: now + period,
            cancelled: false,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Consumes the pending tick if it is due.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.cancelled || now < self.next_due {
            return false;
        }
        self.next_due += self.period;
        if self.next_due <= now {
            self.next_due = now + self.period;
        }
        true
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        if self.cancelled {
            None
        } else {
            Some(self.next_due)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: Duration = Duration::from_millis(40);

    #[test]
    fn first_tick_waits_one_period() {
        let t0 = Instant::now();
        let mut s = Scheduler::start(P, t0);
        assert!(!s.fire(t0));
        assert!(!s.fire(t0 + Duration::from_millis(39)));
        assert!(s.fire(t0 + P));
        assert!(!s.fire(t0 + P));
        assert_eq!(s.next_deadline(), Some(t0 + P * 2));
    }

    #[test]
    fn late_poll_fires_once_without_burst() {
        let t0 = Instant::now();
        let mut s = Scheduler::start(P, t0);
        let late = t0 + P * 10;
        assert!(s.fire(late));
        assert!(!s.fire(late));
        assert_eq!(s.next_deadline(), Some(late + P));
    }

    #[test]
    fn cancel_stops_all_ticks() {
        let t0 = Instant::now();
        let mut s = Scheduler::start(P, t0);
        s.cancel();
        assert!(s.is_cancelled());
        assert!(!s.fire(t0 + P * 3));
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn zero_period_is_clamped() {
        let t0 = Instant::now();
        let s = Scheduler::start(Duration::ZERO, t0);
        assert_eq!(s.period(), Duration::from_millis(1));
    }
}
