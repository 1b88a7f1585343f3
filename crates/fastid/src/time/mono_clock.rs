use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::time::TimeSource;

/// A wall-clock time source that never goes backward.
///
/// The wall clock is read once, at construction, and every later reading adds
/// the monotonic time elapsed since then. NTP slews or manual adjustments of
/// the system clock after startup are therefore ignored, which keeps the
/// generator's time units non-decreasing.
///
/// Copies share the same anchor, so generators built from copies of one clock
/// agree on the current time.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use fastid::{MonotonicClock, TimeSource};
///
/// let clock = MonotonicClock::new();
/// let before = clock.current_nanos();
/// std::thread::sleep(Duration::from_millis(2));
/// assert!(clock.current_nanos() >= before + 2_000_000);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
    anchor_nanos: i64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Anchors a new clock to the current wall-clock time.
    ///
    /// A system clock set before 1970 anchors at zero instead of panicking.
    pub fn new() -> Self {
        let start = Instant::now();
        let anchor_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |since| {
                i64::try_from(since.as_nanos()).unwrap_or(i64::MAX)
            });
        Self {
            start,
            anchor_nanos,
        }
    }
}

impl TimeSource for MonotonicClock {
    fn current_nanos(&self) -> i64 {
        let elapsed = i64::try_from(self.start.elapsed().as_nanos()).unwrap_or(i64::MAX);
        self.anchor_nanos.saturating_add(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_goes_backward() {
        let clock = MonotonicClock::new();
        let mut last = clock.current_nanos();
        for _ in 0..10_000 {
            let now = clock.current_nanos();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn copies_share_an_anchor() {
        let clock = MonotonicClock::new();
        let copy = clock;
        let a = clock.current_nanos();
        let b = copy.current_nanos();
        let c = clock.current_nanos();
        assert!(a <= b && b <= c);
    }

    #[test]
    fn anchored_near_wall_clock() {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as i64;
        let clock = MonotonicClock::new().current_nanos();
        assert!((clock - wall).abs() < 1_000_000_000);
    }
}
