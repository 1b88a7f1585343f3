use crossbeam_utils::Backoff;
use portable_atomic::{AtomicI64, Ordering};
#[cfg(feature = "instrument")]
use tracing::instrument;

use crate::{
    generator::IdGenStatus,
    layout::BitLayout,
    time::{Clock, Epoch, MonotonicClock, TimeSource, unit_of, until_next_unit},
};

/// A lock-free identifier generator suitable for multi-threaded environments.
///
/// All state lives in a single atomic register holding the last identifier
/// this generator issued. The register is both the source of truth for the
/// last time unit and sequence used and the compare-and-swap witness, so no
/// second synchronized field is needed and reads are never torn.
///
/// Share one generator per process (by reference or `Arc`); independent
/// generators do not coordinate with each other.
///
/// ## Guarantees
/// - Two successful calls never return the same identifier while the clock
///   stays within one timestamp period (see [`crate::Epoch::horizon`]).
/// - Identifiers increase in the order their compare-and-swap succeeded,
///   until the timestamp field wraps.
///
/// ## Caveats
/// - Lock-free but not wait-free: a caller may retry repeatedly while others
///   win the race.
/// - More than [`BitLayout::ids_per_unit`] requests within one time unit block
///   until the next unit.
/// - Two processes sharing a discriminator can issue colliding identifiers;
///   nothing here detects that.
#[derive(Debug)]
pub struct Generator<T = MonotonicClock> {
    #[cfg(feature = "cache-padded")]
    last_issued: crossbeam_utils::CachePadded<AtomicI64>,
    #[cfg(not(feature = "cache-padded"))]
    last_issued: AtomicI64,
    layout: BitLayout,
    clock: Clock<T>,
}

impl Generator<MonotonicClock> {
    /// Creates a generator that reads time from a fresh [`MonotonicClock`].
    ///
    /// # Example
    /// ```
    /// use fastid::{BitLayout, Epoch, Generator};
    ///
    /// let generator = Generator::new(BitLayout::common(7), Epoch::DEFAULT);
    ///
    /// let first = generator.next_id();
    /// let second = generator.next_id();
    /// assert!(first < second);
    /// assert_eq!(generator.layout().discriminator_of(first), 7);
    /// ```
    pub fn new(layout: BitLayout, epoch: Epoch) -> Self {
        Self::with_clock(layout, Clock::monotonic(epoch))
    }
}

impl<T: TimeSource> Generator<T> {
    /// Creates a generator with an explicit clock and an empty register.
    pub fn with_clock(layout: BitLayout, clock: Clock<T>) -> Self {
        Self::with_last_issued(layout, clock, 0)
    }

    /// Creates a generator whose register starts at `last_issued`, as if that
    /// identifier had just been issued.
    ///
    /// This is mostly useful in tests to put the generator in a specific
    /// state, such as an exhausted sequence.
    pub fn with_last_issued(layout: BitLayout, clock: Clock<T>, last_issued: i64) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            last_issued: crossbeam_utils::CachePadded::new(AtomicI64::new(last_issued)),
            #[cfg(not(feature = "cache-padded"))]
            last_issued: AtomicI64::new(last_issued),
            layout,
            clock,
        }
    }

    pub const fn layout(&self) -> &BitLayout {
        &self.layout
    }

    pub const fn clock(&self) -> &Clock<T> {
        &self.clock
    }

    /// The most recently issued identifier, or the seed value if none has
    /// been issued yet.
    pub fn last_issued(&self) -> i64 {
        self.last_issued.load(Ordering::Relaxed)
    }

    /// Returns the next identifier, blocking the thread if this process has
    /// exhausted the current time unit.
    ///
    /// Never fails. Contention is retried with a short spin backoff and
    /// sequence exhaustion sleeps until the next time unit, so the only
    /// visible cost of either is latency. The sleep is not cancellable; use
    /// the async API if the wait must be abandonable.
    pub fn next_id(&self) -> i64 {
        let backoff = Backoff::new();
        loop {
            match self.poll_id() {
                IdGenStatus::Ready { id } => return id,
                IdGenStatus::Pending { yield_for } => {
                    std::thread::sleep(yield_for);
                    backoff.reset();
                }
                IdGenStatus::Contended => backoff.spin(),
            }
        }
    }

    /// Like [`Self::next_id`], but gives up after `max_attempts` calls to
    /// [`Self::poll_id`].
    ///
    /// Pending attempts still sleep until the next time unit, so the total
    /// wait is bounded by roughly `max_attempts` time units.
    ///
    /// Returns `None` if no identifier was issued within the budget.
    pub fn next_id_within(&self, max_attempts: usize) -> Option<i64> {
        let backoff = Backoff::new();
        for _ in 0..max_attempts {
            match self.poll_id() {
                IdGenStatus::Ready { id } => return Some(id),
                IdGenStatus::Pending { yield_for } => {
                    std::thread::sleep(yield_for);
                    backoff.reset();
                }
                IdGenStatus::Contended => backoff.spin(),
            }
        }
        None
    }

    /// Makes one attempt to issue an identifier.
    ///
    /// 1. Load the register and decode its time unit and sequence.
    /// 2. Read the clock. Any other time unit than the register's restarts
    ///    the sequence at zero. Within the same unit an exhausted sequence
    ///    returns [`IdGenStatus::Pending`]; otherwise the sequence is
    ///    incremented.
    /// 3. Compare-and-swap the candidate into the register.
    ///
    /// A unit that reads lower than the register's (after the timestamp field
    /// wraps, or once a future epoch is reached) also restarts the sequence,
    /// so the wait on exhaustion is never longer than one time unit.
    #[cfg_attr(feature = "instrument", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> IdGenStatus {
        let current = self.last_issued.load(Ordering::Relaxed);
        let last_unit = self.layout.time_unit_of(current);
        let last_seq = self.layout.sequence_of(current);

        let elapsed = self.clock.elapsed_nanos();
        let now = unit_of(elapsed, self.layout.time_mask());

        let candidate = if now != last_unit {
            self.layout.pack(now, 0)
        } else if last_seq >= self.layout.seq_mask() {
            return Self::cold_exhausted(elapsed);
        } else {
            self.layout.pack(now, last_seq + 1)
        };

        if self
            .last_issued
            .compare_exchange(current, candidate, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            IdGenStatus::Ready { id: candidate }
        } else {
            IdGenStatus::Contended
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_exhausted(elapsed: i64) -> IdGenStatus {
        IdGenStatus::Pending {
            yield_for: until_next_unit(elapsed),
        }
    }
}
