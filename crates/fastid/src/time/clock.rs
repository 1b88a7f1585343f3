use core::time::Duration;

use crate::time::{Epoch, MonotonicClock, TimeSource};

/// Nanoseconds are shifted right by this amount to produce a time unit.
///
/// One unit is 2^20 ns (1,048,576 ns, roughly one millisecond). Identifiers
/// are only comparable across processes that agree on this value and on the
/// epoch.
pub const UNIT_SHIFT: u32 = 20;

/// Length of one time unit in nanoseconds.
pub const UNIT_NANOS: i64 = 1 << UNIT_SHIFT;

const UNIT_NANOS_MASK: i64 = UNIT_NANOS - 1;

/// Converts a [`TimeSource`] reading into time units since an [`Epoch`].
///
/// The timestamp field is `((now - epoch) >> 20) & time_mask`, so it wraps
/// silently once `2^time_bits` units have elapsed. See [`Epoch::horizon`] for
/// when that happens.
#[derive(Clone, Debug)]
pub struct Clock<T = MonotonicClock> {
    source: T,
    epoch: Epoch,
}

impl Clock<MonotonicClock> {
    /// A clock backed by a fresh [`MonotonicClock`].
    pub fn monotonic(epoch: Epoch) -> Self {
        Self::new(MonotonicClock::new(), epoch)
    }
}

impl<T: TimeSource> Clock<T> {
    pub const fn new(source: T, epoch: Epoch) -> Self {
        Self { source, epoch }
    }

    pub const fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub const fn source(&self) -> &T {
        &self.source
    }

    /// Nanoseconds elapsed since the epoch. Negative if the source reads
    /// earlier than the epoch.
    #[inline]
    pub fn elapsed_nanos(&self) -> i64 {
        self.source
            .current_nanos()
            .wrapping_sub(self.epoch.as_nanos())
    }

    /// The current time unit, masked to the timestamp field width.
    ///
    /// # Example
    /// ```
    /// use fastid::{Clock, Epoch, TimeSource};
    ///
    /// struct At(i64);
    /// impl TimeSource for At {
    ///     fn current_nanos(&self) -> i64 {
    ///         self.0
    ///     }
    /// }
    ///
    /// let clock = Clock::new(At(3 * 1_048_576 + 17), Epoch::UNIX);
    /// assert_eq!(clock.time_unit(0xFF), 3);
    /// ```
    #[inline]
    pub fn time_unit(&self, time_mask: i64) -> i64 {
        unit_of(self.elapsed_nanos(), time_mask)
    }

    /// How long until the current time unit rolls over.
    #[inline]
    pub fn until_next_unit(&self) -> Duration {
        until_next_unit(self.elapsed_nanos())
    }
}

#[inline]
pub(crate) const fn unit_of(elapsed_nanos: i64, time_mask: i64) -> i64 {
    (elapsed_nanos >> UNIT_SHIFT) & time_mask
}

/// Remaining nanoseconds in the unit containing `elapsed_nanos`, always in
/// `1..=2^20`.
#[inline]
pub(crate) const fn until_next_unit(elapsed_nanos: i64) -> Duration {
    Duration::from_nanos((UNIT_NANOS - (elapsed_nanos & UNIT_NANOS_MASK)) as u64)
}
