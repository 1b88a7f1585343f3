use std::sync::Arc;

/// A source of wall-clock time, in nanoseconds since the Unix epoch.
///
/// This abstraction lets the generator run against a real clock in
/// production and a mocked clock in tests.
///
/// # Example
///
/// ```
/// use fastid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_nanos(&self) -> i64 {
///         1_527_811_200_000_000_000
///     }
/// }
///
/// assert_eq!(FixedTime.current_nanos(), 1_527_811_200_000_000_000);
/// ```
pub trait TimeSource {
    /// Returns the current time in nanoseconds since 1970-01-01 UTC.
    fn current_nanos(&self) -> i64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_nanos(&self) -> i64 {
        (**self).current_nanos()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_nanos(&self) -> i64 {
        (**self).current_nanos()
    }
}
