use chrono::{DateTime, Utc};

use crate::{layout::BitLayout, time::UNIT_SHIFT};

/// The instant from which time units are counted, in nanoseconds since the
/// Unix epoch.
///
/// Every process that should produce comparable identifiers must share the
/// same epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(i64);

impl Default for Epoch {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Epoch {
    /// Friday, June 1, 2018 00:00:00 UTC.
    pub const DEFAULT: Self = Self(1_527_811_200_000_000_000);

    /// [`Epoch::DEFAULT`] as an RFC 3339 string.
    pub const DEFAULT_STR: &'static str = "2018-06-01T00:00:00.000Z";

    /// Thursday, January 1, 1970 00:00:00 UTC.
    pub const UNIX: Self = Self(0);

    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Parses an RFC 3339 / ISO-8601 instant such as
    /// `2018-06-01T00:00:00.000Z`.
    ///
    /// Returns `None` if the string is malformed or the instant cannot be
    /// represented as `i64` nanoseconds (roughly outside 1677..2262).
    pub fn try_parse(raw: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()?
            .timestamp_nanos_opt()
            .map(Self)
    }

    /// Parses an instant, falling back to [`Epoch::DEFAULT`] when the input
    /// cannot be parsed.
    ///
    /// A successful parse always wins; only a failure yields the default.
    ///
    /// # Example
    /// ```
    /// use fastid::Epoch;
    ///
    /// assert_eq!(Epoch::parse("2018-06-01T00:00:00.000Z"), Epoch::DEFAULT);
    /// assert_eq!(Epoch::parse("1970-01-01T00:00:01Z").as_nanos(), 1_000_000_000);
    /// assert_eq!(Epoch::parse("not a date"), Epoch::DEFAULT);
    /// ```
    pub fn parse(raw: &str) -> Self {
        match Self::try_parse(raw) {
            Some(epoch) => epoch,
            None => {
                tracing::warn!(
                    input = raw,
                    fallback = Self::DEFAULT_STR,
                    "unparseable start epoch, using default"
                );
                Self::DEFAULT
            }
        }
    }

    /// The epoch as a UTC date-time.
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }

    /// The instant at which `time_unit` began, or `None` if it lies outside
    /// the representable range.
    pub fn instant_of(self, time_unit: i64) -> Option<DateTime<Utc>> {
        let offset = time_unit.checked_mul(1 << UNIT_SHIFT)?;
        self.0.checked_add(offset).map(DateTime::from_timestamp_nanos)
    }

    /// The instant at which the timestamp field of `layout` wraps back to
    /// zero.
    ///
    /// Identifiers issued after this point sort before those issued just
    /// prior to it. Choose an epoch and `time_bits` so the horizon lies
    /// beyond the deployment's lifetime.
    ///
    /// # Example
    /// ```
    /// use fastid::{BitLayout, Epoch};
    ///
    /// let horizon = Epoch::DEFAULT.horizon(&BitLayout::common(0)).unwrap();
    /// assert_eq!(horizon.to_rfc3339(), "2054-12-12T23:58:24.606846976+00:00");
    /// ```
    pub fn horizon(self, layout: &BitLayout) -> Option<DateTime<Utc>> {
        self.instant_of(layout.max_time_unit().checked_add(1)?)
    }
}
