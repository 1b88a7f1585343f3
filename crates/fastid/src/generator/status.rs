use core::time::Duration;

/// The outcome of a single generation attempt, as returned by
/// [`Generator::poll_id`].
///
/// [`Generator::next_id`] drives this in a loop; use `poll_id` directly when
/// you want to decide how to wait yourself.
///
/// [`Generator::poll_id`]: crate::Generator::poll_id
/// [`Generator::next_id`]: crate::Generator::next_id
///
/// # Example
///
/// ```
/// use fastid::{BitLayout, Clock, Epoch, Generator, IdGenStatus, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_nanos(&self) -> i64 {
///         1 << 20
///     }
/// }
///
/// let layout = BitLayout::common(1);
/// let last = layout.pack(1, layout.seq_mask());
/// let generator = Generator::with_last_issued(layout, Clock::new(FixedTime, Epoch::UNIX), last);
/// match generator.poll_id() {
///     IdGenStatus::Ready { id } => println!("ID: {id}"),
///     IdGenStatus::Pending { yield_for } => println!("Back off for {yield_for:?}"),
///     IdGenStatus::Contended => println!("Lost a race, retry"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique identifier was issued.
    Ready {
        /// The issued identifier.
        id: i64,
    },
    /// The sequence space of the current time unit is exhausted.
    ///
    /// Wait at least `yield_for`, the time left until the unit rolls over,
    /// before trying again.
    Pending {
        /// Time remaining in the current time unit.
        yield_for: Duration,
    },
    /// Another caller advanced the register first. Retry immediately or
    /// after a short backoff.
    Contended,
}
