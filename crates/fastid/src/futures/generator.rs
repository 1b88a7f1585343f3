use core::time::Duration;

use super::SleepProvider;
use crate::{
    generator::{Generator, IdGenStatus},
    time::TimeSource,
};

impl<T: TimeSource> Generator<T> {
    /// Resolves to the next identifier, awaiting `S` instead of blocking the
    /// thread while the current time unit is exhausted.
    ///
    /// Unlike [`Generator::next_id`], the wait can be abandoned: dropping the
    /// future (for example from a timeout) stops it at the next sleep.
    /// Contention is retried after a zero-length sleep, which yields to the
    /// scheduler.
    pub async fn next_id_async_with<S>(&self) -> i64
    where
        S: SleepProvider,
    {
        loop {
            let dur = match self.poll_id() {
                IdGenStatus::Ready { id } => return id,
                IdGenStatus::Pending { yield_for } => yield_for,
                IdGenStatus::Contended => Duration::ZERO,
            };
            S::sleep_for(dur).await;
        }
    }
}
