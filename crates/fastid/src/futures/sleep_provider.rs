use core::{future::Future, time::Duration};

/// Abstracts over how to sleep for a given [`Duration`] in async contexts.
///
/// This keeps async generation independent of any particular runtime.
pub trait SleepProvider {
    /// Returns a future that completes after roughly `dur`. The future must be
    /// `Send` so generation can move across worker threads.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}
