use super::TokioSleep;
use crate::{generator::Generator, time::TimeSource};

impl<T: TimeSource> Generator<T> {
    /// Resolves to the next identifier, sleeping on Tokio's timer while the
    /// current time unit is exhausted.
    ///
    /// # Example
    /// ```
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// use fastid::{BitLayout, Epoch, Generator};
    ///
    /// let generator = Generator::new(BitLayout::common(3), Epoch::DEFAULT);
    /// let id = generator.next_id_async().await;
    /// assert_eq!(generator.layout().discriminator_of(id), 3);
    /// # }
    /// ```
    pub async fn next_id_async(&self) -> i64 {
        self.next_id_async_with::<TokioSleep>().await
    }
}
