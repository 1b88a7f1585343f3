mod generator;
#[cfg(feature = "async-tokio")]
mod runtime;
mod sleep_provider;

pub use generator::*;
#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
pub use runtime::*;
pub use sleep_provider::*;
