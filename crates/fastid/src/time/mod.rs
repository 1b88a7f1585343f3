mod clock;
mod epoch;
mod interface;
mod mono_clock;

pub use clock::*;
pub use epoch::*;
pub use interface::*;
pub use mono_clock::*;
