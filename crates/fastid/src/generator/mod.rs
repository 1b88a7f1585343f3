mod atomic;
mod status;
#[cfg(test)]
mod tests;

pub use atomic::*;
pub use status::*;
