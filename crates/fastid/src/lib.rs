//! # fastid
//!
//! Lock-free, k-ordered 64-bit identifiers in the Snowflake style.
//!
//! Each identifier packs a time unit, a per-unit sequence and a process
//! discriminator into a non-negative `i64`:
//!
//! ```text
//! id = time_unit << (seq_bits + discriminator_bits)
//!    | sequence  << discriminator_bits
//!    | discriminator
//! ```
//!
//! A time unit is 2^20 ns (about one millisecond) since a configurable
//! [`Epoch`]. Identifiers issued later compare greater, and different
//! discriminators keep processes from colliding without any coordination.
//!
//! ## Example
//!
//! ```
//! use fastid::{BitLayout, Epoch, Generator};
//!
//! let generator = Generator::new(BitLayout::common(7), Epoch::DEFAULT);
//! let id = generator.next_id();
//!
//! let parts = generator.layout().decode(id);
//! assert_eq!(parts.discriminator, 7);
//! assert!(generator.next_id() > id);
//! ```
//!
//! ## Features
//!
//! - `cache-padded`: pads the generator's register to a cache line.
//! - `instrument`: emits a `tracing` span for every generation attempt.
//! - `serde`: `Serialize`/`Deserialize` for [`IdParts`], `Serialize` for
//!   [`BitLayout`].
//! - `async-tokio`: `Generator::next_id_async` on Tokio's timer.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod codec;
mod config;
mod error;
#[cfg(feature = "futures")]
mod futures;
mod generator;
mod layout;
mod time;

pub use crate::codec::*;
pub use crate::config::*;
pub use crate::error::*;
#[cfg_attr(docsrs, doc(cfg(feature = "futures")))]
#[cfg(feature = "futures")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::layout::*;
pub use crate::time::*;
