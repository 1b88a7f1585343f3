/// The number of bits available to a layout. Bit 63 is the sign bit of the
/// `i64` identifier and is never assigned to a field.
pub const USABLE_BITS: u32 = 63;

/// Errors raised while building a [`BitLayout`].
///
/// Generation itself never fails: contention and sequence exhaustion are
/// retried internally and only show up as added latency.
///
/// [`BitLayout`]: crate::BitLayout
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The requested field widths do not fit in the 63 usable bits.
    #[error(
        "bit layout overflows: {time_bits} timestamp + {seq_bits} sequence + \
         {discriminator_bits} discriminator bits exceeds {USABLE_BITS}"
    )]
    LayoutOverflow {
        time_bits: u32,
        seq_bits: u32,
        discriminator_bits: u32,
    },
}
