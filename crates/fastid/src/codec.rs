use core::fmt;

use crate::layout::BitLayout;

/// The fields of an identifier, decoded with a [`BitLayout`].
///
/// # Example
/// ```
/// use fastid::{BitLayout, IdParts};
///
/// let layout = BitLayout::common(7);
/// let id = layout.pack(1_000, 3);
/// assert_eq!(
///     layout.decode(id),
///     IdParts { time_unit: 1_000, sequence: 3, discriminator: 7 }
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdParts {
    /// Time units elapsed since the generator's epoch when the ID was issued.
    pub time_unit: i64,
    /// Position of the ID within its time unit.
    pub sequence: i64,
    /// The discriminator of the issuing process.
    pub discriminator: i64,
}

impl fmt::Display for IdParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time_unit={} sequence={} discriminator={}",
            self.time_unit, self.sequence, self.discriminator
        )
    }
}

impl BitLayout {
    /// Extracts the sequence field: `(id >> discriminator_bits) & seq_mask`.
    #[inline]
    pub const fn sequence_of(&self, id: i64) -> i64 {
        (id >> self.seq_shift()) & self.seq_mask()
    }

    /// Extracts the timestamp field: `id >> (discriminator_bits + seq_bits)`.
    ///
    /// The result is not masked, so it is exact for every identifier this
    /// layout produces and total over the rest of the `i64` domain.
    #[inline]
    pub const fn time_unit_of(&self, id: i64) -> i64 {
        id >> self.time_shift()
    }

    /// Extracts the discriminator field.
    #[inline]
    pub const fn discriminator_of(&self, id: i64) -> i64 {
        id & self.discriminator_mask()
    }

    /// Packs a time unit and sequence with this layout's discriminator.
    ///
    /// Both inputs are masked to their field widths, so the result is always a
    /// non-negative identifier.
    #[inline]
    pub const fn pack(&self, time_unit: i64, sequence: i64) -> i64 {
        ((time_unit & self.time_mask()) << self.time_shift())
            | ((sequence & self.seq_mask()) << self.seq_shift())
            | self.discriminator()
    }

    /// Splits an identifier into all three fields.
    pub const fn decode(&self, id: i64) -> IdParts {
        IdParts {
            time_unit: self.time_unit_of(id),
            sequence: self.sequence_of(id),
            discriminator: self.discriminator_of(id),
        }
    }
}
