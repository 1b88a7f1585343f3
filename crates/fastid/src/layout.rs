use crate::error::{ConfigError, USABLE_BITS};

/// Describes how a 64-bit identifier is split into its fields, plus the
/// discriminator this process stamps into every ID it issues.
///
/// The ID is packed from **MSB to LSB**:
///
/// ```text
///  Bit Index:  63           62 ..                                    0
///              +------+-----------------+----------------+-------------------+
///  Field:      | sign | timestamp (T)   | sequence (S)   | discriminator (D) |
///              +------+-----------------+----------------+-------------------+
/// ```
///
/// The sign bit is never used, so every identifier is a non-negative `i64`.
/// Unused bits between the sign bit and the timestamp stay zero.
///
/// A layout is immutable once built. Share it by value; it is `Copy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BitLayout {
    time_bits: u32,
    seq_bits: u32,
    discriminator_bits: u32,
    time_mask: i64,
    seq_mask: i64,
    discriminator_mask: i64,
    discriminator: i64,
}

/// Returns `(1 << width) - 1` without overflowing for `width == 63`.
const fn mask(width: u32) -> i64 {
    !(-1_i64 << width)
}

impl BitLayout {
    /// Timestamp bits shared by both presets.
    pub const PRESET_TIME_BITS: u32 = 40;

    /// Builds a layout from explicit field widths.
    ///
    /// The discriminator is masked to `discriminator_bits`: out-of-range high
    /// bits are dropped rather than rejected, so `300` with 8 bits becomes
    /// `44`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LayoutOverflow`] if the widths sum to more than
    /// 63 bits.
    ///
    /// # Example
    /// ```
    /// use fastid::BitLayout;
    ///
    /// let layout = BitLayout::new(40, 11, 12, 2).unwrap();
    /// assert_eq!(layout.seq_mask(), 0x7FF);
    /// assert_eq!(layout.discriminator(), 2);
    ///
    /// assert!(BitLayout::new(40, 16, 8, 0).is_err());
    /// ```
    pub fn new(
        time_bits: u32,
        seq_bits: u32,
        discriminator_bits: u32,
        discriminator: i64,
    ) -> Result<Self, ConfigError> {
        let total = time_bits
            .checked_add(seq_bits)
            .and_then(|bits| bits.checked_add(discriminator_bits));
        if !matches!(total, Some(total) if total <= USABLE_BITS) {
            return Err(ConfigError::LayoutOverflow {
                time_bits,
                seq_bits,
                discriminator_bits,
            });
        }

        let discriminator_mask = mask(discriminator_bits);
        Ok(Self {
            time_bits,
            seq_bits,
            discriminator_bits,
            time_mask: mask(time_bits),
            seq_mask: mask(seq_bits),
            discriminator_mask,
            discriminator: discriminator & discriminator_mask,
        })
    }

    /// High-throughput layout: 40 timestamp bits, 15 sequence bits and 8
    /// discriminator bits.
    ///
    /// Allows 32,768 IDs per time unit per process across 256 processes.
    pub fn benchmark(discriminator: i64) -> Self {
        Self::preset(15, 8, discriminator)
    }

    /// Recommended layout for most deployments: 40 timestamp bits, 7 sequence
    /// bits and 16 discriminator bits.
    ///
    /// Allows 128 IDs per time unit per process across 65,536 processes, which
    /// matches a discriminator taken from the low two octets of an IPv4
    /// address.
    pub fn common(discriminator: i64) -> Self {
        Self::preset(7, 16, discriminator)
    }

    fn preset(seq_bits: u32, discriminator_bits: u32, discriminator: i64) -> Self {
        let discriminator_mask = mask(discriminator_bits);
        Self {
            time_bits: Self::PRESET_TIME_BITS,
            seq_bits,
            discriminator_bits,
            time_mask: mask(Self::PRESET_TIME_BITS),
            seq_mask: mask(seq_bits),
            discriminator_mask,
            discriminator: discriminator & discriminator_mask,
        }
    }

    /// Returns a copy of this layout stamped with a different discriminator.
    #[must_use]
    pub const fn with_discriminator(mut self, discriminator: i64) -> Self {
        self.discriminator = discriminator & self.discriminator_mask;
        self
    }

    pub const fn time_bits(&self) -> u32 {
        self.time_bits
    }

    pub const fn seq_bits(&self) -> u32 {
        self.seq_bits
    }

    pub const fn discriminator_bits(&self) -> u32 {
        self.discriminator_bits
    }

    pub const fn time_mask(&self) -> i64 {
        self.time_mask
    }

    pub const fn seq_mask(&self) -> i64 {
        self.seq_mask
    }

    pub const fn discriminator_mask(&self) -> i64 {
        self.discriminator_mask
    }

    /// The masked discriminator stamped into every ID built with this layout.
    pub const fn discriminator(&self) -> i64 {
        self.discriminator
    }

    /// Number of bits occupied by all three fields.
    pub const fn total_bits(&self) -> u32 {
        self.time_bits + self.seq_bits + self.discriminator_bits
    }

    /// Largest time unit the timestamp field can hold. The field wraps back to
    /// zero one unit later.
    pub const fn max_time_unit(&self) -> i64 {
        self.time_mask
    }

    /// Largest discriminator value this layout can represent.
    pub const fn max_discriminator(&self) -> i64 {
        self.discriminator_mask
    }

    /// Number of IDs a single process can issue within one time unit before
    /// generation blocks until the next unit.
    pub const fn ids_per_unit(&self) -> i64 {
        self.seq_mask + 1
    }

    /// Bit offset of the sequence field.
    pub(crate) const fn seq_shift(&self) -> u32 {
        self.discriminator_bits
    }

    /// Bit offset of the timestamp field.
    pub(crate) const fn time_shift(&self) -> u32 {
        self.discriminator_bits + self.seq_bits
    }
}
