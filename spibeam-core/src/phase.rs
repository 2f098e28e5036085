use derive_more::Debug;
use zerocopy::{Immutable, IntoBytes};

use crate::{common::Degrees, params::PHASE_CODE_GAIN};

/// A 16-bit phase code; the raw value represents `value / 2^16` of one turn.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, IntoBytes, Immutable, Default)]
#[debug("{:#06X}", self.0)]
pub struct PhaseCode(pub u16);

impl PhaseCode {
    /// A phase code of zero.
    pub const ZERO: Self = Self(0);

    /// Converts a Q9.7 degree value into a phase code.
    ///
    /// The value is scaled by [`PHASE_CODE_GAIN`] (Q8.8) into Q17.15 and the
    /// 15 fractional bits are dropped; keeping the low 16 bits of the result
    /// wraps at full turns, so 360° maps back to code 0.
    #[must_use]
    pub const fn from_degrees(degrees: Degrees) -> Self {
        Self((((degrees.raw() as u32 * PHASE_CODE_GAIN as u32) >> 15) & 0xFFFF) as u16)
    }
}

/// One signed Q1.15 sine/cosine sample pair.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SinCos {
    /// Sine sample, Q1.15.
    pub sin: i16,
    /// Cosine sample, Q1.15.
    pub cos: i16,
}

/// A signed fraction of one rotation in Q1.31; wraps at ±1 turn.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[debug("{} turn", self.0 as f64 / (1u64 << 31) as f64)]
pub struct PhaseTurn(i32);

impl PhaseTurn {
    /// Zero rotation.
    pub const ZERO: Self = Self(0);

    /// Creates a value from its raw Q1.31 representation.
    #[must_use]
    pub const fn from_raw(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw Q1.31 representation.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Quantizes onto the 64-step command grid.
    ///
    /// Takes bits [30:25] and rounds half up by adding bit 24; an index that
    /// rounds past the top step wraps to 0, which is the nearest grid point
    /// of the next turn.
    #[must_use]
    pub const fn index(self) -> PhaseIndex {
        let raw = self.0 as u32;
        PhaseIndex::new((((raw >> 25) & 0x3F) + ((raw >> 24) & 1)) as u8)
    }
}

/// One of 64 quantized phase steps of 5.625° each.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, IntoBytes, Immutable, Default)]
pub struct PhaseIndex(u8);

impl PhaseIndex {
    /// Step 0.
    pub const ZERO: Self = Self(0);
    /// The last step on the grid.
    pub const MAX: Self = Self(63);

    /// Creates an index, keeping the low 6 bits.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value & 0x3F)
    }

    /// Returns the step number in [0, 63].
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// The phase command computed for one element; consumed immediately, never
/// retained across elements.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PhaseResult {
    /// Fraction of one rotation, Q1.31.
    pub turn: PhaseTurn,
    /// The rotation quantized onto the 64-step grid.
    pub index: PhaseIndex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[test]
    #[case(0x0000, 0)]
    #[case(0x4000, 11520)]
    #[case(0x8000, 23040)]
    #[case(0x0000, 46080)]
    #[case(0x4000, 57600)]
    fn code_from_degrees(#[case] expected: u16, #[case] raw: u16) {
        assert_eq!(
            PhaseCode(expected),
            PhaseCode::from_degrees(Degrees::from_raw(raw))
        );
    }

    #[rstest::rstest]
    #[test]
    #[case(0, 0x0000_0000)]
    #[case(1, 0x0200_0000)]
    #[case(1, 0x0100_0000)]
    #[case(0, 0x00FF_FFFF)]
    #[case(32, 0x4000_0000)]
    #[case(0, 0x7F00_0000u32 as i32)]
    #[case(0, -1)]
    #[case(32, 0xC000_0000u32 as i32)]
    #[case(0, i32::MIN)]
    fn index_of_turn(#[case] expected: u8, #[case] raw: i32) {
        assert_eq!(expected, PhaseTurn::from_raw(raw).index().value());
    }

    #[test]
    fn index_masks_to_six_bits() {
        assert_eq!(0, PhaseIndex::new(64).value());
        assert_eq!(63, PhaseIndex::new(127).value());
    }
}
